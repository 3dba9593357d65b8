use std::collections::HashMap;

/// How requests for one provider are carried by the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRoute {
    /// Provider whose transport actually carries the request.
    pub transport: String,
    /// Namespace tag prepended to the model name.
    pub model_prefix: String,
}

/// Compatibility shims for providers the gateway cannot address directly.
/// Providers with no entry pass through untouched.
#[derive(Debug, Clone)]
pub struct ProviderRoutes {
    routes: HashMap<String, ProviderRoute>,
}

impl Default for ProviderRoutes {
    fn default() -> Self {
        Self::empty().with_route("deepseek", "openai", "deepseek/")
    }
}

impl ProviderRoutes {
    pub fn empty() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    pub fn with_route(mut self, provider: &str, transport: &str, model_prefix: &str) -> Self {
        self.routes.insert(
            provider.to_string(),
            ProviderRoute {
                transport: transport.to_string(),
                model_prefix: model_prefix.to_string(),
            },
        );
        self
    }

    /// Returns the (transport provider, model) pair to submit.
    pub fn resolve(&self, provider: &str, model: &str) -> (String, String) {
        match self.routes.get(provider) {
            Some(route) => (
                route.transport.clone(),
                format!("{}{}", route.model_prefix, model),
            ),
            None => (provider.to_string(), model.to_string()),
        }
    }

    /// Model identifier in the gateway's `provider/model` form.
    pub fn gateway_model(&self, provider: &str, model: &str) -> String {
        let (transport, model) = self.resolve(provider, model);
        format!("{}/{}", transport, model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deepseek_is_tunnelled_through_openai() {
        let routes = ProviderRoutes::default();
        assert_eq!(
            routes.resolve("deepseek", "deepseek-chat"),
            ("openai".to_string(), "deepseek/deepseek-chat".to_string())
        );
        assert_eq!(
            routes.gateway_model("deepseek", "deepseek-chat"),
            "openai/deepseek/deepseek-chat"
        );
    }

    #[test]
    fn unknown_providers_pass_through() {
        let routes = ProviderRoutes::default();
        assert_eq!(
            routes.resolve("gemini", "gemini-2.5-pro"),
            ("gemini".to_string(), "gemini-2.5-pro".to_string())
        );
        assert_eq!(routes.gateway_model("openai", "gpt-5"), "openai/gpt-5");
    }

    #[test]
    fn routes_extend_without_code_changes() {
        let routes = ProviderRoutes::default().with_route("mistral", "openai", "mistral/");
        assert_eq!(routes.gateway_model("mistral", "large"), "openai/mistral/large");
        assert_eq!(
            routes.gateway_model("deepseek", "deepseek-coder"),
            "openai/deepseek/deepseek-coder"
        );
    }
}
