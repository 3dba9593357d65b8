use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::llm::client::{post_json, HttpClient};
use crate::llm::{ChatCompletion, ChatGateway, LlmError};

/// Talks to an OpenAI-compatible `/v1/chat/completions` endpoint.
pub struct HttpChatGateway {
    client: HttpClient,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    id: Option<String>,
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<Message>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: Option<i64>,
    completion_tokens: Option<i64>,
}

impl HttpChatGateway {
    pub fn new(client: HttpClient, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ChatGateway for HttpChatGateway {
    async fn complete(&self, chat: &ChatCompletion) -> Result<String, LlmError> {
        let body = json!({
            "model": chat.model,
            "messages": [
                { "role": "system", "content": chat.system },
                { "role": "user", "content": chat.prompt },
            ],
            "user": chat.session_id,
        });
        let body = serde_json::to_vec(&body).map_err(|e| LlmError::Http(e.to_string()))?;

        tracing::debug!("Submitting chat for model {} to {}", chat.model, self.base_url);
        let (status, body_bytes) =
            post_json(&self.client, &self.completions_url(), &self.api_key, body).await?;

        let body_str = String::from_utf8_lossy(&body_bytes).to_string();
        if !status.is_success() {
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: body_str,
            });
        }

        let response: ChatResponse = serde_json::from_str(&body_str)
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        if let Some(usage) = &response.usage {
            tracing::info!(
                "Chat {} for model {} used {} input / {} output tokens",
                response.id.as_deref().unwrap_or("-"),
                chat.model,
                usage.prompt_tokens.unwrap_or(0),
                usage.completion_tokens.unwrap_or(0)
            );
        }

        extract_output(&response)
            .ok_or_else(|| LlmError::InvalidResponse("response contained no message".to_string()))
    }
}

fn extract_output(response: &ChatResponse) -> Option<String> {
    let first_choice = response.choices.first()?;
    first_choice
        .message
        .as_ref()
        .and_then(|m| m.content.clone())
        .or_else(|| first_choice.text.clone())
        .filter(|content| !content.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{create_client, ProviderRoutes};
    use axum::{Json, Router, extract::State, http::HeaderMap, http::StatusCode, routing::post};
    use serde_json::Value;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured {
        body: Arc<Mutex<Option<Value>>>,
        auth: Arc<Mutex<Option<String>>>,
    }

    async fn spawn_upstream(status: StatusCode, reply: Value) -> (String, Captured) {
        let captured = Captured::default();
        let app = Router::new()
            .route(
                "/v1/chat/completions",
                post(
                    move |State(captured): State<Captured>, headers: HeaderMap, Json(body): Json<Value>| {
                        let reply = reply.clone();
                        async move {
                            *captured.body.lock().unwrap() = Some(body);
                            *captured.auth.lock().unwrap() = headers
                                .get("authorization")
                                .and_then(|v| v.to_str().ok())
                                .map(str::to_string);
                            (status, Json(reply))
                        }
                    },
                ),
            )
            .with_state(captured.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), captured)
    }

    fn chat(provider: &str, model: &str) -> ChatCompletion {
        ChatCompletion::for_question(
            &ProviderRoutes::default(),
            provider,
            model,
            "Reverse a linked list",
            "sess-42",
        )
    }

    #[tokio::test]
    async fn returns_first_choice_content() {
        let (url, captured) = spawn_upstream(
            StatusCode::OK,
            json!({
                "id": "chatcmpl-1",
                "choices": [{ "message": { "role": "assistant", "content": "Use three pointers." } }],
                "usage": { "prompt_tokens": 12, "completion_tokens": 4 }
            }),
        )
        .await;

        let gateway = HttpChatGateway::new(create_client(), url, "test-key");
        let solution = gateway.complete(&chat("openai", "gpt-5")).await.unwrap();
        assert_eq!(solution, "Use three pointers.");

        let body = captured.body.lock().unwrap().clone().unwrap();
        assert_eq!(body["model"], "openai/gpt-5");
        assert_eq!(body["user"], "sess-42");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert!(body["messages"][1]["content"].as_str().unwrap().contains("Reverse a linked list"));
        assert_eq!(captured.auth.lock().unwrap().as_deref(), Some("Bearer test-key"));
    }

    #[tokio::test]
    async fn deepseek_model_is_namespaced_on_the_wire() {
        let (url, captured) = spawn_upstream(
            StatusCode::OK,
            json!({ "choices": [{ "message": { "content": "ok" } }] }),
        )
        .await;

        let gateway = HttpChatGateway::new(create_client(), url, "");
        gateway.complete(&chat("deepseek", "deepseek-chat")).await.unwrap();

        let body = captured.body.lock().unwrap().clone().unwrap();
        assert_eq!(body["model"], "openai/deepseek/deepseek-chat");
        assert!(captured.auth.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn upstream_rejection_is_reported_with_body() {
        let (url, _) = spawn_upstream(
            StatusCode::UNAUTHORIZED,
            json!({ "error": { "message": "bad key" } }),
        )
        .await;

        let gateway = HttpChatGateway::new(create_client(), url, "nope");
        let err = gateway.complete(&chat("openai", "gpt-5")).await.unwrap_err();
        match err {
            LlmError::Status { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("bad key"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn empty_choices_are_invalid() {
        let (url, _) = spawn_upstream(StatusCode::OK, json!({ "choices": [] })).await;

        let gateway = HttpChatGateway::new(create_client(), url, "k");
        let err = gateway.complete(&chat("openai", "gpt-5")).await.unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn unreachable_gateway_is_a_connection_error() {
        // Bind then drop to get a port nothing is listening on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let gateway = HttpChatGateway::new(create_client(), format!("http://{}", addr), "k");
        let err = gateway.complete(&chat("openai", "gpt-5")).await.unwrap_err();
        assert!(matches!(err, LlmError::Connection(_)));
    }
}
