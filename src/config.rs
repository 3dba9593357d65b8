use std::env;

/// LiteLLM proxy's default listen address. The gateway must accept
/// `provider/model` names, which OpenAI's own endpoint does not.
pub const DEFAULT_LLM_GATEWAY_URL: &str = "http://localhost:4000";

/// 25 MiB.
pub const DEFAULT_OCR_BODY_LIMIT: usize = 25 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub llm_gateway_url: String,
    pub llm_api_key: String,
    pub cors_origins: Vec<String>,
    pub tesseract_cmd: String,
    pub ocr_body_limit: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if it exists (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = lookup("PORT")
            .unwrap_or_else(|| "8001".to_string())
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid PORT value: {}", e))?;

        let database_url = lookup("DATABASE_URL")
            .unwrap_or_else(|| "sqlite:./data/interview_assistant.db".to_string());

        let llm_gateway_url = lookup("LLM_GATEWAY_URL")
            .unwrap_or_else(|| DEFAULT_LLM_GATEWAY_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let llm_api_key = lookup("LLM_API_KEY")
            .or_else(|| lookup("EMERGENT_LLM_KEY"))
            .unwrap_or_default();
        if llm_api_key.is_empty() {
            tracing::warn!("No LLM_API_KEY set; gateway requests will be unauthenticated");
        }

        let cors_origins = parse_origins(&lookup("CORS_ORIGINS").unwrap_or_else(|| "*".to_string()));

        let tesseract_cmd = lookup("TESSERACT_CMD").unwrap_or_else(|| "tesseract".to_string());

        let ocr_body_limit = match lookup("OCR_MAX_BODY_BYTES") {
            Some(raw) => raw
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid OCR_MAX_BODY_BYTES value: {}", e))?,
            None => DEFAULT_OCR_BODY_LIMIT,
        };

        Ok(Config {
            port,
            database_url,
            llm_gateway_url,
            llm_api_key,
            cors_origins,
            tesseract_cmd,
            ocr_body_limit,
        })
    }
}

/// Splits a comma-separated origin list, dropping blanks.
fn parse_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();

    if origins.is_empty() {
        vec!["*".to_string()]
    } else {
        origins
    }
}
