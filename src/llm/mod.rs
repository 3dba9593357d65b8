pub mod client;
pub mod gateway;
pub mod routes;

pub use client::create_client;
pub use gateway::HttpChatGateway;
pub use routes::ProviderRoutes;

use async_trait::async_trait;
use thiserror::Error;

pub const SYSTEM_MESSAGE: &str = "You are an expert coding interview assistant. Analyze the problem and provide the most efficient solution with optimal time and space complexity. Format your response with clear explanations and clean, production-ready code.";

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("LLM gateway connection error: {0}")]
    Connection(String),

    #[error("LLM gateway returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response from LLM gateway: {0}")]
    InvalidResponse(String),

    #[error("HTTP error: {0}")]
    Http(String),
}

/// A single-turn chat, already resolved to the model name the gateway expects.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatCompletion {
    pub model: String,
    pub system: String,
    pub prompt: String,
    pub session_id: String,
}

impl ChatCompletion {
    pub fn for_question(
        routes: &ProviderRoutes,
        model_provider: &str,
        model_name: &str,
        question: &str,
        session_id: &str,
    ) -> Self {
        Self {
            model: routes.gateway_model(model_provider, model_name),
            system: SYSTEM_MESSAGE.to_string(),
            prompt: build_prompt(question),
            session_id: session_id.to_string(),
        }
    }
}

#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Returns the assistant's reply text.
    async fn complete(&self, chat: &ChatCompletion) -> Result<String, LlmError>;
}

pub fn build_prompt(question: &str) -> String {
    format!(
        "Problem Statement:
{question}

Provide:
1. Problem Analysis
2. Optimal Algorithm/Approach
3. Time & Space Complexity
4. Complete, working code solution
5. Brief explanation of the solution

Make the code clean, well-commented, and production-ready."
    )
}
