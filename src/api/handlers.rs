use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::AppState;
use crate::db::{self, SessionRecord, RECENT_SESSIONS_LIMIT, SESSION_HISTORY_LIMIT};
use crate::error::ApiError;
use crate::llm::ChatCompletion;
use crate::ocr;

#[derive(Debug, Deserialize)]
pub struct SolveCodeRequest {
    pub question: String,
    #[serde(default = "default_provider")]
    pub model_provider: String,
    #[serde(default = "default_model")]
    pub model_name: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-5".to_string()
}

impl SolveCodeRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.question.trim().is_empty() {
            return Err(ApiError::InvalidInput("question must not be empty".to_string()));
        }
        if self.model_provider.trim().is_empty() {
            return Err(ApiError::InvalidInput("model_provider must not be empty".to_string()));
        }
        if self.model_name.trim().is_empty() {
            return Err(ApiError::InvalidInput("model_name must not be empty".to_string()));
        }
        if matches!(&self.session_id, Some(id) if id.trim().is_empty()) {
            return Err(ApiError::InvalidInput("session_id must not be empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct SolveCodeResponse {
    pub solution: String,
    pub session_id: String,
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
pub struct OcrRequest {
    pub image_base64: String,
}

#[derive(Debug, Serialize)]
pub struct OcrResponse {
    pub extracted_text: String,
}

pub async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "Interview Assistant API Ready" }))
}

pub async fn solve_code(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SolveCodeRequest>, JsonRejection>,
) -> Result<Json<SolveCodeResponse>, ApiError> {
    let Json(req) = payload?;
    req.validate()?;
    let session_id = req
        .session_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let chat = ChatCompletion::for_question(
        &state.routes,
        &req.model_provider,
        &req.model_name,
        &req.question,
        &session_id,
    );
    tracing::info!("Solving question for session {} with {}", session_id, chat.model);

    let solution = state.gateway.complete(&chat).await?;

    let record = SessionRecord::new(
        session_id,
        req.question,
        solution,
        req.model_provider,
        req.model_name,
        Utc::now(),
    );
    db::insert_session(&state.db, &record).await?;

    Ok(Json(SolveCodeResponse {
        solution: record.solution,
        session_id: record.session_id,
        timestamp: record.timestamp,
    }))
}

pub async fn ocr_image(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<OcrRequest>, JsonRejection>,
) -> Result<Json<OcrResponse>, ApiError> {
    let Json(req) = payload?;
    let extracted_text = ocr::extract_text(state.recognizer.as_ref(), &req.image_base64).await?;
    tracing::info!("OCR extracted {} characters", extracted_text.chars().count());
    Ok(Json(OcrResponse { extracted_text }))
}

pub async fn get_session_history(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<SessionRecord>>, ApiError> {
    let sessions = db::get_sessions_by_id(&state.db, &session_id, SESSION_HISTORY_LIMIT).await?;
    Ok(Json(sessions))
}

pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SessionRecord>>, ApiError> {
    let sessions = db::get_recent_sessions(&state.db, RECENT_SESSIONS_LIMIT).await?;
    Ok(Json(sessions))
}
