pub mod handlers;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::llm::{ChatGateway, ProviderRoutes};
use crate::ocr::TextRecognizer;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub gateway: Arc<dyn ChatGateway>,
    pub recognizer: Arc<dyn TextRecognizer>,
    pub routes: ProviderRoutes,
    /// Request body cap for `/api/ocr-image`, in bytes.
    pub ocr_body_limit: usize,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Readiness
        .route("/api", get(handlers::root))
        .route("/api/", get(handlers::root))
        .route("/api/solve-code", post(handlers::solve_code))
        .route(
            "/api/ocr-image",
            post(handlers::ocr_image).layer(DefaultBodyLimit::max(state.ocr_body_limit)),
        )
        // History
        .route("/api/sessions", get(handlers::list_sessions))
        .route("/api/sessions/{session_id}", get(handlers::get_session_history))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Any method and header, credentials allowed, origins from `CORS_ORIGINS`.
/// A `*` entry mirrors the caller's origin since credentials rule out a literal wildcard.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::mirror_request()
    } else {
        let values: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!("Ignoring invalid CORS origin {:?}: {}", origin, e);
                    None
                }
            })
            .collect();
        AllowOrigin::list(values)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get as get_route};
    use tower::ServiceExt;

    fn preflight(origin: &str) -> Request<Body> {
        Request::builder()
            .method("OPTIONS")
            .uri("/api/")
            .header("origin", origin)
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "content-type")
            .body(Body::empty())
            .unwrap()
    }

    fn app(origins: &[&str]) -> Router {
        let origins: Vec<String> = origins.iter().map(|o| o.to_string()).collect();
        Router::new()
            .route("/api/", get_route(|| async { "ok" }))
            .layer(cors_layer(&origins))
    }

    #[tokio::test]
    async fn wildcard_mirrors_any_origin_with_credentials() {
        let response = app(&["*"]).oneshot(preflight("http://anywhere.test")).await.unwrap();
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "http://anywhere.test");
        assert_eq!(headers["access-control-allow-credentials"], "true");
        assert_eq!(headers["access-control-allow-methods"], "POST");
    }

    #[tokio::test]
    async fn allow_list_rejects_unlisted_origins() {
        let app = app(&["http://localhost:3000"]);

        let allowed = app.clone().oneshot(preflight("http://localhost:3000")).await.unwrap();
        assert_eq!(allowed.headers()["access-control-allow-origin"], "http://localhost:3000");

        let denied = app.oneshot(preflight("http://evil.test")).await.unwrap();
        assert!(denied.headers().get("access-control-allow-origin").is_none());
    }
}
