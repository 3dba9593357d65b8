mod api;
mod config;
mod db;
mod error;
mod llm;
mod ocr;

use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "interview_assistant=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = config::Config::from_env()?;
    tracing::info!(
        "Starting interview assistant on port {} with LLM gateway at {}",
        config.port,
        config.llm_gateway_url
    );

    // Make sure the database file's directory exists before connecting
    let db_path = config
        .database_url
        .strip_prefix("sqlite:")
        .unwrap_or(&config.database_url);
    if let Some(parent) = std::path::Path::new(db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&format!("{}?mode=rwc", config.database_url))
        .await?;

    db::init_db(&db).await?;
    tracing::info!("Database initialized at {}", config.database_url);

    let gateway = llm::HttpChatGateway::new(
        llm::create_client(),
        config.llm_gateway_url.clone(),
        config.llm_api_key.clone(),
    );
    let recognizer = ocr::TesseractCli::new(config.tesseract_cmd.clone());

    let state = Arc::new(api::AppState {
        db: db.clone(),
        gateway: Arc::new(gateway),
        recognizer: Arc::new(recognizer),
        routes: llm::ProviderRoutes::default(),
        ocr_body_limit: config.ocr_body_limit,
    });

    let app = api::router(state).layer(api::cors_layer(&config.cors_origins));

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!("Server listening on 0.0.0.0:{}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    tracing::info!("Database connection closed");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
