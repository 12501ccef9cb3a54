mod config;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::State,
    http::{Request, StatusCode},
    routing::{get, post},
};
use extract::{Message, NeuralSpaceEntityExtractor};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, ServerConfig};

struct AppState {
    extractor: NeuralSpaceEntityExtractor,
}

#[derive(Serialize, Deserialize)]
struct HealthResponse {
    status: String,
    token_configured: bool,
}

#[derive(Serialize, Deserialize)]
struct BatchRequest {
    messages: Vec<Message>,
}

#[derive(Serialize, Deserialize)]
struct BatchResponse {
    messages: Vec<Message>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env();
    init_tracing(config.log_format);

    let extractor_config = config.load_extractor_config().await?;
    let extractor = NeuralSpaceEntityExtractor::create(extractor_config)?;

    let state = Arc::new(AppState { extractor });

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .context(format!("Failed to bind {}", config.bind_addr))?;

    tracing::info!("Server listening on http://{}", config.bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/parse", post(parse_message))
        .route("/parse/batch", post(parse_batch))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
            tracing::info_span!(
                "request",
                request_id = %uuid::Uuid::new_v4(),
                method = %request.method(),
                uri = %request.uri(),
            )
        }))
        .with_state(state)
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        token_configured: state.extractor.access_token().is_some(),
    })
}

async fn parse_message(
    State(state): State<Arc<AppState>>,
    Json(mut message): Json<Message>,
) -> Result<Json<Message>, StatusCode> {
    state
        .extractor
        .process_message(&mut message)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Entity extraction failed");
            StatusCode::BAD_GATEWAY
        })?;

    Ok(Json(message))
}

async fn parse_batch(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BatchRequest>,
) -> Result<Json<BatchResponse>, StatusCode> {
    let mut messages = request.messages;
    state
        .extractor
        .process(&mut messages)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Batch entity extraction failed");
            StatusCode::BAD_GATEWAY
        })?;

    Ok(Json(BatchResponse { messages }))
}
