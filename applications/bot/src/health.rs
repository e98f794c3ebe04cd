/// Health check HTTP endpoint
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};

/// Bot identity shared with the gateway handler
#[derive(Debug, Clone, Default)]
pub struct HealthState {
    bot: Arc<RwLock<Option<String>>>,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the bot's user tag once the gateway is ready
    pub async fn set_ready(&self, tag: impl Into<String>) {
        *self.bot.write().await = Some(tag.into());
    }

    pub async fn bot(&self) -> Option<String> {
        self.bot.read().await.clone()
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub bot: String,
}

/// GET / - Banner
pub async fn home() -> &'static str {
    "🎵 Chorus music bot is running!"
}

/// GET /health - Health check endpoint
pub async fn health(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        bot: state.bot().await.unwrap_or_else(|| "not ready".to_string()),
    })
}

pub fn router(state: HealthState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .with_state(state)
}

/// Serve the health endpoint until the listener fails
pub async fn serve(addr: SocketAddr, state: HealthState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Health endpoint listening on {}", addr);
    axum::serve(listener, router(state)).await
}
