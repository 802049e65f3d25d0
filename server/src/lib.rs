pub mod config;
pub mod logging;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use mdenhance_core::{
    EnhanceRequest, EnhanceResponse, EnhanceService, LlmClient, LlmClientConfig, ProviderDefaults,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub use config::ServerConfig;

#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("core error: {0}")]
    Core(#[from] mdenhance_core::EnhanceError),
}

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Clone)]
pub struct AppState {
    pub service: EnhanceService,
}

impl AppState {
    pub fn new(service: EnhanceService) -> Self {
        Self { service }
    }

    /// Wire the production HTTP client behind the service
    pub fn with_llm_client(defaults: ProviderDefaults, client_cfg: LlmClientConfig) -> Result<Self> {
        let client = LlmClient::new(client_cfg)?;
        Ok(Self::new(EnhanceService::new(defaults, Arc::new(client))))
    }
}

#[derive(Serialize)]
pub struct RootInfo {
    pub message: &'static str,
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
    pub timestamp: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/health", get(health))
        .route("/enhance", post(enhance))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Bind `addr` and serve until the process exits
pub async fn start_server(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(target: "server", url = %format!("http://{}", addr), "Enhance API ready");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn root() -> Json<RootInfo> {
    Json(RootInfo {
        message: "AI Markdown 可视化图文生成器 API",
        status: "running",
    })
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "healthy",
        timestamp: chrono::Local::now().to_rfc3339(),
    })
}

async fn enhance(
    State(state): State<AppState>,
    Json(req): Json<EnhanceRequest>,
) -> Json<EnhanceResponse> {
    Json(state.service.enhance(req).await)
}
