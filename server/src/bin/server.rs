use mdenhance_core::{LlmClientConfig, ProviderDefaults};
use mdenhance_server::{logging, start_server, AppState, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env();
    logging::init(&config.log_dir)?;

    let defaults = ProviderDefaults::from_env();
    if defaults.api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY not set; requests must carry aiConfig.apiKey");
    }

    let state = AppState::with_llm_client(defaults, LlmClientConfig::from_env())?;

    let addr = config.addr()?;
    tracing::info!(log_dir = %config.log_dir.display(), "Starting md-enhance server on {}", addr);

    start_server(addr, state).await.map_err(|e| e.into())
}
