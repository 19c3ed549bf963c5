pub mod advisor;
pub mod config;
pub mod errors;
pub mod hierarchy;
pub mod llm;
pub mod popup;
pub mod server;

use std::sync::Arc;

use crate::advisor::PopupAdvisor;
use crate::config::AppConfig;
use crate::errors::PopSentryResult;
use crate::llm::registry::ProviderRegistry;
use crate::server::{AppState, Server};

pub use crate::popup::{analyze, AnalysisOutcome, PopupAnalyzer, PopupResult};

pub async fn run() -> PopSentryResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Load .env file if present (ignore error if not found)
    let _ = dotenvy::dotenv();

    // Without a config the server still answers /health; /invoke reports the missing provider.
    let config = match config::load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load config; starting with empty LLM registry");
            AppConfig::default()
        }
    };

    let registry = Arc::new(ProviderRegistry::from_config(&config));
    tracing::info!(providers = ?registry.list_names(), "LLM providers registered");

    let advisor = PopupAdvisor::new(registry, config.fetch.clone());
    let server = Server::new(config.server.clone(), Arc::new(AppState { advisor }));
    server.run().await
}
