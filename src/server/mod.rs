pub mod error;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::advisor::PopupAdvisor;
use crate::config::ServerConfig;
use crate::errors::{PopSentryError, PopSentryResult};
use crate::server::routes::create_router;

/// Shared state handed to every request handler.
pub struct AppState {
    pub advisor: PopupAdvisor,
}

pub struct Server {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl Server {
    pub fn new(config: ServerConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    pub fn addr(&self) -> String {
        self.config.addr()
    }

    pub async fn run(&self) -> PopSentryResult<()> {
        let app = create_router(self.state.clone());

        let addr: SocketAddr = self
            .addr()
            .parse()
            .map_err(|e| PopSentryError::Config(format!("invalid listen address {}: {e}", self.addr())))?;
        let listener = TcpListener::bind(addr).await?;

        info!("popsentry listening on {}", addr);
        axum::serve(listener, app).await?;

        Ok(())
    }
}
