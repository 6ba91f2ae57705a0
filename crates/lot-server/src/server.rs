use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::{build_router, AppState};

/// Lotline invocation server.
pub struct LotServer {
    config: ServerConfig,
}

impl LotServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router over a fresh ledger (useful for testing).
    pub fn router(&self) -> ServerResult<axum::Router> {
        let state = AppState {
            host: Arc::new(self.config.build_host()?),
            max_args: self.config.max_args,
        };
        Ok(build_router(state, self.config.max_body_bytes))
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router()?;
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!("Lotline server listening on {}", self.config.bind_addr);
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
