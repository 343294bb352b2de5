//! REST API
//!
//! Thin HTTP boundary over a [`FireplaceController`]. Protected routes take an
//! API key checked against the [`ApiKeyStore`]; the dev-mode `/test/*` routes
//! bypass it and always talk to the physical device.

mod auth;
pub mod dto;
mod handlers;
mod routes;

use std::sync::Arc;

use common::AppError;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::AppConfig;
use crate::controller::FireplaceController;
use crate::error::{FireSrvError, Result};
use crate::keys::ApiKeyStore;
use crate::protocol::FireplaceClient;

pub use routes::create_routes;

/// Shared state for all handlers
#[derive(Debug, Clone)]
pub struct AppState {
    /// Controller selected by configuration
    pub controller: Arc<dyn FireplaceController>,
    /// Direct device access for the dev-mode routes
    pub device: Arc<FireplaceClient>,
    pub keys: ApiKeyStore,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        controller: Arc<dyn FireplaceController>,
        device: Arc<FireplaceClient>,
        keys: ApiKeyStore,
        config: AppConfig,
    ) -> Self {
        Self {
            controller,
            device,
            keys,
            config: Arc::new(config),
        }
    }
}

impl From<FireSrvError> for AppError {
    fn from(err: FireSrvError) -> Self {
        match &err {
            FireSrvError::ConnectionError(_) => {
                AppError::service_unavailable("Cannot connect to fireplace")
                    .with_details(err.to_string())
            },
            FireSrvError::ValidationError(msg) => AppError::bad_request(msg.clone()),
            _ => AppError::internal_error(err.to_string()),
        }
    }
}

/// Serve the API until Ctrl+C or SIGTERM
pub async fn serve(state: Arc<AppState>) -> Result<()> {
    let addr = state.config.bind_address()?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| FireSrvError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    info!(
        "{} listening on {} (controller: {}, dev_mode: {})",
        state.config.service.name,
        addr,
        state.controller.kind(),
        state.config.service.dev_mode
    );

    axum::serve(listener, create_routes(state))
        .with_graceful_shutdown(common::shutdown::wait_for_shutdown())
        .await
        .map_err(|e| FireSrvError::internal(format!("HTTP server error: {}", e)))?;

    info!("HTTP server stopped");
    Ok(())
}
