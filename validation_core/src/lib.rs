//! Core library of the upload validation service: extension validators,
//! request file handling, and the axum routes that apply them.

pub mod config;
pub mod error;
pub mod files;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod validation;

pub use crate::config::AppConfig;
pub use error::{AppError, Result};
pub use files::{read_multipart, BoundForm, FileLookup, FormFile, RequestFiles, UploadedFile};
pub use handlers::{create_routes, UploadField};
pub use validation::{
    ClientValidationRule, FieldValidator, FieldValue, FileExtensionsRule, UploadExtensionsValidator,
    ValidationResult,
};

use axum::Router;
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub app_name: String,
    pub version: String,
    pub upload_fields: Arc<Vec<UploadField>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Self {
        let upload_fields = config
            .uploads
            .fields
            .iter()
            .map(UploadField::from)
            .collect();

        Self {
            app_name: "Upload Validation Server".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            upload_fields: Arc::new(upload_fields),
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    for field in state.upload_fields.iter() {
        info!(
            field = %field.name,
            extensions = %field.validator.extensions(),
            "Registered upload field"
        );
    }

    middleware::logging::with_request_logging(create_routes()).with_state(state)
}

pub async fn run_server(app: Router, addr: SocketAddr) -> Result<()> {
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
