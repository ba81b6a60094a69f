//! Statement Graph Server
//!
//! HTTP surface of the ingestion pipeline:
//!
//! - `POST /ingestion/v1[?intent=...]` ingests a transcription
//! - `GET /health` reports liveness and the active model

#![warn(missing_docs)]

pub mod config;
pub mod handlers;

use config::{ConfigError, ServerConfig};
use handlers::{create_router, AppState};
use statement_graph_extractor::ExtractionClient;
use statement_graph_ingest::Ingestor;
use statement_graph_llm::{LlmError, Provider};
use statement_graph_store::{GraphBackend, StoreError};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Graph store could not be opened
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// LLM provider could not be built
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Build the ingestion pipeline described by `config`
pub async fn build_state(config: &ServerConfig) -> Result<AppState<GraphBackend, Provider>, ServerError> {
    config.validate()?;

    let store = GraphBackend::open(&config.store).await?;
    let provider = Provider::from_settings(&config.llm)?;
    let client = ExtractionClient::new(provider, config.extractor.clone());

    info!(
        "Pipeline ready: store={}, model={}, batch_size={}",
        config.store.backend_name(),
        client.model_name(),
        config.pipeline.batch_size
    );

    Ok(AppState {
        ingestor: Arc::new(Ingestor::new(Arc::new(store), client, config.pipeline.clone())),
    })
}

/// Start the HTTP server
///
/// Opens the store, builds the LLM provider and serves until Ctrl-C.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    info!("Starting Statement Graph server");

    let state = build_state(&config).await?;
    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Could not install Ctrl-C handler: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statement_graph_store::StoreSettings;

    #[tokio::test]
    async fn test_build_state_with_ollama_and_memory_store() {
        let mut config = ServerConfig::default();
        config.store = StoreSettings::Sqlite { path: ":memory:".to_string() };
        config.llm.provider = statement_graph_llm::ProviderKind::Ollama;

        let state = build_state(&config).await.unwrap();
        assert_eq!(state.ingestor.model_name(), statement_graph_llm::ollama::DEFAULT_MODEL);
    }

    #[tokio::test]
    async fn test_build_state_rejects_invalid_config() {
        let config = ServerConfig::default();
        assert!(matches!(build_state(&config).await, Err(ServerError::Config(_))));
    }
}
