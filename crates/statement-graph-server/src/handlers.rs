//! HTTP request handlers.
//!
//! Implements the ingestion and health check endpoints using axum.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use serde::{Deserialize, Serialize};
use statement_graph_domain::traits::{GraphStore, LlmProvider};
use statement_graph_ingest::{IngestError, IngestionRequest, IngestionResult, Ingestor};
use statement_graph_store::StoreError;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

/// Shared application state
pub struct AppState<S, L: LlmProvider> {
    /// Ingestion pipeline shared by all requests
    pub ingestor: Arc<Ingestor<S, L>>,
}

impl<S, L: LlmProvider> Clone for AppState<S, L> {
    fn clone(&self) -> Self {
        Self {
            ingestor: Arc::clone(&self.ingestor),
        }
    }
}

/// Response envelope shared by every endpoint except `/health`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// `"success"` or `"error"`
    pub status: &'static str,
    /// Human-readable summary
    pub message: String,
    /// Payload, present on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    fn success(message: String, data: T) -> Self {
        Self {
            status: "success",
            message,
            data: Some(data),
        }
    }
}

/// Query string of `POST /ingestion/v1`
#[derive(Debug, Default, Deserialize)]
pub struct IngestQuery {
    /// Extra guidance for the LLM
    pub intent: Option<String>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Always `"healthy"` while the server answers
    pub status: String,
    /// Model used for extraction
    pub model: String,
}

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Body could not be read as an ingestion request
    #[error("Invalid request body: {0}")]
    BadRequest(String),

    /// Pipeline failure
    #[error(transparent)]
    Ingest(#[from] IngestError),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::Ingest(IngestError::Validation(_)) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Ingest(e) if e.is_extraction_timeout() => StatusCode::GATEWAY_TIMEOUT,
            AppError::Ingest(IngestError::Extraction(_)) => StatusCode::BAD_GATEWAY,
            AppError::Ingest(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed with {}: {}", status, self);
        } else {
            warn!("Request rejected with {}: {}", status, self);
        }

        let body = Json(ApiResponse::<()> {
            status: "error",
            message: self.to_string(),
            data: None,
        });
        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// POST /ingestion/v1 - Ingest a transcription
async fn ingest<S, L>(
    State(state): State<AppState<S, L>>,
    query: Result<Query<IngestQuery>, QueryRejection>,
    payload: Result<Json<IngestionRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<IngestionResult>>, AppError>
where
    S: GraphStore<Error = StoreError> + 'static,
    L: LlmProvider + 'static,
{
    let Query(query) = query?;
    let Json(request) = payload?;
    let result = state.ingestor.ingest(&request, query.intent.as_deref()).await?;

    let message = format!(
        "Ingested {} statements from transcription {}",
        result.statements_count, result.transcription_id
    );
    Ok(Json(ApiResponse::success(message, result)))
}

/// GET /health - Liveness check
async fn health_check<S, L>(State(state): State<AppState<S, L>>) -> Json<HealthCheckResponse>
where
    S: GraphStore<Error = StoreError> + 'static,
    L: LlmProvider + 'static,
{
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        model: state.ingestor.model_name().to_string(),
    })
}

/// Create the axum router with all routes
pub fn create_router<S, L>(state: AppState<S, L>) -> AxumRouter
where
    S: GraphStore<Error = StoreError> + 'static,
    L: LlmProvider + 'static,
{
    AxumRouter::new()
        .route("/ingestion/v1", post(ingest::<S, L>))
        .route("/health", get(health_check::<S, L>))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
