//! HTTP entrypoint for the generate pipeline.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};
use dailydose_core::{ErrorKind, PipelineError};

use crate::state::{AppState, UnavailablePipeline};

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub topic: String,
    /// First `server.preview_chars` characters of the post.
    pub preview: String,
    /// Length of the full post in characters.
    pub full_length: usize,
    pub published: bool,
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub kind: ErrorKind,
}

/// Any failure surfaced by the API; always a JSON 500.
#[derive(Debug)]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
}

impl From<PipelineError> for ApiError {
    fn from(error: PipelineError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

impl From<&UnavailablePipeline> for ApiError {
    fn from(unavailable: &UnavailablePipeline) -> Self {
        Self {
            kind: unavailable.kind,
            message: unavailable.message.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                success: false,
                error: self.message,
                kind: self.kind,
            }),
        )
            .into_response()
    }
}

/// `GET|POST /api/v1/generate`: run the pipeline once.
///
/// Publishes only when the server was started with the publish flag set;
/// otherwise this is a preview and the ledger is left alone, even for an
/// exhausted catalog under the reset policy. Runs are serialized within the
/// process.
pub async fn generate(
    State(state): State<Arc<AppState>>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let pipeline = state.pipeline().map_err(ApiError::from)?;

    let _guard = state.run_lock().lock().await;
    let outcome = pipeline.run(state.run_mode()).await.map_err(|e| {
        error!("Generate request failed: {}", e);
        ApiError::from(e)
    })?;

    let preview_chars = state.config().server.preview_chars;
    info!(
        "Generated post for {:?} ({} chars, published: {})",
        outcome.topic.as_str(),
        outcome.document.char_len(),
        outcome.published()
    );

    Ok(Json(GenerateResponse {
        success: true,
        topic: outcome.topic.as_str().to_string(),
        preview: outcome.document.preview(preview_chars),
        full_length: outcome.document.char_len(),
        published: outcome.published(),
        url: outcome.url().map(str::to_string),
    }))
}
