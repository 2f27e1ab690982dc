//! Topic rotation status.

use axum::{extract::State, Json};
use std::sync::Arc;
use dailydose_core::RotationStatus;

use super::generate::ApiError;
use crate::state::AppState;

/// `GET /api/v1/topics`: catalog size, ledger progress and the next topic.
///
/// Read-only; an exhausted catalog reports `next: null` and the ledger is
/// never reset here.
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RotationStatus>, ApiError> {
    let status = state.rotation_status()?;
    Ok(Json(status))
}
