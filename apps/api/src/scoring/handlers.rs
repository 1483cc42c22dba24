use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::errors::AppError;
use crate::scoring::{submit, SubmissionInput, SubmissionResult};
use crate::state::AppState;

/// POST /api/v1/tests/:token/submissions
pub async fn handle_submit(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(input): Json<SubmissionInput>,
) -> Result<(StatusCode, Json<SubmissionResult>), AppError> {
    let result = submit(state.store.as_ref(), &token, input, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(result)))
}
