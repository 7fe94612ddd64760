//! Axum route handlers for reading the latest batch's results.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use crate::errors::AppError;
use crate::presenter::{RankedResults, ResultsResponse, CSV_CONTENT_TYPE, CSV_FILE_NAME};
use crate::state::AppState;

async fn latest_results(state: &AppState) -> Result<RankedResults, AppError> {
    state
        .session
        .read()
        .await
        .latest
        .clone()
        .ok_or_else(|| AppError::NotFound("No batch has been processed yet".to_string()))
}

/// GET /api/v1/results
///
/// Ranked table of the most recent completed batch.
pub async fn handle_get_results(
    State(state): State<AppState>,
) -> Result<Json<ResultsResponse>, AppError> {
    let results = latest_results(&state).await?;
    Ok(Json(results.to_response()))
}

/// GET /api/v1/results/csv
///
/// Downloads the same table as `ats_results.csv`.
pub async fn handle_download_csv(State(state): State<AppState>) -> Result<Response, AppError> {
    let results = latest_results(&state).await?;
    let csv = results.to_csv()?;

    Ok((
        [
            (header::CONTENT_TYPE, CSV_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{CSV_FILE_NAME}\""),
            ),
        ],
        csv,
    )
        .into_response())
}
