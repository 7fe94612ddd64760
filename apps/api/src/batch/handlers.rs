//! Axum route handlers for the Batch API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use tracing::info;

use crate::batch::{BatchRunner, PipelinePhase, ProgressTracker};
use crate::errors::AppError;
use crate::models::resume::ResumeFile;
use crate::presenter::{RankedResults, ResultsResponse};
use crate::state::{AppState, Session};

const MISSING_API_KEY: &str =
    "GROQ API key not found in environment variables. Please check your .env file.";

/// Form fields of a batch submission.
#[derive(Debug, Default)]
struct BatchUpload {
    job_description: String,
    files: Vec<ResumeFile>,
}

/// POST /api/v1/batches
///
/// Multipart form: `job_description` text plus one or more `resumes` PDF files.
/// Runs the whole batch, replaces the session's results and returns the ranked table.
///
/// The batch runs on its own task: a client that disconnects mid-batch does not
/// cancel it, and the results still land in the session.
pub async fn handle_create_batch(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ResultsResponse>, AppError> {
    let slot = state
        .batch_slot
        .clone()
        .try_lock_owned()
        .map_err(|_| AppError::Conflict("A batch is already being processed".to_string()))?;

    let phase_reset = ResetPhaseOnDrop(state.progress.clone());
    state.progress.set(PipelinePhase::Validating);
    let upload = read_upload(multipart).await?;

    let task_state = state.clone();
    let batch = tokio::spawn(async move {
        let _slot = slot;
        let _phase_reset = phase_reset;
        submit_batch(&task_state, upload).await
    });

    batch
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Batch task failed: {e}")))?
        .map(Json)
}

/// GET /api/v1/batches/progress
pub async fn handle_get_progress(State(state): State<AppState>) -> Json<PipelinePhase> {
    Json(state.progress.current())
}

/// Puts the pipeline back to `Idle` on every exit path, including rejected
/// submissions and dropped requests.
struct ResetPhaseOnDrop(ProgressTracker);

impl Drop for ResetPhaseOnDrop {
    fn drop(&mut self) {
        self.0.set(PipelinePhase::Idle);
    }
}

async fn submit_batch(state: &AppState, upload: BatchUpload) -> Result<ResultsResponse, AppError> {
    if upload.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }
    if upload.files.is_empty() {
        return Err(AppError::Validation(
            "at least one PDF resume is required".to_string(),
        ));
    }

    // Checked before any file is touched: no key, no work.
    let scorer = state
        .scorer
        .clone()
        .ok_or_else(|| AppError::Configuration(MISSING_API_KEY.to_string()))?;

    info!("Received batch of {} resume(s)", upload.files.len());

    let runner = BatchRunner::new(state.extractor.clone(), scorer)
        .with_concurrency(state.config.scan_concurrency)
        .with_temp_dir(state.config.scan_temp_dir.clone());
    let report = runner
        .run(&upload.job_description, upload.files, &state.progress)
        .await;

    state.progress.set(PipelinePhase::Presenting);
    let ranked = RankedResults::present(report);
    let response = ranked.to_response();
    *state.session.write().await = Session {
        latest: Some(ranked),
    };

    Ok(response)
}

async fn read_upload(mut multipart: Multipart) -> Result<BatchUpload, AppError> {
    let mut upload = BatchUpload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?
    {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "job_description" => {
                upload.job_description = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Unreadable job_description: {e}")))?;
            }
            "resumes" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Unreadable file '{file_name}': {e}")))?;
                // Browsers send one empty part when no file was picked.
                if file_name.is_empty() && data.is_empty() {
                    continue;
                }
                if !is_pdf_file_name(&file_name) {
                    return Err(AppError::Validation(format!(
                        "'{file_name}' is not a PDF. Only .pdf files are accepted"
                    )));
                }
                upload.files.push(ResumeFile::new(file_name, data));
            }
            _ => {
                field.bytes().await.map_err(|e| {
                    AppError::Validation(format!("Unreadable field '{field_name}': {e}"))
                })?;
            }
        }
    }

    Ok(upload)
}

fn is_pdf_file_name(file_name: &str) -> bool {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}
