//! Batch runner — extracts and scores every uploaded resume against one job description.
//!
//! Pipeline per resume: temp file → text extraction → one inference call → `ResultRecord`.
//! A failed resume never aborts the batch; it is recorded with score 0 and a warning.

pub mod handlers;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::extraction::{extract_resume, TextExtractor};
use crate::models::resume::{ResultRecord, ResumeFile, ResumeOutcome};
use crate::scoring::{MatchScorer, ScoreError};

// ────────────────────────────────────────────────────────────────────────────
// Progress
// ────────────────────────────────────────────────────────────────────────────

/// Where the pipeline is: `Idle → Validating → Processing(i/n) → Presenting → Idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum PipelinePhase {
    #[default]
    Idle,
    Validating,
    Processing { completed: usize, total: usize },
    Presenting,
}

/// Shared handle on the current `PipelinePhase`. Cloning shares the channel.
#[derive(Clone)]
pub struct ProgressTracker {
    tx: Arc<watch::Sender<PipelinePhase>>,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(PipelinePhase::Idle);
        Self { tx: Arc::new(tx) }
    }

    pub fn set(&self, phase: PipelinePhase) {
        self.tx.send_replace(phase);
    }

    pub fn current(&self) -> PipelinePhase {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<PipelinePhase> {
        self.tx.subscribe()
    }

    /// Counts one more finished resume. Increments under the channel lock so
    /// concurrent workers never publish a stale count.
    fn advance(&self) {
        self.tx.send_modify(|phase| {
            if let PipelinePhase::Processing { completed, total } = phase {
                *completed = (*completed + 1).min(*total);
            }
        });
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Runner
// ────────────────────────────────────────────────────────────────────────────

/// Output of one batch. `records` are in upload order, one per uploaded file.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub batch_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub records: Vec<ResultRecord>,
}

pub struct BatchRunner {
    extractor: Arc<dyn TextExtractor>,
    scorer: Arc<dyn MatchScorer>,
    concurrency: usize,
    temp_dir: Option<PathBuf>,
}

impl BatchRunner {
    pub fn new(extractor: Arc<dyn TextExtractor>, scorer: Arc<dyn MatchScorer>) -> Self {
        Self {
            extractor,
            scorer,
            concurrency: 1,
            temp_dir: None,
        }
    }

    /// Maximum number of resumes in flight. 1 processes strictly one after another.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_temp_dir(mut self, temp_dir: Option<PathBuf>) -> Self {
        self.temp_dir = temp_dir;
        self
    }

    /// Runs the whole batch to completion. There is no cancellation.
    ///
    /// Resumes start in upload order; with `concurrency > 1` they may finish out of
    /// order, but each record is slotted back at its upload index.
    pub async fn run(
        &self,
        job_description: &str,
        files: Vec<ResumeFile>,
        progress: &ProgressTracker,
    ) -> BatchReport {
        let batch_id = Uuid::new_v4();
        let started_at = Utc::now();
        let total = files.len();

        info!(
            "Batch {batch_id} started: {total} resume(s), concurrency {}",
            self.concurrency
        );
        progress.set(PipelinePhase::Processing {
            completed: 0,
            total,
        });

        let job_description: Arc<str> = Arc::from(job_description);
        let names: Vec<String> = files.iter().map(|f| f.file_name.clone()).collect();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut set = JoinSet::new();

        for (index, file) in files.into_iter().enumerate() {
            // Taking the permit before spawning keeps start order == upload order.
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };
            let extractor = self.extractor.clone();
            let scorer = self.scorer.clone();
            let job_description = job_description.clone();
            let temp_dir = self.temp_dir.clone();
            let progress = progress.clone();

            set.spawn(async move {
                let record = process_resume(
                    &job_description,
                    &file,
                    extractor,
                    scorer.as_ref(),
                    temp_dir,
                )
                .await;
                drop(permit);
                progress.advance();
                (index, record)
            });
        }

        let mut slots: Vec<Option<ResultRecord>> = vec![None; total];
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, record)) => slots[index] = Some(record),
                Err(e) => warn!("Resume task in batch {batch_id} failed: {e}"),
            }
        }

        // A task that died without reporting still owes its resume a row.
        let records: Vec<ResultRecord> = slots
            .into_iter()
            .zip(names)
            .map(|(slot, name)| {
                slot.unwrap_or_else(|| {
                    progress.advance();
                    ResultRecord::failed(
                        name,
                        ResumeOutcome::InferenceFailed {
                            warning: "Resume processing was interrupted".to_string(),
                        },
                    )
                })
            })
            .collect();

        let failed = records
            .iter()
            .filter(|r| r.outcome != ResumeOutcome::Scored)
            .count();
        info!("Batch {batch_id} finished: {total} resume(s), {failed} with warnings");

        BatchReport {
            batch_id,
            started_at,
            finished_at: Utc::now(),
            records,
        }
    }
}

/// Extracts and scores one resume, folding every failure into the record.
async fn process_resume(
    job_description: &str,
    file: &ResumeFile,
    extractor: Arc<dyn TextExtractor>,
    scorer: &dyn MatchScorer,
    temp_dir: Option<PathBuf>,
) -> ResultRecord {
    let resume_text = match extract_resume(extractor, file, temp_dir).await {
        Ok(text) => text,
        Err(e) => {
            warn!("{}: {e}", file.file_name);
            return ResultRecord::failed(
                file.file_name.clone(),
                ResumeOutcome::ExtractionFailed {
                    warning: e.to_string(),
                },
            );
        }
    };

    match scorer.score(job_description, &resume_text).await {
        Ok(score) => {
            debug!("{} scored {score}", file.file_name);
            ResultRecord::scored(file.file_name.clone(), score)
        }
        Err(e @ ScoreError::Unparseable(_)) => {
            warn!("{}: {e}", file.file_name);
            ResultRecord::failed(
                file.file_name.clone(),
                ResumeOutcome::UnparseableResponse {
                    warning: e.to_string(),
                },
            )
        }
        Err(e @ ScoreError::Inference(_)) => {
            warn!("{}: {e}", file.file_name);
            ResultRecord::failed(
                file.file_name.clone(),
                ResumeOutcome::InferenceFailed {
                    warning: e.to_string(),
                },
            )
        }
    }
}
