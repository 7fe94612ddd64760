//! Results presenter — ranks a finished batch and renders it as a table or CSV.

pub mod handlers;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::batch::BatchReport;
use crate::models::resume::ResultRecord;

pub const CSV_FILE_NAME: &str = "ats_results.csv";
pub const CSV_CONTENT_TYPE: &str = "text/csv";
const CSV_HEADER: [&str; 2] = ["Resume", "Match Score"];

/// A batch's records, best match first.
#[derive(Debug, Clone, Serialize)]
pub struct RankedResults {
    pub batch_id: Uuid,
    pub finished_at: DateTime<Utc>,
    pub rows: Vec<ResultRecord>,
}

/// One displayed table row: `Resume Name | Match Score`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub resume_name: String,
    /// Formatted as shown to users, e.g. `"73%"`.
    pub match_score: String,
}

/// A per-resume problem worth showing next to the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResumeWarning {
    pub resume_name: String,
    pub message: String,
}

/// JSON shape returned by the batch and results endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ResultsResponse {
    pub batch_id: Uuid,
    pub finished_at: DateTime<Utc>,
    pub table: Vec<TableRow>,
    pub records: Vec<ResultRecord>,
    pub warnings: Vec<ResumeWarning>,
}

impl RankedResults {
    /// Sorts by score, highest first. The sort is stable: equal scores keep
    /// upload order.
    pub fn present(report: BatchReport) -> Self {
        let mut rows = report.records;
        rows.sort_by(|a, b| b.score.cmp(&a.score));
        Self {
            batch_id: report.batch_id,
            finished_at: report.finished_at,
            rows,
        }
    }

    pub fn table(&self) -> Vec<TableRow> {
        self.rows
            .iter()
            .map(|r| TableRow {
                resume_name: r.resume_name.clone(),
                match_score: r.score.to_string(),
            })
            .collect()
    }

    pub fn warnings(&self) -> Vec<ResumeWarning> {
        self.rows
            .iter()
            .filter_map(|r| {
                r.outcome.warning().map(|message| ResumeWarning {
                    resume_name: r.resume_name.clone(),
                    message: message.to_string(),
                })
            })
            .collect()
    }

    /// `Resume,Match Score` header plus one row per ranked record, scores
    /// formatted exactly as in `table()`.
    pub fn to_csv(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(CSV_HEADER)
            .context("Failed to write CSV header")?;
        for row in self.table() {
            writer
                .write_record([row.resume_name.as_str(), row.match_score.as_str()])
                .context("Failed to write CSV row")?;
        }
        writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush CSV: {}", e.error()))
    }

    pub fn to_response(&self) -> ResultsResponse {
        ResultsResponse {
            batch_id: self.batch_id,
            finished_at: self.finished_at,
            table: self.table(),
            records: self.rows.clone(),
            warnings: self.warnings(),
        }
    }
}
