use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::scoring::MatchScore;

/// An uploaded resume: original filename plus raw PDF bytes. Never mutated.
#[derive(Debug, Clone)]
pub struct ResumeFile {
    pub file_name: String,
    pub bytes: Bytes,
}

impl ResumeFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

/// What happened to one resume during a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResumeOutcome {
    Scored,
    /// The PDF could not be read; no inference call was made.
    ExtractionFailed { warning: String },
    InferenceFailed { warning: String },
    UnparseableResponse { warning: String },
}

impl ResumeOutcome {
    pub fn warning(&self) -> Option<&str> {
        match self {
            ResumeOutcome::Scored => None,
            ResumeOutcome::ExtractionFailed { warning }
            | ResumeOutcome::InferenceFailed { warning }
            | ResumeOutcome::UnparseableResponse { warning } => Some(warning),
        }
    }
}

/// One row of a batch: every uploaded file yields exactly one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub resume_name: String,
    pub score: MatchScore,
    pub outcome: ResumeOutcome,
}

impl ResultRecord {
    pub fn scored(resume_name: impl Into<String>, score: MatchScore) -> Self {
        Self {
            resume_name: resume_name.into(),
            score,
            outcome: ResumeOutcome::Scored,
        }
    }

    /// A failed resume keeps its place in the results with a score of 0.
    pub fn failed(resume_name: impl Into<String>, outcome: ResumeOutcome) -> Self {
        Self {
            resume_name: resume_name.into(),
            score: MatchScore::default(),
            outcome,
        }
    }
}
