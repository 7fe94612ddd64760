//! Deterministic stand-ins for the PDF backend and the inference endpoint.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::Config;
use crate::extraction::{ExtractionError, TextExtractor};
use crate::llm_client::LlmError;
use crate::scoring::{parse_score, MatchScore, MatchScorer, ScoreError};
use crate::state::AppState;

/// Bytes starting with this marker are treated as an unreadable PDF.
pub const CORRUPT_MARKER: &[u8] = b"%CORRUPT";

/// Treats the uploaded bytes as the resume's text.
pub struct FakePdfExtractor;

impl TextExtractor for FakePdfExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        let bytes = std::fs::read(path).map_err(|e| ExtractionError(e.to_string()))?;
        if bytes.starts_with(CORRUPT_MARKER) {
            return Err(ExtractionError("invalid file header".to_string()));
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Answers with a canned model reply per resume text and counts calls.
/// A reply of `"!fail"` (or an unknown resume) simulates an API failure.
#[derive(Default)]
pub struct StubScorer {
    replies: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
}

impl StubScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, resume_text: &str, reply: &str) -> Self {
        self.replies
            .insert(resume_text.to_string(), reply.to_string());
        self
    }

    pub fn delay(mut self, resume_text: &str, millis: u64) -> Self {
        self.delays
            .insert(resume_text.to_string(), Duration::from_millis(millis));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MatchScorer for StubScorer {
    async fn score(
        &self,
        _job_description: &str,
        resume_text: &str,
    ) -> Result<MatchScore, ScoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(resume_text) {
            tokio::time::sleep(*delay).await;
        }
        match self.replies.get(resume_text).map(String::as_str) {
            Some("!fail") | None => Err(ScoreError::Inference(LlmError::Api {
                status: 500,
                message: "upstream unavailable".to_string(),
            })),
            Some(reply) => Ok(parse_score(reply)?),
        }
    }
}

/// App state wired to the fakes. `scorer: None` models a missing API key.
pub fn test_state(scorer: Option<Arc<StubScorer>>) -> AppState {
    let config = Config {
        groq_api_key: scorer.as_ref().map(|_| "test-key".to_string()),
        ..Config::default()
    };
    AppState::new(
        config,
        scorer.map(|s| s as Arc<dyn MatchScorer>),
        Arc::new(FakePdfExtractor),
    )
}
