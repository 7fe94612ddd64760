//! Match scoring — asks the LLM how well one resume fits a job description.
//!
//! `AppState` holds an `Arc<dyn MatchScorer>` when an API key is configured.
//! The production backend is `LlmMatchScorer`; tests swap in deterministic stubs.

pub mod prompts;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm_client::{LlmClient, LlmError};
use crate::scoring::prompts::build_match_prompt;

/// Model-judged relevance of a resume to a job description, 0 – 100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchScore(u8);

impl MatchScore {
    pub const MAX: u8 = 100;

    /// Builds a score, saturating anything above 100.
    pub fn saturating(value: u64) -> Self {
        Self(value.min(Self::MAX as u64) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

/// Renders the way the results table and CSV show it: `73%`.
impl fmt::Display for MatchScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("response contains no number: {0:?}")]
    NoDigits(String),
}

/// Parses a score from free-text model output.
///
/// The first contiguous run of ASCII digits anywhere in `text` is the score;
/// digits from other scripts are not recognised;
/// everything else is ignored. `"Score: 57 out of 100"` parses as 57.
/// Values above 100 (including runs too long for any integer type) saturate to 100.
pub fn parse_score(text: &str) -> Result<MatchScore, ParseError> {
    let start = text
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| ParseError::NoDigits(text.to_string()))?;
    let digits: &str = {
        let rest = &text[start..];
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        &rest[..end]
    };

    let value = digits.parse::<u64>().unwrap_or(u64::MAX);
    Ok(MatchScore::saturating(value))
}

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("Error with inference API: {0}")]
    Inference(#[from] LlmError),

    #[error("Unparseable score: {0}")]
    Unparseable(#[from] ParseError),
}

/// Implement this to swap scoring backends without touching the batch runner
/// or the handlers.
#[async_trait]
pub trait MatchScorer: Send + Sync {
    async fn score(&self, job_description: &str, resume_text: &str)
        -> Result<MatchScore, ScoreError>;
}

/// Scores one resume with a single chat-completion call. No caching: every
/// call goes to the endpoint, even for identical inputs.
pub struct LlmMatchScorer(pub LlmClient);

#[async_trait]
impl MatchScorer for LlmMatchScorer {
    async fn score(
        &self,
        job_description: &str,
        resume_text: &str,
    ) -> Result<MatchScore, ScoreError> {
        let prompt = build_match_prompt(job_description, resume_text);
        let answer = self.0.call_text(&prompt).await?;
        Ok(parse_score(&answer)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_number() {
        assert_eq!(parse_score("85").unwrap().value(), 85);
    }

    #[test]
    fn test_parse_uses_first_digit_run() {
        assert_eq!(parse_score("Score: 57 out of 100").unwrap().value(), 57);
    }

    #[test]
    fn test_parse_with_surrounding_whitespace() {
        assert_eq!(parse_score("\n  42\n").unwrap().value(), 42);
    }

    #[test]
    fn test_parse_number_glued_to_text() {
        assert_eq!(parse_score("match=73%").unwrap().value(), 73);
    }

    #[test]
    fn test_parse_zero() {
        assert_eq!(parse_score("0").unwrap(), MatchScore::default());
    }

    #[test]
    fn test_parse_no_digits_is_error() {
        let err = parse_score("I cannot score this resume.").unwrap_err();
        assert!(matches!(err, ParseError::NoDigits(_)));
    }

    #[test]
    fn test_parse_empty_is_error() {
        assert!(parse_score("").is_err());
    }

    #[test]
    fn test_only_ascii_digits_count() {
        // Arabic-Indic "٥٧" is not read as 57.
        assert!(matches!(
            parse_score("\u{665}\u{667}"),
            Err(ParseError::NoDigits(_))
        ));
        assert_eq!(parse_score("\u{665}\u{667} / 64").unwrap().value(), 64);
    }

    #[test]
    fn test_out_of_range_saturates() {
        assert_eq!(parse_score("150").unwrap().value(), 100);
        assert_eq!(
            parse_score("99999999999999999999999999").unwrap().value(),
            100
        );
    }

    #[test]
    fn test_decimal_takes_integer_part() {
        assert_eq!(parse_score("87.5").unwrap().value(), 87);
    }

    #[test]
    fn test_display_is_percent() {
        assert_eq!(MatchScore::saturating(73).to_string(), "73%");
        assert_eq!(MatchScore::default().to_string(), "0%");
    }

    #[test]
    fn test_serializes_as_bare_integer() {
        let json = serde_json::to_string(&MatchScore::saturating(64)).unwrap();
        assert_eq!(json, "64");
    }

    #[test]
    fn test_score_error_messages() {
        let err = ScoreError::from(LlmError::EmptyContent);
        assert_eq!(
            err.to_string(),
            "Error with inference API: LLM returned empty content"
        );
        let err = ScoreError::from(ParseError::NoDigits("n/a".to_string()));
        assert!(err.to_string().starts_with("Unparseable score"));
    }
}
