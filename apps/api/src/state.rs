use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::batch::ProgressTracker;
use crate::config::Config;
use crate::extraction::TextExtractor;
use crate::presenter::RankedResults;
use crate::scoring::MatchScorer;

/// Results visible to the user. Replaced wholesale when a batch completes,
/// never mutated in place.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub latest: Option<RankedResults>,
}

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// `None` when no API key is configured; batch submissions then fail with a
    /// configuration error.
    pub scorer: Option<Arc<dyn MatchScorer>>,
    pub extractor: Arc<dyn TextExtractor>,
    pub session: Arc<RwLock<Session>>,
    pub progress: ProgressTracker,
    /// Held for the duration of a batch; one batch at a time.
    pub batch_slot: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(
        config: Config,
        scorer: Option<Arc<dyn MatchScorer>>,
        extractor: Arc<dyn TextExtractor>,
    ) -> Self {
        Self {
            config,
            scorer,
            extractor,
            session: Arc::new(RwLock::new(Session::default())),
            progress: ProgressTracker::new(),
            batch_slot: Arc::new(Mutex::new(())),
        }
    }
}
