use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::Config;
use crate::services::{Radio, SuggestBudget};

/// Shared application state
///
/// Reads (predictions, suggestions) hold the read guard for their whole
/// computation; every mutation takes the write guard.
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<RwLock<Radio>>,
    /// Cap on `limit` for ranked suggestions
    pub max_suggestions: usize,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// Creates an empty radio with default settings
    pub fn new() -> Self {
        Self::from_config(&Config::default())
    }

    pub fn from_config(config: &Config) -> Self {
        let budget = config
            .suggest_candidate_budget
            .map(SuggestBudget::with_max_candidates)
            .unwrap_or_default();

        Self {
            inner: Arc::new(RwLock::new(Radio::new(budget))),
            max_suggestions: config.max_suggestions.max(1),
        }
    }
}
