//! Engine configuration.

use std::path::PathBuf;

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Tuning knobs for the tagging engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// SQLite database file (e.g., `data/aromatag.db`).
    pub db_path: PathBuf,
    /// Maximum items selected per batch run.
    pub batch_size: usize,
    /// Minutes after which a `classifying` claim is considered abandoned
    /// and becomes retry-eligible.
    pub claim_timeout_minutes: i64,
    /// Maximum keywords kept per classification.
    pub keyword_cap: usize,
}

impl EngineConfig {
    /// Build configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        let db_path = std::env::var("AROMATAG_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/aromatag.db"));

        let batch_size = std::env::var("AROMATAG_BATCH_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(50);

        let claim_timeout_minutes = std::env::var("AROMATAG_CLAIM_TIMEOUT_MIN")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        Self {
            db_path,
            batch_size,
            claim_timeout_minutes,
            keyword_cap: 10,
        }
    }

    pub fn claim_timeout(&self) -> Duration {
        Duration::minutes(self.claim_timeout_minutes)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("data/aromatag.db"),
            batch_size: 50,
            claim_timeout_minutes: 10,
            keyword_cap: 10,
        }
    }
}
