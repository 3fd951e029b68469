//! Run options and report types.

use chrono::Duration;
use serde::Serialize;

use aromatag_core::{EngineConfig, Source};
use aromatag_store::CandidateSelector;

/// How one item ended up in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Classified and persisted.
    Tagged,
    /// Content-level problem recorded; retry-eligible in a later run.
    Failed,
    /// Lost the claim race or hit a storage fault; nothing was written.
    Skipped,
}

/// Per-item outcome line in a run report.
#[derive(Debug, Clone, Serialize)]
pub struct ItemOutcome {
    pub source: Source,
    pub id: String,
    pub outcome: OutcomeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Options for one batch run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub selector: CandidateSelector,
    pub batch_size: usize,
    pub claim_timeout: Duration,
    pub keyword_cap: usize,
}

impl RunOptions {
    pub fn from_config(config: &EngineConfig, force_retag: bool) -> Self {
        Self {
            selector: CandidateSelector {
                source: None,
                force_retag,
            },
            batch_size: config.batch_size,
            claim_timeout: config.claim_timeout(),
            keyword_cap: config.keyword_cap,
        }
    }
}

/// Aggregated result of one batch run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    #[serde(rename = "runId")]
    pub run_id: String,
    #[serde(rename = "rulesetVersion")]
    pub ruleset_version: String,
    #[serde(rename = "startedAt")]
    pub started_at: String,
    #[serde(rename = "durationMs")]
    pub duration_ms: u64,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub outcomes: Vec<ItemOutcome>,
    /// Storage incidents that did not fail a specific item.
    pub warnings: Vec<String>,
    /// True when systemic storage faults stopped the run before the
    /// candidate list was exhausted.
    #[serde(rename = "abortedEarly")]
    pub aborted_early: bool,
}
