//! Batch runner — drives the orchestrator over a bounded candidate set.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use aromatag_lexicon::Lexicon;
use aromatag_store::{SegmentLookup, TaggingStore};

use crate::orchestrator::TaggingOrchestrator;
use crate::types::{ItemOutcome, OutcomeKind, RunOptions, RunReport};

/// Storage faults tolerated in a row before the rest of the run is
/// abandoned as systemic.
const MAX_CONSECUTIVE_STORAGE_FAULTS: usize = 3;

/// Selects candidates and processes them independently: one item's
/// failure never aborts the batch.
pub struct BatchRunner;

impl BatchRunner {
    pub fn run(
        store: &TaggingStore,
        lexicon: &Lexicon,
        segments: &dyn SegmentLookup,
        options: &RunOptions,
    ) -> RunReport {
        let started = Utc::now();
        let start_instant = std::time::Instant::now();
        let ruleset_version = lexicon.version_tag();

        let mut report = RunReport {
            run_id: Uuid::new_v4().to_string(),
            ruleset_version: ruleset_version.clone(),
            started_at: started.to_rfc3339(),
            duration_ms: 0,
            succeeded: 0,
            failed: 0,
            skipped: 0,
            outcomes: Vec::new(),
            warnings: Vec::new(),
            aborted_early: false,
        };

        info!(
            "Starting tagging run {} (ruleset: {}, batch_size: {}, force_retag: {})",
            report.run_id, ruleset_version, options.batch_size, options.selector.force_retag
        );

        let candidates = match store.select_candidates(
            options.selector,
            options.batch_size,
            started,
            options.claim_timeout,
        ) {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("candidate selection failed: {}", e);
                report.warnings.push(format!("candidate selection failed: {}", e));
                report.aborted_early = true;
                report.duration_ms = start_instant.elapsed().as_millis() as u64;
                return report;
            }
        };

        let orchestrator = TaggingOrchestrator::new(store, segments, options.keyword_cap);
        let mut consecutive_faults = 0usize;

        for item in &candidates {
            match orchestrator.process(
                lexicon,
                item,
                options.selector.force_retag,
                options.claim_timeout,
            ) {
                Ok(outcome) => {
                    consecutive_faults = 0;
                    match outcome.outcome {
                        OutcomeKind::Tagged => report.succeeded += 1,
                        OutcomeKind::Failed => report.failed += 1,
                        OutcomeKind::Skipped => report.skipped += 1,
                    }
                    report.outcomes.push(outcome);
                }
                Err(e) => {
                    // Storage fault: the item stays retryable; the run goes
                    // on unless the store looks systemically broken.
                    consecutive_faults += 1;
                    let message =
                        format!("{}:{}: {}", item.source.as_str(), item.id, e);
                    warn!("storage fault during run: {}", message);
                    report.warnings.push(message);
                    report.skipped += 1;
                    report.outcomes.push(ItemOutcome {
                        source: item.source,
                        id: item.id.clone(),
                        outcome: OutcomeKind::Skipped,
                        reason: Some(e.to_string()),
                    });

                    if consecutive_faults >= MAX_CONSECUTIVE_STORAGE_FAULTS {
                        warn!(
                            "aborting run {} after {} consecutive storage faults",
                            report.run_id, consecutive_faults
                        );
                        report.aborted_early = true;
                        break;
                    }
                }
            }
        }

        report.duration_ms = start_instant.elapsed().as_millis() as u64;
        info!(
            "Run {} complete: {} tagged, {} failed, {} skipped in {}ms",
            report.run_id, report.succeeded, report.failed, report.skipped, report.duration_ms
        );
        report
    }
}
