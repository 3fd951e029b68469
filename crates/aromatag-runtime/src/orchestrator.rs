//! Per-item tagging state machine.

use chrono::{Duration, Utc};
use tracing::{debug, warn};

use aromatag_classify::{classify, normalize, qualify};
use aromatag_core::{ContentItem, Error, Result, Segment};
use aromatag_lexicon::Lexicon;
use aromatag_store::{SegmentLookup, TaggingStore};

use crate::types::{ItemOutcome, OutcomeKind};

/// Drives one content item through `untagged → classifying → tagged|failed`.
///
/// The only writer of tag states and results. The claim and the result
/// write are the only blocking operations; everything in between is pure
/// in-memory computation.
pub struct TaggingOrchestrator<'a> {
    store: &'a TaggingStore,
    segments: &'a dyn SegmentLookup,
    keyword_cap: usize,
}

impl<'a> TaggingOrchestrator<'a> {
    pub fn new(store: &'a TaggingStore, segments: &'a dyn SegmentLookup, keyword_cap: usize) -> Self {
        Self {
            store,
            segments,
            keyword_cap,
        }
    }

    /// Claim and classify one item.
    ///
    /// `Ok` covers every per-item outcome, including content failures and
    /// lost claim races. `Err` is reserved for storage faults: the item
    /// is left retryable and the caller decides whether the run goes on.
    pub fn process(
        &self,
        lexicon: &Lexicon,
        item: &ContentItem,
        force: bool,
        claim_timeout: Duration,
    ) -> Result<ItemOutcome> {
        let now = Utc::now();

        if !self.store.claim(item.source, &item.id, now, force, claim_timeout)? {
            debug!("lost claim race for {}:{}", item.source.as_str(), item.id);
            return Ok(ItemOutcome {
                source: item.source,
                id: item.id.clone(),
                outcome: OutcomeKind::Skipped,
                reason: Some("lost claim race".into()),
            });
        }

        let tokens = normalize(&item.text, lexicon);
        match classify(&tokens, lexicon, self.keyword_cap) {
            Ok(mut classification) => {
                // Declared-user fallback applies only when inference has no
                // signal; the classifier itself never sees external state.
                if classification.inferred_segment == Segment::Unknown {
                    if let Some(user_id) = item.declared_user_id {
                        match self.segments.segment_for_user(user_id) {
                            Ok(segment) => classification.inferred_segment = segment,
                            Err(e) => {
                                warn!("segment lookup failed for user {}: {}", user_id, e)
                            }
                        }
                    }
                }

                let lead = qualify(&classification);
                let version_tag = lexicon.version_tag();
                if let Err(e) = self.store.store_result(
                    item.source,
                    &item.id,
                    &classification,
                    &lead,
                    &version_tag,
                    now,
                ) {
                    // Put the item back so a later run retries it; if that
                    // also fails, the stale-claim deadline covers recovery.
                    if let Err(release_err) = self.store.release_claim(item.source, &item.id) {
                        warn!(
                            "failed to release claim on {}:{}: {}",
                            item.source.as_str(),
                            item.id,
                            release_err
                        );
                    }
                    return Err(e);
                }

                Ok(ItemOutcome {
                    source: item.source,
                    id: item.id.clone(),
                    outcome: OutcomeKind::Tagged,
                    reason: None,
                })
            }
            Err(Error::Validation(reason)) => {
                self.store.mark_failed(item.source, &item.id, &reason)?;
                Ok(ItemOutcome {
                    source: item.source,
                    id: item.id.clone(),
                    outcome: OutcomeKind::Failed,
                    reason: Some(reason),
                })
            }
            Err(e) => {
                // Unexpected processing fault: record it, keep no partial result.
                let reason = e.to_string();
                self.store.mark_failed(item.source, &item.id, &reason)?;
                Ok(ItemOutcome {
                    source: item.source,
                    id: item.id.clone(),
                    outcome: OutcomeKind::Failed,
                    reason: Some(reason),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aromatag_core::{Source, TagState};
    use aromatag_store::{NewItem, NoopSegmentLookup};
    use chrono::Duration;

    fn test_store() -> (TaggingStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = TaggingStore::open(dir.path().join("test.db")).unwrap();
        (store, dir)
    }

    fn timeout() -> Duration {
        Duration::minutes(10)
    }

    #[test]
    fn test_process_tags_item() {
        let (store, _dir) = test_store();
        store
            .insert_item(NewItem::new(
                Source::Review,
                "r1",
                "불면증 때문에 디퓨저 구매하고 싶어요, 정말 좋았어요",
            ))
            .unwrap();
        let item = store.get_item(Source::Review, "r1").unwrap().unwrap().item;

        let orchestrator = TaggingOrchestrator::new(&store, &NoopSegmentLookup, 10);
        let outcome = orchestrator
            .process(Lexicon::builtin(), &item, false, timeout())
            .unwrap();
        assert_eq!(outcome.outcome, OutcomeKind::Tagged);

        let record = store.get_item(Source::Review, "r1").unwrap().unwrap();
        assert_eq!(record.item.tag_state, TagState::Tagged);
        assert_eq!(
            record.item.ruleset_version,
            Some(Lexicon::builtin().version_tag())
        );
        assert!(record.classification.is_some());
        assert!(record.lead.is_some());
    }

    #[test]
    fn test_process_empty_text_fails_without_result() {
        let (store, _dir) = test_store();
        store
            .insert_item(NewItem::new(Source::BlogComment, "c1", "   \n\t "))
            .unwrap();
        let item = store.get_item(Source::BlogComment, "c1").unwrap().unwrap().item;

        let orchestrator = TaggingOrchestrator::new(&store, &NoopSegmentLookup, 10);
        let outcome = orchestrator
            .process(Lexicon::builtin(), &item, false, timeout())
            .unwrap();
        assert_eq!(outcome.outcome, OutcomeKind::Failed);

        let record = store.get_item(Source::BlogComment, "c1").unwrap().unwrap();
        assert_eq!(record.item.tag_state, TagState::Failed);
        assert!(record.classification.is_none());
        assert!(record.failure_reason.is_some());
    }

    #[test]
    fn test_process_skips_when_claim_lost() {
        let (store, _dir) = test_store();
        store
            .insert_item(NewItem::new(Source::Review, "r1", "좋아요"))
            .unwrap();
        let item = store.get_item(Source::Review, "r1").unwrap().unwrap().item;

        // A rival run claims the item between selection and processing.
        assert!(store
            .claim(Source::Review, "r1", Utc::now(), false, timeout())
            .unwrap());

        let orchestrator = TaggingOrchestrator::new(&store, &NoopSegmentLookup, 10);
        let outcome = orchestrator
            .process(Lexicon::builtin(), &item, false, timeout())
            .unwrap();
        assert_eq!(outcome.outcome, OutcomeKind::Skipped);

        // Still owned by the rival; nothing was written.
        let record = store.get_item(Source::Review, "r1").unwrap().unwrap();
        assert_eq!(record.item.tag_state, TagState::Classifying);
    }

    #[test]
    fn test_segment_fallback_only_when_unknown() {
        let (store, _dir) = test_store();
        store.set_user_segment(42, Segment::B2b).unwrap();

        // No segment signal in the text → fallback kicks in.
        store
            .insert_item(NewItem {
                declared_user_id: Some(42),
                ..NewItem::new(Source::Review, "r1", "그냥 괜찮았어요")
            })
            .unwrap();
        // Clear B2C signal in the text → fallback must not override it.
        store
            .insert_item(NewItem {
                declared_user_id: Some(42),
                ..NewItem::new(Source::Review, "r2", "집에서 혼자 쓰기 좋아요")
            })
            .unwrap();

        let orchestrator = TaggingOrchestrator::new(&store, &store, 10);
        for id in ["r1", "r2"] {
            let item = store.get_item(Source::Review, id).unwrap().unwrap().item;
            orchestrator
                .process(Lexicon::builtin(), &item, false, timeout())
                .unwrap();
        }

        let r1 = store.get_item(Source::Review, "r1").unwrap().unwrap();
        assert_eq!(r1.classification.unwrap().inferred_segment, Segment::B2b);
        let r2 = store.get_item(Source::Review, "r2").unwrap().unwrap();
        assert_eq!(r2.classification.unwrap().inferred_segment, Segment::B2c);
    }

    #[test]
    fn test_anonymous_unknown_stays_unknown() {
        let (store, _dir) = test_store();
        store
            .insert_item(NewItem::new(Source::Review, "r1", "그냥 괜찮았어요"))
            .unwrap();
        let item = store.get_item(Source::Review, "r1").unwrap().unwrap().item;

        let orchestrator = TaggingOrchestrator::new(&store, &store, 10);
        orchestrator
            .process(Lexicon::builtin(), &item, false, timeout())
            .unwrap();

        let record = store.get_item(Source::Review, "r1").unwrap().unwrap();
        assert_eq!(
            record.classification.unwrap().inferred_segment,
            Segment::Unknown
        );
    }
}
