//! SQLite-backed tagging store.
//!
//! The claim is a single conditional UPDATE (compare-and-swap on
//! `tag_state`), so concurrent runs observing the same untagged item race
//! safely: exactly one wins, the loser sees zero affected rows.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use crate::schema::SCHEMA_SQL;
use crate::segment::SegmentLookup;
use crate::types::*;
use aromatag_core::{
    Classification, ContentItem, Error, Intent, LeadPrediction, NextAction, Result, Segment,
    Sentiment, Source, TagState,
};

/// Persistence for content items, their tagging lifecycle, and analytics.
pub struct TaggingStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl TaggingStore {
    /// Open or create the store at `db_path`, creating parent directories.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| Error::Storage(e.to_string()))?;
            }
        }

        let conn = Self::create_connection(&db_path)?;
        Self::init_schema(&conn)?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path,
        };

        let counts = store.tag_state_counts()?;
        info!(
            "TaggingStore initialized: {} untagged, {} tagged, {} failed, path={}",
            counts.untagged,
            counts.tagged,
            counts.failed,
            store.db_path.display()
        );

        Ok(store)
    }

    fn create_connection(db_path: &Path) -> Result<Connection> {
        let conn = Connection::open(db_path).map_err(|e| Error::Database(e.to_string()))?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(conn)
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| Error::Database(format!("Schema init failed: {}", e)))?;
        Ok(())
    }

    // ---------------------------------------------------------------
    // Item CRUD
    // ---------------------------------------------------------------

    /// Insert a content item in `untagged` state (import-side helper).
    pub fn insert_item(&self, new: NewItem) -> Result<()> {
        let now = new.created_at.unwrap_or_else(|| Utc::now().timestamp_millis());

        let conn = self.conn.lock();
        conn.prepare_cached(
            "INSERT INTO content_items (source, source_id, text, declared_user_id, tag_state, created_at) \
             VALUES (?1, ?2, ?3, ?4, 'untagged', ?5)",
        )
        .map_err(|e| Error::Database(e.to_string()))?
        .execute(params![
            new.source.as_str(),
            new.id,
            new.text,
            new.declared_user_id,
            now,
        ])
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint") {
                Error::Conflict(format!("{}:{} already exists", new.source.as_str(), new.id))
            } else {
                Error::Database(e.to_string())
            }
        })?;
        Ok(())
    }

    /// Fetch one item with whatever tagging produced.
    pub fn get_item(&self, source: Source, id: &str) -> Result<Option<ItemRecord>> {
        let conn = self.conn.lock();
        let row = conn
            .prepare_cached("SELECT * FROM content_items WHERE source = ?1 AND source_id = ?2")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![source.as_str(), id], |row| {
                Ok(Self::row_to_record(row))
            })
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(row)
    }

    /// Count all items.
    pub fn count_items(&self) -> Result<i64> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM content_items", [], |row| row.get(0))
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(count)
    }

    // ---------------------------------------------------------------
    // Candidate Selection & Claiming
    // ---------------------------------------------------------------

    /// Select items eligible for tagging.
    ///
    /// Default: `untagged` items plus `classifying` items whose claim went
    /// stale (older than `claim_timeout`). With `force_retag`, tagged and
    /// failed items are also selected.
    pub fn select_candidates(
        &self,
        selector: CandidateSelector,
        limit: usize,
        now: DateTime<Utc>,
        claim_timeout: Duration,
    ) -> Result<Vec<ContentItem>> {
        let stale_before = (now - claim_timeout).timestamp_millis();
        let source = selector.source.map(|s| s.as_str());

        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT * FROM content_items \
                 WHERE (tag_state = 'untagged' \
                        OR (tag_state = 'classifying' AND claimed_at < ?1) \
                        OR (?2 AND tag_state IN ('tagged', 'failed'))) \
                   AND (?3 IS NULL OR source = ?3) \
                 ORDER BY created_at ASC \
                 LIMIT ?4",
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map(
                params![stale_before, selector.force_retag, source, limit as i64],
                |row| Ok(Self::row_to_record(row).item),
            )
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// Atomically claim an item for classification.
    ///
    /// Returns `false` when the claim was lost: the item is no longer in a
    /// claimable state (another run got there first).
    pub fn claim(
        &self,
        source: Source,
        id: &str,
        now: DateTime<Utc>,
        force: bool,
        claim_timeout: Duration,
    ) -> Result<bool> {
        let stale_before = (now - claim_timeout).timestamp_millis();
        let sql = if force {
            // Force-retag may re-enter tagged/failed, but never an item
            // another run is actively classifying.
            "UPDATE content_items SET tag_state = 'classifying', claimed_at = ?1 \
             WHERE source = ?2 AND source_id = ?3 \
               AND (tag_state IN ('untagged', 'tagged', 'failed') \
                    OR (tag_state = 'classifying' AND claimed_at < ?4))"
        } else {
            "UPDATE content_items SET tag_state = 'classifying', claimed_at = ?1 \
             WHERE source = ?2 AND source_id = ?3 \
               AND (tag_state = 'untagged' \
                    OR (tag_state = 'classifying' AND claimed_at < ?4))"
        };

        let conn = self.conn.lock();
        let count = conn
            .prepare_cached(sql)
            .map_err(|e| Error::Database(e.to_string()))?
            .execute(params![
                now.timestamp_millis(),
                source.as_str(),
                id,
                stale_before
            ])
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(count == 1)
    }

    /// Return a claimed item to `untagged` so a later run retries it.
    pub fn release_claim(&self, source: Source, id: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let count = conn
            .prepare_cached(
                "UPDATE content_items SET tag_state = 'untagged', claimed_at = NULL \
                 WHERE source = ?1 AND source_id = ?2 AND tag_state = 'classifying'",
            )
            .map_err(|e| Error::Database(e.to_string()))?
            .execute(params![source.as_str(), id])
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(count == 1)
    }

    // ---------------------------------------------------------------
    // Result Writes
    // ---------------------------------------------------------------

    /// Persist a classification and transition `classifying → tagged` in
    /// one statement; no partially-written result is ever observable.
    pub fn store_result(
        &self,
        source: Source,
        id: &str,
        classification: &Classification,
        lead: &LeadPrediction,
        ruleset_version: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let keywords_json = serde_json::to_string(&classification.keywords)?;
        let symptoms_json = serde_json::to_string(&classification.matched_symptom_tags)?;
        let pains_json = serde_json::to_string(&classification.pain_points)?;

        let conn = self.conn.lock();
        let count = conn
            .prepare_cached(
                "UPDATE content_items SET \
                     tag_state = 'tagged', \
                     sentiment = ?1, sentiment_score = ?2, intent = ?3, keywords_json = ?4, \
                     inferred_segment = ?5, symptom_tags_json = ?6, pain_points_json = ?7, \
                     next_action = ?8, conversion_probability = ?9, lead_reasoning = ?10, \
                     ruleset_version = ?11, failure_reason = NULL, claimed_at = NULL, \
                     tagged_at = ?12 \
                 WHERE source = ?13 AND source_id = ?14 AND tag_state = 'classifying'",
            )
            .map_err(|e| Error::Database(e.to_string()))?
            .execute(params![
                classification.sentiment.as_str(),
                classification.sentiment_score,
                classification.intent.as_str(),
                keywords_json,
                classification.inferred_segment.as_str(),
                symptoms_json,
                pains_json,
                lead.next_action.as_str(),
                lead.conversion_probability,
                lead.reasoning,
                ruleset_version,
                now.timestamp_millis(),
                source.as_str(),
                id,
            ])
            .map_err(|e| Error::Database(e.to_string()))?;

        if count == 1 {
            Ok(())
        } else {
            Err(Error::Storage(format!(
                "result write for {}:{} outside classifying state",
                source.as_str(),
                id
            )))
        }
    }

    /// Record a failure: `classifying → failed`, clearing any stale result
    /// columns from a previous tagging.
    pub fn mark_failed(&self, source: Source, id: &str, reason: &str) -> Result<()> {
        let conn = self.conn.lock();
        let count = conn
            .prepare_cached(
                "UPDATE content_items SET \
                     tag_state = 'failed', failure_reason = ?1, claimed_at = NULL, \
                     sentiment = NULL, sentiment_score = NULL, intent = NULL, \
                     keywords_json = NULL, inferred_segment = NULL, \
                     symptom_tags_json = NULL, pain_points_json = NULL, \
                     next_action = NULL, conversion_probability = NULL, \
                     lead_reasoning = NULL, ruleset_version = NULL, tagged_at = NULL \
                 WHERE source = ?2 AND source_id = ?3 AND tag_state = 'classifying'",
            )
            .map_err(|e| Error::Database(e.to_string()))?
            .execute(params![reason, source.as_str(), id])
            .map_err(|e| Error::Database(e.to_string()))?;

        if count == 1 {
            Ok(())
        } else {
            Err(Error::Storage(format!(
                "failure write for {}:{} outside classifying state",
                source.as_str(),
                id
            )))
        }
    }

    // ---------------------------------------------------------------
    // User Segments
    // ---------------------------------------------------------------

    /// Record a user's known segment (collaborator-side helper).
    pub fn set_user_segment(&self, user_id: i64, segment: Segment) -> Result<()> {
        let conn = self.conn.lock();
        conn.prepare_cached(
            "INSERT OR REPLACE INTO user_segments (user_id, segment) VALUES (?1, ?2)",
        )
        .map_err(|e| Error::Database(e.to_string()))?
        .execute(params![user_id, segment.as_str()])
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    // ---------------------------------------------------------------
    // Analytics
    // ---------------------------------------------------------------

    /// Items per tag state.
    pub fn tag_state_counts(&self) -> Result<TagStateCounts> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT tag_state, COUNT(*) FROM content_items GROUP BY tag_state",
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| {
                let state: String = row.get(0)?;
                let count: i64 = row.get(1)?;
                Ok((state, count))
            })
            .map_err(|e| Error::Database(e.to_string()))?;

        let mut counts = TagStateCounts::default();
        for row in rows.filter_map(|r| r.ok()) {
            match TagState::parse(&row.0) {
                Some(TagState::Untagged) => counts.untagged = row.1,
                Some(TagState::Classifying) => counts.classifying = row.1,
                Some(TagState::Tagged) => counts.tagged = row.1,
                Some(TagState::Failed) => counts.failed = row.1,
                None => {}
            }
        }
        Ok(counts)
    }

    /// Tagged items grouped by inferred segment, with mean conversion
    /// probability. Feeds the lead-qualification dashboard.
    pub fn segment_stats(&self) -> Result<Vec<SegmentStat>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT inferred_segment, COUNT(*), AVG(conversion_probability) \
                 FROM content_items WHERE tag_state = 'tagged' \
                 GROUP BY inferred_segment",
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| {
                let segment: String = row.get(0)?;
                let count: i64 = row.get(1)?;
                let avg: f64 = row.get(2).unwrap_or(0.0);
                Ok((segment, count, avg))
            })
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(rows
            .filter_map(|r| r.ok())
            .filter_map(|(segment, count, avg)| {
                Segment::parse(&segment).map(|segment| SegmentStat {
                    segment,
                    count,
                    avg_conversion_probability: avg,
                })
            })
            .collect())
    }

    /// Tagged items grouped by sentiment.
    pub fn sentiment_stats(&self) -> Result<Vec<SentimentStat>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT sentiment, COUNT(*) FROM content_items \
                 WHERE tag_state = 'tagged' GROUP BY sentiment",
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| {
                let sentiment: String = row.get(0)?;
                let count: i64 = row.get(1)?;
                Ok((sentiment, count))
            })
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(rows
            .filter_map(|r| r.ok())
            .filter_map(|(sentiment, count)| {
                Sentiment::parse(&sentiment).map(|sentiment| SentimentStat { sentiment, count })
            })
            .collect())
    }

    /// Tagged items most likely to convert, best first. The signup
    /// outreach shortlist.
    pub fn high_conversion_leads(
        &self,
        min_probability: f64,
        limit: usize,
    ) -> Result<Vec<ItemRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT * FROM content_items \
                 WHERE tag_state = 'tagged' AND conversion_probability >= ?1 \
                 ORDER BY conversion_probability DESC \
                 LIMIT ?2",
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params![min_probability, limit as i64], |row| {
                Ok(Self::row_to_record(row))
            })
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    // ---------------------------------------------------------------
    // Row Mapping
    // ---------------------------------------------------------------

    fn row_to_record(row: &rusqlite::Row<'_>) -> ItemRecord {
        let source = row
            .get::<_, String>("source")
            .ok()
            .and_then(|s| Source::parse(&s))
            .unwrap_or(Source::Review);
        let tag_state = row
            .get::<_, String>("tag_state")
            .ok()
            .and_then(|s| TagState::parse(&s))
            .unwrap_or(TagState::Untagged);

        // Result columns are only meaningful in the tagged state; a
        // force-retag claim may leave stale columns behind while the item
        // is back in flight.
        let classification = if tag_state != TagState::Tagged {
            None
        } else {
            row.get::<_, Option<String>>("sentiment")
                .ok()
                .flatten()
                .and_then(|s| Sentiment::parse(&s))
                .and_then(|sentiment| {
                    let intent = row
                        .get::<_, Option<String>>("intent")
                        .ok()
                        .flatten()
                        .and_then(|s| Intent::parse(&s))?;
                    Some(Classification {
                        sentiment,
                        sentiment_score: row
                            .get::<_, Option<f64>>("sentiment_score")
                            .ok()
                            .flatten()
                            .unwrap_or(0.0),
                        intent,
                        keywords: row
                            .get::<_, Option<String>>("keywords_json")
                            .ok()
                            .flatten()
                            .and_then(|s| serde_json::from_str(&s).ok())
                            .unwrap_or_default(),
                        inferred_segment: row
                            .get::<_, Option<String>>("inferred_segment")
                            .ok()
                            .flatten()
                            .and_then(|s| Segment::parse(&s))
                            .unwrap_or(Segment::Unknown),
                        matched_symptom_tags: row
                            .get::<_, Option<String>>("symptom_tags_json")
                            .ok()
                            .flatten()
                            .and_then(|s| serde_json::from_str(&s).ok())
                            .unwrap_or_default(),
                        pain_points: row
                            .get::<_, Option<String>>("pain_points_json")
                            .ok()
                            .flatten()
                            .and_then(|s| serde_json::from_str(&s).ok())
                            .unwrap_or_default(),
                    })
                })
        };

        let lead = if classification.is_none() {
            None
        } else {
            row.get::<_, Option<String>>("next_action")
                .ok()
                .flatten()
                .and_then(|s| NextAction::parse(&s))
                .map(|next_action| LeadPrediction {
                    next_action,
                    conversion_probability: row
                        .get::<_, Option<f64>>("conversion_probability")
                        .ok()
                        .flatten()
                        .unwrap_or(0.0),
                    reasoning: row
                        .get::<_, Option<String>>("lead_reasoning")
                        .ok()
                        .flatten()
                        .unwrap_or_default(),
                })
        };

        ItemRecord {
            item: ContentItem {
                source,
                id: row.get("source_id").unwrap_or_default(),
                text: row.get("text").unwrap_or_default(),
                declared_user_id: row.get("declared_user_id").ok().flatten(),
                tag_state,
                ruleset_version: row.get("ruleset_version").ok().flatten(),
            },
            classification,
            lead,
            failure_reason: row.get("failure_reason").ok().flatten(),
            claimed_at: row.get("claimed_at").ok().flatten(),
            created_at: row.get("created_at").unwrap_or(0),
            tagged_at: row.get("tagged_at").ok().flatten(),
        }
    }
}

impl SegmentLookup for TaggingStore {
    fn segment_for_user(&self, user_id: i64) -> Result<Segment> {
        let conn = self.conn.lock();
        let segment: Option<String> = conn
            .prepare_cached("SELECT segment FROM user_segments WHERE user_id = ?1")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![user_id], |row| row.get(0))
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(segment
            .and_then(|s| Segment::parse(&s))
            .unwrap_or(Segment::Unknown))
    }
}
