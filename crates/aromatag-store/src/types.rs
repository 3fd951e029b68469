//! Store-level row and query types.

use serde::{Deserialize, Serialize};

use aromatag_core::{Classification, ContentItem, LeadPrediction, Segment, Sentiment, Source};

/// Options for inserting a content item (import-side helper).
#[derive(Debug, Clone)]
pub struct NewItem {
    pub source: Source,
    pub id: String,
    pub text: String,
    pub declared_user_id: Option<i64>,
    /// Unix millis; defaults to now.
    pub created_at: Option<i64>,
}

impl NewItem {
    pub fn new(source: Source, id: &str, text: &str) -> Self {
        Self {
            source,
            id: id.to_string(),
            text: text.to_string(),
            declared_user_id: None,
            created_at: None,
        }
    }
}

/// A full content-item row: the item plus whatever tagging produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRecord {
    #[serde(flatten)]
    pub item: ContentItem,
    /// Present iff the item is tagged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead: Option<LeadPrediction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claimed_at: Option<i64>,
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tagged_at: Option<i64>,
}

/// Chooses candidate items for a batch run.
#[derive(Debug, Clone, Copy, Default)]
pub struct CandidateSelector {
    /// Restrict to one collection; `None` selects both.
    pub source: Option<Source>,
    /// Also select tagged/failed items for re-classification.
    pub force_retag: bool,
}

/// Items per tag state.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TagStateCounts {
    pub untagged: i64,
    pub classifying: i64,
    pub tagged: i64,
    pub failed: i64,
}

/// Per-segment analytics row.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentStat {
    pub segment: Segment,
    pub count: i64,
    pub avg_conversion_probability: f64,
}

/// Per-sentiment analytics row.
#[derive(Debug, Clone, Serialize)]
pub struct SentimentStat {
    pub sentiment: Sentiment,
    pub count: i64,
}
