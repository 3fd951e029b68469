//! Database schema SQL.

/// Content items with tagging state and result columns, plus the
/// user-segment table backing the segment-lookup collaborator.
///
/// Result columns are non-null exactly when `tag_state = 'tagged'`; the
/// store enforces this by writing them only together with that state.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS content_items (
    source TEXT NOT NULL,
    source_id TEXT NOT NULL,
    text TEXT NOT NULL,
    declared_user_id INTEGER,
    tag_state TEXT NOT NULL DEFAULT 'untagged',
    claimed_at INTEGER,
    ruleset_version TEXT,
    sentiment TEXT,
    sentiment_score REAL,
    intent TEXT,
    keywords_json TEXT,
    inferred_segment TEXT,
    symptom_tags_json TEXT,
    pain_points_json TEXT,
    next_action TEXT,
    conversion_probability REAL,
    lead_reasoning TEXT,
    failure_reason TEXT,
    created_at INTEGER NOT NULL,
    tagged_at INTEGER,
    PRIMARY KEY (source, source_id)
);

CREATE INDEX IF NOT EXISTS idx_content_items_state ON content_items(tag_state);
CREATE INDEX IF NOT EXISTS idx_content_items_conversion
    ON content_items(conversion_probability);

CREATE TABLE IF NOT EXISTS user_segments (
    user_id INTEGER PRIMARY KEY,
    segment TEXT NOT NULL
);
"#;
