//! Aromatag Store — SQLite persistence for content items and tagging results.
//!
//! Provides the atomic conditional state transition (claim) and atomic
//! result write the tagging state machine depends on, plus the analytics
//! queries consumed by admin surfaces.

pub mod schema;
pub mod segment;
pub mod sqlite;
pub mod types;

pub use segment::{NoopSegmentLookup, SegmentLookup};
pub use sqlite::TaggingStore;
pub use types::*;
