//! User-segment lookup collaborator seam.

use aromatag_core::{Result, Segment};

/// Resolves a declared user to a known customer segment.
///
/// Used by the orchestrator as a fallback only when text inference yields
/// `unknown`; the classifier itself never consults this.
pub trait SegmentLookup: Send + Sync {
    fn segment_for_user(&self, user_id: i64) -> Result<Segment>;
}

/// Lookup that knows nobody. For tests and anonymous-only deployments.
pub struct NoopSegmentLookup;

impl SegmentLookup for NoopSegmentLookup {
    fn segment_for_user(&self, _user_id: i64) -> Result<Segment> {
        Ok(Segment::Unknown)
    }
}
