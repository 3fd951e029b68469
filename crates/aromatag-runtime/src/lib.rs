//! Aromatag Runtime — per-item tagging state machine and batch runner.
//!
//! The orchestrator is the only writer of tag states and classification
//! results; the batch runner drives it over a bounded candidate set and
//! aggregates a run report for admin/analytics surfaces.

pub mod orchestrator;
pub mod runner;
pub mod types;

pub use orchestrator::TaggingOrchestrator;
pub use runner::BatchRunner;
pub use types::*;
