//! Aromatag Lexicon — versioned term-to-signal rulesets driving all heuristic scoring.
//!
//! A `Lexicon` is immutable once built; edits go through `LexiconBuilder` and
//! produce a new version, so re-running a given version over the same text is
//! guaranteed to reproduce the same labels.

pub mod builtin;
pub mod types;

pub use types::{Lexicon, LexiconBuilder, LexiconEntry};
