//! Aromatag Classify — normalizer, lexicon classifier, lead qualification.
//!
//! Everything in this crate is a pure function of text plus a lexicon
//! value; no external state is consulted, which is what makes the
//! determinism invariant hold for a fixed ruleset version.

pub mod classifier;
pub mod lead;
pub mod normalize;

pub use classifier::classify;
pub use lead::qualify;
pub use normalize::normalize;
