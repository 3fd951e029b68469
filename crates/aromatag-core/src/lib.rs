//! Aromatag Core — shared classification types, error taxonomy, configuration.

pub mod config;
pub mod error;
pub mod types;

pub use config::EngineConfig;
pub use error::{Error, Result};
pub use types::*;
