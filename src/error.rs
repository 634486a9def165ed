//! Error type for the fallible edges of the crate.
//!
//! Tracing and graph collection never fail; unresolvable constructs degrade to
//! `Unknown` nodes or dropped rows. Only config parsing and registry
//! serialization surface errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("invalid analyzer config: {0}")]
    Config(#[source] serde_json::Error),

    #[error("failed to serialize module graphs: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl From<serde_json::Error> for AnalyzeError {
    fn from(err: serde_json::Error) -> Self {
        AnalyzeError::Config(err)
    }
}
