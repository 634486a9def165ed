use serde::Deserialize;

use crate::error::AnalyzeError;

/// Hard recursion bound for the expression tracer.
pub const MAX_TRACE_DEPTH: usize = 8;
/// Hard bound on the number of nodes in one provenance chain.
pub const MAX_CHAIN_LEN: usize = 128;
/// Default bound for structural walks (literal index, symbol refs).
pub const DEFAULT_WALK_DEPTH: usize = 64;

/// Analyzer options, read from the host's JSON plugin config.
///
/// Every field is optional in JSON. Trace bounds can be lowered but never
/// raised above [`MAX_TRACE_DEPTH`] / [`MAX_CHAIN_LEN`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub max_depth: usize,
    pub max_chain_len: usize,
    pub max_walk_depth: usize,
    pub skip_node_modules: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_depth: MAX_TRACE_DEPTH,
            max_chain_len: MAX_CHAIN_LEN,
            max_walk_depth: DEFAULT_WALK_DEPTH,
            skip_node_modules: true,
        }
    }
}

impl AnalyzerConfig {
    pub fn from_json(raw: &str) -> Result<Self, AnalyzeError> {
        let config: AnalyzerConfig = serde_json::from_str(raw)?;
        Ok(config.clamped())
    }

    /// Pull bounds back under the hard limits.
    pub fn clamped(mut self) -> Self {
        self.max_depth = self.max_depth.min(MAX_TRACE_DEPTH);
        self.max_chain_len = self.max_chain_len.min(MAX_CHAIN_LEN);
        self
    }
}
