//! Build-scoped store of module graphs, keyed by normalized file path.
//!
//! Created by the host at build start and handed to every `analyze_module`
//! call. Writes from concurrent per-file analyses land on disjoint keys.

use std::collections::BTreeMap;

use dashmap::DashMap;
use tracing::debug;

use crate::error::AnalyzeError;
use crate::graph::ModuleGraph;

#[derive(Debug, Default)]
pub struct GraphRegistry {
    graphs: DashMap<String, ModuleGraph>,
}

impl GraphRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `graph` for `file`, replacing any graph from an earlier pass.
    pub fn register(&self, file: impl Into<String>, graph: ModuleGraph) {
        let file = file.into();
        debug!(file = %file, rows = graph.row_count(), "registering module graph");
        self.graphs.insert(file, graph);
    }

    pub fn get(&self, file: &str) -> Option<ModuleGraph> {
        self.graphs.get(file).map(|g| g.value().clone())
    }

    pub fn contains(&self, file: &str) -> bool {
        self.graphs.contains_key(file)
    }

    /// Registered file paths, sorted.
    pub fn files(&self) -> Vec<String> {
        let mut files: Vec<String> = self.graphs.iter().map(|e| e.key().clone()).collect();
        files.sort();
        files
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    /// Drop every graph; called when a new build starts.
    pub fn clear(&self) {
        self.graphs.clear();
    }

    fn snapshot(&self) -> BTreeMap<String, ModuleGraph> {
        self.graphs
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }

    pub fn to_json(&self) -> Result<String, AnalyzeError> {
        serde_json::to_string(&self.snapshot()).map_err(AnalyzeError::Serialize)
    }

    pub fn to_json_pretty(&self) -> Result<String, AnalyzeError> {
        serde_json::to_string_pretty(&self.snapshot()).map_err(AnalyzeError::Serialize)
    }
}
