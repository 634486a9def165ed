//! Static provenance analysis for CodePress.
//!
//! Given one module's swc AST, answers where a rendered value came from and
//! which source spans an editor should change to alter it. Analysis is purely
//! syntactic and bounded in depth and size.

use std::sync::Arc;

use serde::Serialize;
use swc_core::{common::SourceMapper, ecma::ast::*};
use tracing::debug;

pub mod bindings;
pub mod config;
pub mod element;
pub mod error;
pub mod graph;
pub mod member_path;
pub mod provenance;
pub mod rank;
pub mod registry;
pub mod span;
pub mod symbol_refs;

#[cfg(test)]
pub(crate) mod test_utils;

pub use bindings::{Binding, BindingDetails, BindingTable, ImportInfo};
pub use config::AnalyzerConfig;
pub use element::ElementProvenance;
pub use error::AnalyzeError;
pub use graph::{ModuleGraph, MutationKind};
pub use member_path::{static_member_path, MemberPath};
pub use provenance::{LiteralKind, ProvNode, ProvenanceChain, Tracer};
pub use rank::{aggregate_kinds, rank_candidates, Candidate, CandidateReason};
pub use registry::GraphRegistry;
pub use span::{normalize_filename, SpanFormatter};
pub use symbol_refs::{SymbolRef, SymbolRefCollector};

// -----------------------------------------------------------------------------
// Analyzer
// -----------------------------------------------------------------------------

/// Chain for one traced expression plus what the host needs from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditTargets {
    pub chain: ProvenanceChain,
    pub candidates: Vec<Candidate>,
    pub kinds: Vec<&'static str>,
}

/// Per-module analysis state. Bindings are collected on construction, so every
/// tracing query sees the whole module regardless of declaration order.
pub struct ModuleAnalyzer {
    config: AnalyzerConfig,
    spans: SpanFormatter,
    bindings: BindingTable,
}

impl ModuleAnalyzer {
    pub fn new(
        module: &Module,
        file: &str,
        source_map: Option<Arc<dyn SourceMapper>>,
        config: AnalyzerConfig,
    ) -> Self {
        let spans = SpanFormatter::new(file, source_map);
        let bindings = BindingTable::from_module(module);
        debug!(file = spans.file(), bindings = bindings.len(), "collected bindings");
        Self {
            config: config.clamped(),
            spans,
            bindings,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn spans(&self) -> &SpanFormatter {
        &self.spans
    }

    pub fn file(&self) -> &str {
        self.spans.file()
    }

    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    pub fn tracer(&self) -> Tracer<'_> {
        Tracer::new(&self.bindings, &self.spans)
            .with_limits(self.config.max_depth, self.config.max_chain_len)
    }

    pub fn trace(&self, expr: &Expr) -> ProvenanceChain {
        self.tracer().trace(expr)
    }

    pub fn edit_targets(&self, expr: &Expr) -> EditTargets {
        let chain = self.trace(expr);
        let candidates = rank_candidates(chain.nodes());
        let kinds = aggregate_kinds(chain.nodes());
        EditTargets {
            chain,
            candidates,
            kinds,
        }
    }

    pub fn symbol_refs(&self, expr: &Expr) -> Vec<SymbolRef> {
        SymbolRefCollector::new(&self.bindings, &self.spans)
            .with_max_depth(self.config.max_walk_depth)
            .collect(expr)
    }

    pub fn module_graph(&self, module: &Module) -> ModuleGraph {
        graph::GraphCollector::new(&self.spans)
            .with_max_walk_depth(self.config.max_walk_depth)
            .collect(module)
    }
}

// -----------------------------------------------------------------------------
// Entrypoint
// -----------------------------------------------------------------------------

/// Analyze one module: collect bindings, register its graph in `registry`,
/// and return the analyzer for per-element queries.
///
/// Returns `None` for files under `node_modules` when `skip_node_modules` is set.
pub fn analyze_module(
    module: &Module,
    file: &str,
    source_map: Option<Arc<dyn SourceMapper>>,
    config: &AnalyzerConfig,
    registry: &GraphRegistry,
) -> Option<ModuleAnalyzer> {
    if config.skip_node_modules && file.contains("node_modules") {
        debug!(file, "skipping node_modules file");
        return None;
    }
    let analyzer = ModuleAnalyzer::new(module, file, source_map, config.clone());
    let graph = analyzer.module_graph(module);
    registry.register(analyzer.file(), graph);
    Some(analyzer)
}
