#![allow(dead_code)]

use std::sync::Arc;

use codepress_provenance::{AnalyzerConfig, GraphRegistry, ModuleAnalyzer};
use swc_core::common::{sync::Lrc, FileName, FilePathMapping, SourceMap, SourceMapper};
use swc_core::ecma::ast::{EsVersion, Expr, Module, ModuleItem, Stmt};
use swc_core::ecma::parser::{parse_file_as_module, EsSyntax, Syntax};

pub struct TestFixture {
    pub file: String,
    pub module: Module,
    pub source_map: Arc<SourceMap>,
}

impl TestFixture {
    pub fn new(file: &str, src: &str) -> Self {
        let source_map = Arc::new(SourceMap::new(FilePathMapping::empty()));
        let fm = source_map.new_source_file(
            Lrc::new(FileName::Custom(file.to_string())),
            src.to_string(),
        );
        let module = parse_file_as_module(
            &fm,
            Syntax::Es(EsSyntax {
                jsx: true,
                ..Default::default()
            }),
            EsVersion::EsNext,
            None,
            &mut vec![],
        )
        .unwrap_or_else(|e| panic!("failed to parse {file}: {e:?}"));
        Self {
            file: file.to_string(),
            module,
            source_map,
        }
    }

    pub fn mapper(&self) -> Arc<dyn SourceMapper> {
        self.source_map.clone()
    }

    pub fn analyzer(&self) -> ModuleAnalyzer {
        ModuleAnalyzer::new(
            &self.module,
            &self.file,
            Some(self.mapper()),
            AnalyzerConfig::default(),
        )
    }

    pub fn analyze_into(&self, registry: &GraphRegistry) -> Option<ModuleAnalyzer> {
        codepress_provenance::analyze_module(
            &self.module,
            &self.file,
            Some(self.mapper()),
            &AnalyzerConfig::default(),
            registry,
        )
    }

    /// Expression of the last expression statement.
    pub fn last_expr(&self) -> &Expr {
        self.module
            .body
            .iter()
            .rev()
            .find_map(|item| match item {
                ModuleItem::Stmt(Stmt::Expr(e)) => Some(&*e.expr),
                _ => None,
            })
            .expect("no expression statement")
    }
}

/// Route analyzer logs to the test harness; `RUST_LOG=trace` to see truncations.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
