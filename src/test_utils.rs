//! Parsing helpers shared by the unit tests.

use std::sync::Arc;

use swc_core::common::{sync::Lrc, FileName, FilePathMapping, SourceMap, SourceMapper};
use swc_core::ecma::ast::{EsVersion, Expr, Module, ModuleItem, Stmt};
use swc_core::ecma::parser::{parse_file_as_module, EsSyntax, Syntax};

use crate::span::SpanFormatter;

pub(crate) struct Parsed {
    pub module: Module,
    pub source_map: Arc<SourceMap>,
    pub file: String,
}

impl Parsed {
    pub fn mapper(&self) -> Arc<dyn SourceMapper> {
        self.source_map.clone()
    }

    pub fn spans(&self) -> SpanFormatter {
        SpanFormatter::new(&self.file, Some(self.mapper()))
    }

    /// Expression of the last expression statement in the module.
    pub fn last_expr(&self) -> &Expr {
        self.module
            .body
            .iter()
            .rev()
            .find_map(|item| match item {
                ModuleItem::Stmt(Stmt::Expr(e)) => Some(&*e.expr),
                _ => None,
            })
            .expect("module has no expression statement")
    }
}

pub(crate) fn parse(file: &str, src: &str) -> Parsed {
    let source_map = Arc::new(SourceMap::new(FilePathMapping::empty()));
    let fm = source_map.new_source_file(
        Lrc::new(FileName::Custom(file.to_string())),
        src.to_string(),
    );
    let mut recovered = vec![];
    let module = parse_file_as_module(
        &fm,
        Syntax::Es(EsSyntax {
            jsx: true,
            ..Default::default()
        }),
        EsVersion::EsNext,
        None,
        &mut recovered,
    )
    .unwrap_or_else(|e| panic!("failed to parse {file}: {e:?}"));
    Parsed {
        module,
        source_map,
        file: file.to_string(),
    }
}
