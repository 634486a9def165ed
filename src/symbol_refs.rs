//! Identifier and member reads, recorded for cross-reference indexing.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use swc_core::ecma::ast::*;

use crate::bindings::BindingTable;
use crate::config::DEFAULT_WALK_DEPTH;
use crate::member_path::static_member_path;
use crate::span::SpanFormatter;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolRef {
    pub file: String,
    pub local: String,
    /// Empty for bare identifiers, otherwise e.g. `.user.name`.
    pub path: String,
    pub span: String,
}

pub struct SymbolRefCollector<'a> {
    bindings: &'a BindingTable,
    spans: &'a SpanFormatter,
    max_depth: usize,
}

impl<'a> SymbolRefCollector<'a> {
    pub fn new(bindings: &'a BindingTable, spans: &'a SpanFormatter) -> Self {
        Self {
            bindings,
            spans,
            max_depth: DEFAULT_WALK_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn collect(&self, expr: &Expr) -> Vec<SymbolRef> {
        let mut out = vec![];
        let mut seen = HashSet::new();
        self.collect_into(expr, &mut out, 0, &mut seen);
        out
    }

    fn push(&self, out: &mut Vec<SymbolRef>, local: String, path: String, span: swc_core::common::Span) {
        out.push(SymbolRef {
            file: self.spans.file().to_string(),
            local,
            path,
            span: self.spans.format(span),
        });
    }

    pub fn collect_into(
        &self,
        expr: &Expr,
        out: &mut Vec<SymbolRef>,
        depth: usize,
        seen: &mut HashSet<String>,
    ) {
        if depth > self.max_depth {
            return;
        }
        match expr {
            Expr::Ident(i) => {
                let name = i.sym.to_string();
                self.push(out, name.clone(), String::new(), i.span);
                // reads nested in the initializer are attributed too
                if !seen.insert(name.clone()) {
                    return;
                }
                if let Some(init) = self.bindings.lookup(&name).and_then(|b| b.init.as_deref()) {
                    self.collect_into(init, out, depth + 1, seen);
                }
            }
            Expr::Member(m) => {
                if let Some(mp) = static_member_path(expr) {
                    self.push(out, mp.root, mp.path, m.span);
                }
                self.collect_into(&m.obj, out, depth + 1, seen);
                if let MemberProp::Computed(c) = &m.prop {
                    self.collect_into(&c.expr, out, depth + 1, seen);
                }
            }
            Expr::Call(c) => {
                if let Callee::Expr(e) = &c.callee {
                    self.collect_into(e, out, depth + 1, seen);
                }
                for a in c.args.iter().filter(|a| a.spread.is_none()) {
                    self.collect_into(&a.expr, out, depth + 1, seen);
                }
            }
            Expr::Paren(p) => self.collect_into(&p.expr, out, depth + 1, seen),
            _ => {}
        }
    }
}
