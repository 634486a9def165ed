//! Provenance tracing: how a value's data flow connects back to its origins.

use std::collections::HashSet;

use serde::Serialize;
use swc_core::{common::Spanned, ecma::ast::*};
use tracing::trace;

use crate::bindings::BindingTable;
use crate::config::{MAX_CHAIN_LEN, MAX_TRACE_DEPTH};
use crate::member_path::detect_env_member;
use crate::span::SpanFormatter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LiteralKind {
    String,
    Number,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum ProvNode {
    Literal { span: String, value_kind: LiteralKind },
    Ident { name: String, span: String },
    Init { span: String },
    Import { source: String, imported: String, span: String },
    Member { span: String },
    ObjectProp { key: String, span: String },
    ArrayElem { index: usize, span: String },
    Call {
        callee: String,
        callsite: String,
        callee_span: String,
        fn_def_span: Option<String>,
    },
    Ctor { callee: String, span: String },
    Op { op: String, span: String },
    Env { key: String, span: String },
    Unknown { span: String },
}

impl ProvNode {
    /// Lowercase tag used by the kind summary.
    pub fn kind_tag(&self) -> &'static str {
        match self {
            ProvNode::Literal { .. } => "literal",
            ProvNode::Ident { .. } => "ident",
            ProvNode::Init { .. } => "init",
            ProvNode::Import { .. } => "import",
            ProvNode::Member { .. } => "member",
            ProvNode::ObjectProp { .. } => "object",
            ProvNode::ArrayElem { .. } => "array",
            ProvNode::Call { .. } => "call",
            ProvNode::Ctor { .. } => "ctor",
            ProvNode::Op { .. } => "op",
            ProvNode::Env { .. } => "env",
            ProvNode::Unknown { .. } => "unknown",
        }
    }
}

/// Append-only node sequence with a hard capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProvenanceChain {
    nodes: Vec<ProvNode>,
    #[serde(skip)]
    capacity: usize,
}

impl Default for ProvenanceChain {
    fn default() -> Self {
        Self::with_capacity(MAX_CHAIN_LEN)
    }
}

impl ProvenanceChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capacity is clamped to [`MAX_CHAIN_LEN`].
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::new(),
            capacity: capacity.min(MAX_CHAIN_LEN),
        }
    }

    /// Returns false (and drops the node) once the chain is full.
    pub fn push(&mut self, node: ProvNode) -> bool {
        if self.is_full() {
            return false;
        }
        self.nodes.push(node);
        true
    }

    /// Append another chain, stopping at capacity.
    pub fn extend(&mut self, other: ProvenanceChain) {
        for node in other.nodes {
            if !self.push(node) {
                break;
            }
        }
    }

    pub fn is_full(&self) -> bool {
        self.nodes.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[ProvNode] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<ProvNode> {
        self.nodes
    }
}

// -----------------------------------------------------------------------------
// Tracer
// -----------------------------------------------------------------------------

pub struct Tracer<'a> {
    bindings: &'a BindingTable,
    spans: &'a SpanFormatter,
    max_depth: usize,
    max_chain_len: usize,
}

impl<'a> Tracer<'a> {
    pub fn new(bindings: &'a BindingTable, spans: &'a SpanFormatter) -> Self {
        Self {
            bindings,
            spans,
            max_depth: MAX_TRACE_DEPTH,
            max_chain_len: MAX_CHAIN_LEN,
        }
    }

    /// Lower the bounds; values above the hard limits are ignored.
    pub fn with_limits(mut self, max_depth: usize, max_chain_len: usize) -> Self {
        self.max_depth = max_depth.min(MAX_TRACE_DEPTH);
        self.max_chain_len = max_chain_len.min(MAX_CHAIN_LEN);
        self
    }

    /// Trace `expr` with a fresh chain and seen-set.
    pub fn trace(&self, expr: &Expr) -> ProvenanceChain {
        let mut chain = ProvenanceChain::with_capacity(self.max_chain_len);
        let mut seen = HashSet::new();
        self.trace_into(expr, &mut chain, 0, &mut seen);
        chain
    }

    fn span(&self, s: swc_core::common::Span) -> String {
        self.spans.format(s)
    }

    pub fn trace_into(
        &self,
        expr: &Expr,
        chain: &mut ProvenanceChain,
        depth: usize,
        seen: &mut HashSet<String>,
    ) {
        if depth > self.max_depth || chain.is_full() {
            trace!(depth, len = chain.len(), "provenance chain truncated");
            return;
        }
        match expr {
            Expr::Lit(Lit::Num(n)) => {
                chain.push(ProvNode::Literal {
                    span: self.span(n.span),
                    value_kind: LiteralKind::Number,
                });
            }
            Expr::Lit(Lit::Str(s)) => {
                chain.push(ProvNode::Literal {
                    span: self.span(s.span),
                    value_kind: LiteralKind::String,
                });
            }
            Expr::Lit(_) => {
                chain.push(ProvNode::Literal {
                    span: self.span(expr.span()),
                    value_kind: LiteralKind::Other,
                });
            }
            Expr::Ident(i) => {
                let name = i.sym.to_string();
                chain.push(ProvNode::Ident {
                    name: name.clone(),
                    span: self.span(i.span),
                });
                // cycle guard
                if !seen.insert(name.clone()) {
                    return;
                }
                if let Some(b) = self.bindings.lookup(&name) {
                    if let Some(init) = &b.init {
                        chain.push(ProvNode::Init {
                            span: self.span(b.def_span),
                        });
                        self.trace_into(init, chain, depth + 1, seen);
                    }
                    if let Some(im) = &b.import {
                        chain.push(ProvNode::Import {
                            source: im.source.clone(),
                            imported: im.imported.clone(),
                            span: self.span(b.def_span),
                        });
                    }
                }
            }
            Expr::Member(m) => {
                if let Some(key) = detect_env_member(m) {
                    chain.push(ProvNode::Env {
                        key,
                        span: self.span(m.span),
                    });
                    return;
                }
                chain.push(ProvNode::Member {
                    span: self.span(m.span),
                });
                self.trace_into(&m.obj, chain, depth + 1, seen);
                if let MemberProp::Computed(c) = &m.prop {
                    self.trace_into(&c.expr, chain, depth + 1, seen);
                }
            }
            Expr::Call(c) => {
                let (callee, callee_span, fn_def_span) = match &c.callee {
                    Callee::Expr(e) => match &**e {
                        Expr::Ident(id) => {
                            let def = self
                                .bindings
                                .lookup(id.sym.as_ref())
                                .map(|b| self.span(b.fn_body_span.unwrap_or(b.def_span)));
                            (id.sym.to_string(), self.span(id.span), def)
                        }
                        Expr::Member(m) => ("<member>".to_string(), self.span(m.span), None),
                        _ => ("<expr>".to_string(), self.span(c.span), None),
                    },
                    _ => ("<expr>".to_string(), self.span(c.span), None),
                };
                chain.push(ProvNode::Call {
                    callee,
                    callsite: self.span(c.span),
                    callee_span,
                    fn_def_span,
                });
                for arg in c.args.iter().filter(|a| a.spread.is_none()) {
                    self.trace_into(&arg.expr, chain, depth + 1, seen);
                }
            }
            Expr::New(n) => {
                let callee = match &*n.callee {
                    Expr::Ident(id) => id.sym.to_string(),
                    Expr::Member(_) => "<member>".to_string(),
                    _ => "<expr>".to_string(),
                };
                chain.push(ProvNode::Ctor {
                    callee,
                    span: self.span(n.span),
                });
                for arg in n.args.iter().flatten().filter(|a| a.spread.is_none()) {
                    self.trace_into(&arg.expr, chain, depth + 1, seen);
                }
            }
            Expr::Tpl(t) => {
                chain.push(ProvNode::Op {
                    op: "template".into(),
                    span: self.span(t.span),
                });
                for e in &t.exprs {
                    self.trace_into(e, chain, depth + 1, seen);
                }
            }
            Expr::Bin(b) => {
                chain.push(ProvNode::Op {
                    op: format!("binary:{}", b.op),
                    span: self.span(b.span),
                });
                self.trace_into(&b.left, chain, depth + 1, seen);
                self.trace_into(&b.right, chain, depth + 1, seen);
            }
            Expr::Cond(c) => {
                chain.push(ProvNode::Op {
                    op: "cond".into(),
                    span: self.span(c.span),
                });
                self.trace_into(&c.test, chain, depth + 1, seen);
                self.trace_into(&c.cons, chain, depth + 1, seen);
                self.trace_into(&c.alt, chain, depth + 1, seen);
            }
            Expr::Unary(u) => {
                chain.push(ProvNode::Op {
                    op: format!("unary:{}", u.op),
                    span: self.span(u.span),
                });
                self.trace_into(&u.arg, chain, depth + 1, seen);
            }
            Expr::Update(u) => {
                chain.push(ProvNode::Op {
                    op: "update".into(),
                    span: self.span(u.span),
                });
                self.trace_into(&u.arg, chain, depth + 1, seen);
            }
            Expr::Object(o) => {
                for prop in &o.props {
                    if chain.is_full() {
                        break;
                    }
                    let PropOrSpread::Prop(p) = prop else {
                        continue;
                    };
                    match &**p {
                        Prop::KeyValue(kv) => {
                            let Some(key) = static_prop_key(&kv.key) else {
                                continue;
                            };
                            chain.push(ProvNode::ObjectProp {
                                key,
                                span: self.span(kv.key.span()),
                            });
                            self.trace_into(&kv.value, chain, depth + 1, seen);
                        }
                        Prop::Shorthand(id) => {
                            chain.push(ProvNode::ObjectProp {
                                key: id.sym.to_string(),
                                span: self.span(id.span),
                            });
                            self.trace_into(&Expr::Ident(id.clone()), chain, depth + 1, seen);
                        }
                        _ => {}
                    }
                }
            }
            Expr::Array(a) => {
                for (index, el) in a.elems.iter().enumerate() {
                    if chain.is_full() {
                        break;
                    }
                    let Some(el) = el else { continue };
                    if el.spread.is_some() {
                        continue;
                    }
                    chain.push(ProvNode::ArrayElem {
                        index,
                        span: self.span(el.span()),
                    });
                    self.trace_into(&el.expr, chain, depth + 1, seen);
                }
            }
            Expr::Paren(p) => self.trace_into(&p.expr, chain, depth, seen),
            _ => {
                chain.push(ProvNode::Unknown {
                    span: self.span(expr.span()),
                });
            }
        }
    }
}

/// Identifier, string and numeric keys; computed keys are not static.
pub(crate) fn static_prop_key(key: &PropName) -> Option<String> {
    match key {
        PropName::Ident(i) => Some(i.sym.to_string()),
        PropName::Str(s) => Some(s.value.to_string()),
        PropName::Num(n) => Some(n.value.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{parse, Parsed};

    fn trace_last(parsed: &Parsed) -> ProvenanceChain {
        let bindings = BindingTable::from_module(&parsed.module);
        let spans = parsed.spans();
        Tracer::new(&bindings, &spans).trace(parsed.last_expr())
    }

    fn kinds(chain: &ProvenanceChain) -> Vec<&'static str> {
        chain.nodes().iter().map(|n| n.kind_tag()).collect()
    }

    #[test]
    fn test_literals_yield_single_node() {
        for (src, expected) in [
            ("\"hi\";", LiteralKind::String),
            ("42;", LiteralKind::Number),
            ("true;", LiteralKind::Other),
            ("null;", LiteralKind::Other),
        ] {
            let chain = trace_last(&parse("a.js", src));
            assert_eq!(chain.len(), 1, "{src}");
            match &chain.nodes()[0] {
                ProvNode::Literal { value_kind, span } => {
                    assert_eq!(*value_kind, expected, "{src}");
                    assert_eq!(span, "a.js:1");
                }
                other => panic!("unexpected node {other:?}"),
            }
        }
    }

    #[test]
    fn test_identifier_follows_init() {
        let parsed = parse("src/page.js", "const title = \"Hello\";\ntitle;");
        let chain = trace_last(&parsed);
        assert_eq!(kinds(&chain), vec!["ident", "init", "literal"]);
        assert_eq!(
            chain.nodes()[1],
            ProvNode::Init {
                span: "src/page.js:1".into()
            }
        );
    }

    #[test]
    fn test_import_is_terminal() {
        let parsed = parse("a.js", "import { copy as text } from \"./strings\";\ntext;");
        let chain = trace_last(&parsed);
        assert_eq!(
            chain.nodes()[1],
            ProvNode::Import {
                source: "./strings".into(),
                imported: "copy".into(),
                span: "a.js:1".into(),
            }
        );
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_self_reference_terminates() {
        let src = "let a = b + 1;\nlet b = a * 2;\na;";
        let chain = trace_last(&parse("a.js", src));
        assert!(chain.len() <= MAX_CHAIN_LEN);
        let idents = chain
            .nodes()
            .iter()
            .filter(|n| matches!(n, ProvNode::Init { .. }))
            .count();
        assert_eq!(idents, 2);
    }

    #[test]
    fn test_env_is_single_node() {
        let chain = trace_last(&parse("a.js", "process.env.API_KEY;"));
        assert_eq!(chain.len(), 1);
        assert!(matches!(&chain.nodes()[0], ProvNode::Env { key, .. } if key == "API_KEY"));
    }

    #[test]
    fn test_call_records_fn_def() {
        let src = "function format(x) {\n  return x;\n}\nformat(\"a\", ...rest);";
        let chain = trace_last(&parse("a.js", src));
        match &chain.nodes()[0] {
            ProvNode::Call {
                callee,
                callsite,
                fn_def_span,
                ..
            } => {
                assert_eq!(callee, "format");
                assert_eq!(callsite, "a.js:4");
                assert_eq!(fn_def_span.as_deref(), Some("a.js:1"));
            }
            other => panic!("unexpected node {other:?}"),
        }
        // spread argument skipped
        assert_eq!(kinds(&chain), vec!["call", "literal"]);
    }

    #[test]
    fn test_method_call_and_ctor_names() {
        let chain = trace_last(&parse("a.js", "user.name.toUpperCase();"));
        assert!(matches!(&chain.nodes()[0], ProvNode::Call { callee, fn_def_span: None, .. } if callee == "<member>"));

        let chain = trace_last(&parse("a.js", "new Date(0);"));
        assert!(matches!(&chain.nodes()[0], ProvNode::Ctor { callee, .. } if callee == "Date"));
        assert_eq!(kinds(&chain), vec!["ctor", "literal"]);
    }

    #[test]
    fn test_operator_tags() {
        let op_of = |src: &str| match &trace_last(&parse("a.js", src)).nodes()[0] {
            ProvNode::Op { op, .. } => op.clone(),
            other => panic!("unexpected node {other:?}"),
        };
        assert_eq!(op_of("a + b;"), "binary:+");
        assert_eq!(op_of("!a;"), "unary:!");
        assert_eq!(op_of("a ? 1 : 2;"), "cond");
        assert_eq!(op_of("`x ${a}`;"), "template");
        assert_eq!(op_of("i++;"), "update");
    }

    #[test]
    fn test_structural_nodes() {
        let src = "({ title: \"T\", [dyn]: 1, ...rest, count });";
        let chain = trace_last(&parse("a.js", src));
        let keys: Vec<_> = chain
            .nodes()
            .iter()
            .filter_map(|n| match n {
                ProvNode::ObjectProp { key, .. } => Some(key.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(keys, vec!["title", "count"]);

        let chain = trace_last(&parse("a.js", "[\"a\", ...more, 2];"));
        assert_eq!(kinds(&chain), vec!["array", "literal", "array", "literal"]);
        assert!(matches!(&chain.nodes()[2], ProvNode::ArrayElem { index: 2, .. }));
    }

    #[test]
    fn test_unknown_shape() {
        let chain = trace_last(&parse("a.js", "(() => 1);"));
        assert_eq!(kinds(&chain), vec!["unknown"]);
    }

    #[test]
    fn test_chain_is_bounded() {
        let items: Vec<String> = (0..500).map(|i| format!("\"item{i}\"")).collect();
        let src = format!("[{}];", items.join(", "));
        let chain = trace_last(&parse("a.js", &src));
        assert_eq!(chain.len(), MAX_CHAIN_LEN);
    }

    #[test]
    fn test_depth_is_bounded() {
        let mut src = String::new();
        for i in 0..20 {
            src.push_str(&format!("const v{i} = v{} + 1;\n", i + 1));
        }
        src.push_str("v0;");
        let chain = trace_last(&parse("a.js", &src));
        let inits = chain
            .nodes()
            .iter()
            .filter(|n| matches!(n, ProvNode::Init { .. }))
            .count();
        // idents resolve at depths 0, 2, 4, 6 and 8
        assert_eq!(inits, 5);
    }

    #[test]
    fn test_lowered_limits() {
        let parsed = parse("a.js", "[1, 2, 3, 4, 5];");
        let bindings = BindingTable::from_module(&parsed.module);
        let spans = parsed.spans();
        let chain = Tracer::new(&bindings, &spans)
            .with_limits(8, 3)
            .trace(parsed.last_expr());
        assert_eq!(chain.len(), 3);
    }
}
