//! Module graph: imports, exports, definitions, mutations and the literal
//! index of one module, collected in a single traversal.

use serde::{Deserialize, Serialize};
use swc_core::{
    common::Span,
    ecma::{
        ast::*,
        visit::{Visit, VisitWith},
    },
};
use tracing::trace;

use crate::bindings::module_export_name;
use crate::config::DEFAULT_WALK_DEPTH;
use crate::member_path::{static_member_path, MemberPath};
use crate::provenance::static_prop_key;
use crate::span::SpanFormatter;

// -----------------------------------------------------------------------------
// Rows
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRow {
    pub local: String,    // local alias in this module
    pub imported: String, // 'default' | named | '*' (namespace)
    pub source: String,
    pub span: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRow {
    pub exported: String, // name visible to other modules ('default' is ok)
    pub local: String,
    pub span: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReexportRow {
    pub exported: String,
    pub imported: String,
    pub source: String,
    pub span: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefKind {
    Var,
    Let,
    Const,
    Func,
    Class,
}

impl From<VarDeclKind> for DefKind {
    fn from(kind: VarDeclKind) -> Self {
        match kind {
            VarDeclKind::Var => DefKind::Var,
            VarDeclKind::Let => DefKind::Let,
            VarDeclKind::Const => DefKind::Const,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefRow {
    pub local: String,
    pub kind: DefKind,
    pub span: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationKind {
    #[serde(rename = "assign")]
    Assign,
    #[serde(rename = "update")]
    Update,
    #[serde(rename = "call:Object.assign")]
    ObjectAssign,
    #[serde(rename = "call:push")]
    Push,
    #[serde(rename = "call:set")]
    Set,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationRow {
    pub root: String, // root local ident being mutated
    pub path: String, // ".new_key", '["k"]', "[2]" or empty
    pub kind: MutationKind,
    pub span: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiteralIxRow {
    pub export_name: String, // e.g. PRINCIPALS
    pub path: String,        // e.g. [1].specialty
    pub text: String,
    pub span: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleGraph {
    pub imports: Vec<ImportRow>,
    pub exports: Vec<ExportRow>,
    pub reexports: Vec<ReexportRow>,
    pub defs: Vec<DefRow>,
    pub mutations: Vec<MutationRow>,
    pub literal_index: Vec<LiteralIxRow>,
}

impl ModuleGraph {
    pub fn collect(module: &Module, spans: &SpanFormatter) -> Self {
        GraphCollector::new(spans).collect(module)
    }

    pub fn row_count(&self) -> usize {
        self.imports.len()
            + self.exports.len()
            + self.reexports.len()
            + self.defs.len()
            + self.mutations.len()
            + self.literal_index.len()
    }
}

// -----------------------------------------------------------------------------
// Collector
// -----------------------------------------------------------------------------

pub struct GraphCollector<'a> {
    spans: &'a SpanFormatter,
    max_walk_depth: usize,
    graph: ModuleGraph,
}

impl<'a> GraphCollector<'a> {
    pub fn new(spans: &'a SpanFormatter) -> Self {
        Self {
            spans,
            max_walk_depth: DEFAULT_WALK_DEPTH,
            graph: ModuleGraph::default(),
        }
    }

    pub fn with_max_walk_depth(mut self, depth: usize) -> Self {
        self.max_walk_depth = depth;
        self
    }

    pub fn collect(mut self, module: &Module) -> ModuleGraph {
        module.visit_with(&mut self);
        self.graph
    }

    fn span(&self, s: Span) -> String {
        self.spans.format(s)
    }

    fn push_def(&mut self, ident: &Ident, kind: DefKind) {
        self.graph.defs.push(DefRow {
            local: ident.sym.to_string(),
            kind,
            span: self.span(ident.span),
        });
    }

    fn push_export(&mut self, exported: String, local: String, span: Span) {
        self.graph.exports.push(ExportRow {
            exported,
            local,
            span: self.span(span),
        });
    }

    fn push_mutation(&mut self, target: Option<MemberPath>, kind: MutationKind, span: Span) {
        match target {
            Some(MemberPath { root, path }) => self.graph.mutations.push(MutationRow {
                root,
                path,
                kind,
                span: self.span(span),
            }),
            None => trace!(?kind, "dropping mutation with dynamic target"),
        }
    }

    fn harvest_literal_index(&mut self, export_name: &str, init: &Expr, prefix: String, depth: usize) {
        fn push_key(prefix: &str, seg: &str) -> String {
            if seg.starts_with('[') {
                format!("{prefix}{seg}")
            } else if prefix.is_empty() {
                seg.to_string()
            } else {
                format!("{prefix}.{seg}")
            }
        }
        if depth > self.max_walk_depth {
            return;
        }
        match init {
            Expr::Object(o) => {
                for p in &o.props {
                    let PropOrSpread::Prop(p) = p else { continue };
                    let Prop::KeyValue(kv) = &**p else { continue };
                    let Some(key) = static_prop_key(&kv.key) else {
                        continue;
                    };
                    let path = push_key(&prefix, &key);
                    self.harvest_literal_index(export_name, &kv.value, path, depth + 1);
                }
            }
            Expr::Array(a) => {
                for (idx, el) in a.elems.iter().enumerate() {
                    let Some(el) = el else { continue };
                    if el.spread.is_some() {
                        continue;
                    }
                    let path = push_key(&prefix, &format!("[{idx}]"));
                    self.harvest_literal_index(export_name, &el.expr, path, depth + 1);
                }
            }
            Expr::Paren(p) => self.harvest_literal_index(export_name, &p.expr, prefix, depth + 1),
            Expr::Lit(Lit::Str(s)) => {
                self.graph.literal_index.push(LiteralIxRow {
                    export_name: export_name.to_string(),
                    path: prefix,
                    text: s.value.to_string(),
                    span: self.span(s.span),
                });
            }
            _ => {}
        }
    }
}

fn simple_target_path(target: &SimpleAssignTarget) -> Option<MemberPath> {
    match target {
        SimpleAssignTarget::Ident(b) => Some(MemberPath {
            root: b.id.sym.to_string(),
            path: String::new(),
        }),
        SimpleAssignTarget::Member(m) => static_member_path(&Expr::Member(m.clone())),
        SimpleAssignTarget::Paren(p) => static_member_path(&p.expr),
        _ => None,
    }
}

fn mutating_method(name: &str) -> Option<MutationKind> {
    match name {
        "push" | "unshift" | "splice" => Some(MutationKind::Push),
        "set" | "setIn" => Some(MutationKind::Set),
        _ => None,
    }
}

impl<'a> Visit for GraphCollector<'a> {
    fn visit_import_decl(&mut self, n: &ImportDecl) {
        let source = n.src.value.to_string();
        for s in &n.specifiers {
            let (local, imported) = match s {
                ImportSpecifier::Named(named) => (
                    &named.local,
                    named
                        .imported
                        .as_ref()
                        .map(module_export_name)
                        .unwrap_or_else(|| named.local.sym.to_string()),
                ),
                ImportSpecifier::Default(def) => (&def.local, "default".to_string()),
                ImportSpecifier::Namespace(ns) => (&ns.local, "*".to_string()),
            };
            self.graph.imports.push(ImportRow {
                local: local.sym.to_string(),
                imported,
                source: source.clone(),
                span: self.span(local.span),
            });
        }
    }

    fn visit_export_decl(&mut self, n: &ExportDecl) {
        match &n.decl {
            Decl::Var(v) => {
                for d in &v.decls {
                    let Some(id) = d.name.as_ident() else { continue };
                    let name = id.id.sym.to_string();
                    self.push_export(name.clone(), name.clone(), id.id.span);
                    if let Some(init) = &d.init {
                        self.harvest_literal_index(&name, init, String::new(), 0);
                    }
                }
            }
            Decl::Fn(f) => {
                let name = f.ident.sym.to_string();
                self.push_export(name.clone(), name, f.ident.span);
            }
            Decl::Class(c) => {
                let name = c.ident.sym.to_string();
                self.push_export(name.clone(), name, c.ident.span);
            }
            _ => {}
        }
        // defs come from the declaration visitors below
        n.visit_children_with(self);
    }

    fn visit_named_export(&mut self, en: &NamedExport) {
        for s in &en.specifiers {
            match (s, &en.src) {
                (ExportSpecifier::Named(nm), Some(src)) => {
                    let imported = module_export_name(&nm.orig);
                    let exported = nm
                        .exported
                        .as_ref()
                        .map(module_export_name)
                        .unwrap_or_else(|| imported.clone());
                    self.graph.reexports.push(ReexportRow {
                        exported,
                        imported,
                        source: src.value.to_string(),
                        span: self.span(en.span),
                    });
                }
                (ExportSpecifier::Namespace(ns), Some(src)) => {
                    self.graph.reexports.push(ReexportRow {
                        exported: module_export_name(&ns.name),
                        imported: "*".into(),
                        source: src.value.to_string(),
                        span: self.span(en.span),
                    });
                }
                (ExportSpecifier::Named(nm), None) => {
                    // export { local as exported }
                    if let ModuleExportName::Ident(orig) = &nm.orig {
                        let exported = nm
                            .exported
                            .as_ref()
                            .map(module_export_name)
                            .unwrap_or_else(|| orig.sym.to_string());
                        self.push_export(exported, orig.sym.to_string(), orig.span);
                    }
                }
                _ => {}
            }
        }
    }

    fn visit_export_all(&mut self, ea: &ExportAll) {
        self.graph.reexports.push(ReexportRow {
            exported: "*".into(),
            imported: "*".into(),
            source: ea.src.value.to_string(),
            span: self.span(ea.span),
        });
    }

    fn visit_export_default_decl(&mut self, ed: &ExportDefaultDecl) {
        let named = match &ed.decl {
            DefaultDecl::Fn(f) => f.ident.as_ref().map(|id| (id, DefKind::Func)),
            DefaultDecl::Class(c) => c.ident.as_ref().map(|id| (id, DefKind::Class)),
            _ => None,
        };
        if let Some((id, kind)) = named {
            self.push_def(id, kind);
            self.push_export("default".into(), id.sym.to_string(), ed.span);
        }
        ed.visit_children_with(self);
    }

    fn visit_export_default_expr(&mut self, ed: &ExportDefaultExpr) {
        if let Expr::Ident(id) = &*ed.expr {
            self.push_export("default".into(), id.sym.to_string(), ed.span);
        }
        ed.visit_children_with(self);
    }

    fn visit_var_decl(&mut self, v: &VarDecl) {
        for d in &v.decls {
            if let Some(name) = d.name.as_ident() {
                self.push_def(&name.id, v.kind.into());
            }
        }
        v.visit_children_with(self);
    }

    fn visit_fn_decl(&mut self, n: &FnDecl) {
        self.push_def(&n.ident, DefKind::Func);
        n.visit_children_with(self);
    }

    fn visit_class_decl(&mut self, n: &ClassDecl) {
        self.push_def(&n.ident, DefKind::Class);
        n.visit_children_with(self);
    }

    fn visit_assign_expr(&mut self, n: &AssignExpr) {
        if let AssignTarget::Simple(target) = &n.left {
            self.push_mutation(simple_target_path(target), MutationKind::Assign, n.span);
        }
        n.visit_children_with(self);
    }

    fn visit_update_expr(&mut self, n: &UpdateExpr) {
        self.push_mutation(static_member_path(&n.arg), MutationKind::Update, n.span);
        n.visit_children_with(self);
    }

    fn visit_call_expr(&mut self, n: &CallExpr) {
        if let Callee::Expr(callee) = &n.callee {
            if let Expr::Member(m) = &**callee {
                if let MemberProp::Ident(prop) = &m.prop {
                    let is_object_assign = prop.sym.as_ref() == "assign"
                        && matches!(&*m.obj, Expr::Ident(obj) if obj.sym.as_ref() == "Object");
                    if is_object_assign {
                        // Object.assign(target, ...)
                        if let Some(first) = n.args.first().filter(|a| a.spread.is_none()) {
                            self.push_mutation(
                                static_member_path(&first.expr),
                                MutationKind::ObjectAssign,
                                n.span,
                            );
                        }
                    } else if let Some(kind) = mutating_method(prop.sym.as_ref()) {
                        self.push_mutation(static_member_path(&m.obj), kind, n.span);
                    }
                }
            }
        }
        n.visit_children_with(self);
    }
}
