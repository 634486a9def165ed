//! Flat, module-global binding table.
//!
//! Inner declarations overwrite outer ones of the same name: there is no block
//! scoping. Destructuring patterns are not tracked.

use std::collections::HashMap;

use swc_core::{
    common::Span,
    ecma::{
        ast::*,
        visit::{Visit, VisitWith},
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportInfo {
    pub source: String,
    /// `"default"`, `"*"` for namespaces, or the imported name.
    pub imported: String,
}

#[derive(Debug, Clone)]
pub struct Binding {
    pub name: String,
    pub def_span: Span,
    pub init: Option<Box<Expr>>,
    pub import: Option<ImportInfo>,
    pub fn_body_span: Option<Span>,
}

/// Optional facts recorded alongside a binding's defining span.
#[derive(Debug, Clone, Default)]
pub struct BindingDetails {
    pub init: Option<Box<Expr>>,
    pub import: Option<ImportInfo>,
    pub fn_body_span: Option<Span>,
}

#[derive(Debug, Clone, Default)]
pub struct BindingTable {
    entries: HashMap<String, Binding>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every binding of `module` in one pass.
    pub fn from_module(module: &Module) -> Self {
        let mut table = Self::new();
        module.visit_with(&mut BindingCollector { out: &mut table });
        table
    }

    /// Record `name`; a later record of the same name wins.
    pub fn record(&mut self, name: impl Into<String>, def_span: Span, details: BindingDetails) {
        let name = name.into();
        self.entries.insert(
            name.clone(),
            Binding {
                name,
                def_span,
                init: details.init,
                import: details.import,
                fn_body_span: details.fn_body_span,
            },
        );
    }

    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// -----------------------------------------------------------------------------
// Collector
// -----------------------------------------------------------------------------

struct BindingCollector<'a> {
    out: &'a mut BindingTable,
}

fn function_span(expr: &Expr) -> Option<Span> {
    match expr {
        Expr::Fn(f) => Some(f.function.span),
        Expr::Arrow(a) => Some(a.span),
        Expr::Paren(p) => function_span(&p.expr),
        _ => None,
    }
}

pub(crate) fn module_export_name(name: &ModuleExportName) -> String {
    match name {
        ModuleExportName::Ident(i) => i.sym.to_string(),
        ModuleExportName::Str(s) => s.value.to_string(),
    }
}

impl<'a> Visit for BindingCollector<'a> {
    fn visit_var_declarator(&mut self, d: &VarDeclarator) {
        if let Some(name) = d.name.as_ident() {
            self.out.record(
                name.id.sym.to_string(),
                name.id.span,
                BindingDetails {
                    fn_body_span: d.init.as_deref().and_then(function_span),
                    init: d.init.clone(),
                    import: None,
                },
            );
        }
        d.visit_children_with(self);
    }

    fn visit_fn_decl(&mut self, n: &FnDecl) {
        self.out.record(
            n.ident.sym.to_string(),
            n.ident.span,
            BindingDetails {
                fn_body_span: Some(n.function.span),
                ..Default::default()
            },
        );
        n.visit_children_with(self);
    }

    fn visit_class_decl(&mut self, n: &ClassDecl) {
        self.out
            .record(n.ident.sym.to_string(), n.ident.span, BindingDetails::default());
        n.visit_children_with(self);
    }

    fn visit_import_decl(&mut self, n: &ImportDecl) {
        let source = n.src.value.to_string();
        for s in &n.specifiers {
            let (local, imported) = match s {
                ImportSpecifier::Named(named) => {
                    let imported = named
                        .imported
                        .as_ref()
                        .map(module_export_name)
                        .unwrap_or_else(|| named.local.sym.to_string());
                    (&named.local, imported)
                }
                ImportSpecifier::Default(def) => (&def.local, "default".to_string()),
                ImportSpecifier::Namespace(ns) => (&ns.local, "*".to_string()),
            };
            self.out.record(
                local.sym.to_string(),
                local.span,
                BindingDetails {
                    import: Some(ImportInfo {
                        source: source.clone(),
                        imported,
                    }),
                    ..Default::default()
                },
            );
        }
    }
}
