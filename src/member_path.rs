use serde::Serialize;
use swc_core::ecma::ast::*;

/// A member chain reduced to its root identifier and a textual path,
/// e.g. `a.b["c"][0]` → root `a`, path `.b["c"][0]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberPath {
    pub root: String,
    pub path: String,
}

/// Resolve `expr` to a static member path. A bare identifier has an empty path.
/// Parentheses anywhere in the chain are looked through.
///
/// Returns `None` for non-literal computed properties, private names, and roots
/// that are not plain identifiers (`this`, calls, ...).
pub fn static_member_path(expr: &Expr) -> Option<MemberPath> {
    fn walk(e: &Expr, path: &mut String) -> Option<String> {
        match e {
            Expr::Ident(i) => Some(i.sym.to_string()),
            Expr::Paren(p) => walk(&p.expr, path),
            Expr::Member(m) => {
                let root = walk(&m.obj, path)?;
                match &m.prop {
                    MemberProp::Ident(p) => {
                        path.push('.');
                        path.push_str(p.sym.as_ref());
                    }
                    MemberProp::PrivateName(_) => return None,
                    MemberProp::Computed(c) => match &*c.expr {
                        Expr::Lit(Lit::Str(s)) => path.push_str(&format!(r#"["{}"]"#, s.value)),
                        Expr::Lit(Lit::Num(n)) => path.push_str(&format!("[{}]", n.value)),
                        _ => return None,
                    },
                }
                Some(root)
            }
            _ => None,
        }
    }
    let mut path = String::new();
    let root = walk(expr, &mut path)?;
    Some(MemberPath { root, path })
}

/// Static key of a member property: identifier names and string literals.
fn static_prop_name(prop: &MemberProp) -> Option<String> {
    match prop {
        MemberProp::Ident(i) => Some(i.sym.to_string()),
        MemberProp::Computed(c) => match &*c.expr {
            Expr::Lit(Lit::Str(s)) => Some(s.value.to_string()),
            _ => None,
        },
        MemberProp::PrivateName(_) => None,
    }
}

fn is_ident_prop(prop: &MemberProp, name: &str) -> bool {
    matches!(prop, MemberProp::Ident(p) if p.sym.as_ref() == name)
}

/// Detect `process.env.X`, `process.env["X"]` and `import.meta.env.X`, returning `X`.
pub fn detect_env_member(m: &MemberExpr) -> Option<String> {
    let Expr::Member(env) = &*m.obj else {
        return None;
    };
    if !is_ident_prop(&env.prop, "env") {
        return None;
    }
    let is_env_root = match &*env.obj {
        Expr::Ident(process) => process.sym.as_ref() == "process",
        Expr::MetaProp(meta) => matches!(meta.kind, MetaPropKind::ImportMeta),
        _ => false,
    };
    if !is_env_root {
        return None;
    }
    static_prop_name(&m.prop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::parse;

    fn path_of(src: &str) -> Option<MemberPath> {
        let parsed = parse("a.js", src);
        static_member_path(parsed.last_expr())
    }

    fn env_of(src: &str) -> Option<String> {
        let parsed = parse("a.js", src);
        match parsed.last_expr() {
            Expr::Member(m) => detect_env_member(m),
            other => panic!("not a member expression: {other:?}"),
        }
    }

    #[test]
    fn test_mixed_static_path() {
        let p = path_of(r#"a.b["c"].d;"#).unwrap();
        assert_eq!(p.root, "a");
        assert_eq!(p.path, r#".b["c"].d"#);
    }

    #[test]
    fn test_numeric_index() {
        let p = path_of("rows[2].label;").unwrap();
        assert_eq!(p.root, "rows");
        assert_eq!(p.path, "[2].label");
    }

    #[test]
    fn test_bare_identifier() {
        let p = path_of("state;").unwrap();
        assert_eq!(p, MemberPath { root: "state".into(), path: String::new() });
    }

    #[test]
    fn test_parens_are_transparent() {
        assert_eq!(path_of("(state);").unwrap().root, "state");
        let p = path_of("(state.items).length;").unwrap();
        assert_eq!(p.root, "state");
        assert_eq!(p.path, ".items.length");
    }

    #[test]
    fn test_dynamic_index_is_none() {
        assert_eq!(path_of("a[i];"), None);
        assert_eq!(path_of("a.b[i].c;"), None);
    }

    #[test]
    fn test_non_identifier_root_is_none() {
        assert_eq!(path_of("this.a;"), None);
        assert_eq!(path_of("getStore().items;"), None);
    }

    #[test]
    fn test_env_detection() {
        assert_eq!(env_of("process.env.API_KEY;").as_deref(), Some("API_KEY"));
        assert_eq!(env_of(r#"process.env["DB_URL"];"#).as_deref(), Some("DB_URL"));
        assert_eq!(env_of("import.meta.env.VITE_TITLE;").as_deref(), Some("VITE_TITLE"));
        assert_eq!(env_of("process.argv.length;"), None);
        assert_eq!(env_of("config.env.API_KEY;"), None);
        assert_eq!(env_of("process.env[key];"), None);
    }
}
