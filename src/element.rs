use serde::Serialize;
use swc_core::ecma::ast::*;

use crate::provenance::{LiteralKind, ProvNode, ProvenanceChain};
use crate::rank::{aggregate_kinds, rank_candidates, Candidate, CandidateReason};
use crate::symbol_refs::SymbolRef;
use crate::ModuleAnalyzer;

/// Everything gathered for one rendered element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ElementProvenance {
    pub candidates: Vec<Candidate>,
    pub kinds: Vec<&'static str>,
    pub symbol_refs: Vec<SymbolRef>,
}

/// A traced piece of an element: an expression, or literal text.
enum ElementPart<'a> {
    Expr(&'a Expr),
    Text(&'a JSXText),
}

/// Props (exprs + spreads), then children (exprs + non-whitespace text), in source order.
fn element_parts(node: &JSXElement) -> Vec<ElementPart<'_>> {
    let mut parts = vec![];
    for a in &node.opening.attrs {
        match a {
            JSXAttrOrSpread::JSXAttr(JSXAttr {
                value: Some(JSXAttrValue::JSXExprContainer(JSXExprContainer { expr: JSXExpr::Expr(e), .. })),
                ..
            }) => parts.push(ElementPart::Expr(&**e)),
            JSXAttrOrSpread::SpreadElement(sp) => parts.push(ElementPart::Expr(&*sp.expr)),
            _ => {}
        }
    }
    for ch in &node.children {
        match ch {
            JSXElementChild::JSXExprContainer(JSXExprContainer { expr: JSXExpr::Expr(e), .. }) => {
                parts.push(ElementPart::Expr(&**e))
            }
            JSXElementChild::JSXText(t) if !t.value.trim().is_empty() => parts.push(ElementPart::Text(t)),
            _ => {}
        }
    }
    parts
}

impl ModuleAnalyzer {
    /// Trace the props, spreads and children of `node`.
    ///
    /// Candidates and kinds come from [`ModuleAnalyzer::element_chain`]. The
    /// element's own location is appended as a callsite candidate.
    pub fn element(&self, node: &JSXElement) -> ElementProvenance {
        let chain = self.element_chain(node);
        let mut candidates = rank_candidates(chain.nodes());
        let kinds = aggregate_kinds(chain.nodes());

        let symbol_refs = element_parts(node)
            .into_iter()
            .filter_map(|part| match part {
                ElementPart::Expr(e) => Some(self.symbol_refs(e)),
                ElementPart::Text(_) => None,
            })
            .flatten()
            .collect();

        if self.spans().line(node.opening.span) > 0 {
            let self_target = self.spans().format(node.opening.span);
            let already = candidates
                .iter()
                .any(|c| c.reason == CandidateReason::Callsite && c.target == self_target);
            if !already {
                candidates.push(Candidate::new(self_target, CandidateReason::Callsite));
            }
        }

        ElementProvenance {
            candidates,
            kinds,
            symbol_refs,
        }
    }

    /// Concatenated chain for `node`, bounded as one chain.
    ///
    /// Each expression is traced with its own seen-set; text children add a
    /// string literal node.
    pub fn element_chain(&self, node: &JSXElement) -> ProvenanceChain {
        let mut chain = ProvenanceChain::with_capacity(self.config().max_chain_len);
        for part in element_parts(node) {
            if chain.is_full() {
                break;
            }
            match part {
                ElementPart::Expr(e) => chain.extend(self.trace(e)),
                ElementPart::Text(t) => {
                    chain.push(ProvNode::Literal {
                        span: self.spans().format(t.span),
                        value_kind: LiteralKind::String,
                    });
                }
            }
        }
        chain
    }
}
