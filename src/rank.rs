use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use crate::provenance::ProvNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CandidateReason {
    Literal,
    ConstInit,
    Member,
    Structural,
    Callsite,
    FnDef,
    Constructor,
    Import,
    Env,
}

impl CandidateReason {
    pub fn as_str(self) -> &'static str {
        match self {
            CandidateReason::Literal => "literal",
            CandidateReason::ConstInit => "const-init",
            CandidateReason::Member => "member",
            CandidateReason::Structural => "structural",
            CandidateReason::Callsite => "callsite",
            CandidateReason::FnDef => "fn-def",
            CandidateReason::Constructor => "constructor",
            CandidateReason::Import => "import",
            CandidateReason::Env => "env",
        }
    }
}

impl std::fmt::Display for CandidateReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A source location worth editing to change a traced value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Candidate {
    pub target: String,
    pub reason: CandidateReason,
}

impl Candidate {
    pub fn new(target: impl Into<String>, reason: CandidateReason) -> Self {
        Self {
            target: target.into(),
            reason,
        }
    }
}

/// Map chain nodes to edit candidates, in discovery order, deduplicated.
pub fn rank_candidates(chain: &[ProvNode]) -> Vec<Candidate> {
    let mut out: Vec<Candidate> = vec![];
    for n in chain {
        match n {
            ProvNode::Literal { span, .. } => out.push(Candidate::new(span, CandidateReason::Literal)),
            ProvNode::Init { span } => out.push(Candidate::new(span, CandidateReason::ConstInit)),
            ProvNode::Member { span } => out.push(Candidate::new(span, CandidateReason::Member)),
            ProvNode::ObjectProp { span, .. } | ProvNode::ArrayElem { span, .. } => {
                out.push(Candidate::new(span, CandidateReason::Structural))
            }
            ProvNode::Call {
                callsite,
                fn_def_span,
                ..
            } => {
                out.push(Candidate::new(callsite, CandidateReason::Callsite));
                if let Some(def) = fn_def_span {
                    out.push(Candidate::new(def, CandidateReason::FnDef));
                }
            }
            ProvNode::Ctor { span, .. } => out.push(Candidate::new(span, CandidateReason::Constructor)),
            ProvNode::Import { span, .. } => out.push(Candidate::new(span, CandidateReason::Import)),
            ProvNode::Env { span, .. } => out.push(Candidate::new(span, CandidateReason::Env)),
            ProvNode::Ident { .. } | ProvNode::Op { .. } | ProvNode::Unknown { .. } => {}
        }
    }
    dedup_candidates(out)
}

/// Drop repeated (reason, target) pairs, keeping the first.
pub fn dedup_candidates(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert((c.reason, c.target.clone())))
        .collect()
}

/// Sorted, deduplicated kind tags present in `chain`.
pub fn aggregate_kinds(chain: &[ProvNode]) -> Vec<&'static str> {
    chain
        .iter()
        .map(ProvNode::kind_tag)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
