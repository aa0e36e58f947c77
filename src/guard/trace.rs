//! Diagnostic guard evaluation.
//!
//! The tracer walks a guard in the same order as [`evaluate`](super::evaluate)
//! and calls exactly the same predicates, while building a mirror of the
//! expression annotated with per-node outcomes.
//!
//! Cause attribution follows a single rule: a node is a cause when it
//! failed and nothing encloses it but `And` nodes on the path to the root.
//! `And` never carries the flag itself, it forwards it to its first
//! failing child (the only one evaluated). `Or` and `Not` are atomic
//! explanations: when they fail the whole node is the cause, since a failed
//! `Or` needs all of its children to fail and a failed `Not` has a passing
//! child. Nodes below them never carry the flag.

use super::{GuardError, GuardExpr, Predicates};
use serde::Serialize;

/// One traced node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TraceNode {
    /// `None` when the node was skipped by short-circuiting.
    pub allow: Option<bool>,
    /// Whether this node explains the failure of the whole guard.
    pub cause: bool,
    pub kind: TraceKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceKind {
    Leaf(String),
    Not(Box<TraceNode>),
    And(Vec<TraceNode>),
    Or(Vec<TraceNode>),
}

impl TraceNode {
    /// Whether this node or any descendant is flagged as a cause.
    pub fn has_cause(&self) -> bool {
        self.cause
            || match &self.kind {
                TraceKind::Leaf(_) => false,
                TraceKind::Not(inner) => inner.has_cause(),
                TraceKind::And(children) | TraceKind::Or(children) => {
                    children.iter().any(TraceNode::has_cause)
                }
            }
    }
}

/// Evaluation state handed from parent to child.
#[derive(Clone, Copy, Debug)]
struct Scope {
    /// Result already fixed upstream, do not call predicates.
    skip: bool,
    /// Reachable from the root through `And` nodes only.
    blame: bool,
}

impl Scope {
    const ROOT: Scope = Scope {
        skip: false,
        blame: true,
    };

    fn node(self, allow: Option<bool>, kind: TraceKind) -> TraceNode {
        TraceNode {
            allow,
            cause: self.blame && allow == Some(false),
            kind,
        }
    }
}

/// Evaluate `expr` and record how every node contributed to the result.
///
/// The root's `allow` always equals what [`evaluate`](super::evaluate)
/// returns for the same predicates.
pub fn trace<P>(predicates: &P, expr: &GuardExpr) -> Result<TraceNode, GuardError>
where
    P: Predicates + ?Sized,
{
    walk(predicates, expr, Scope::ROOT)
}

fn walk<P>(predicates: &P, expr: &GuardExpr, scope: Scope) -> Result<TraceNode, GuardError>
where
    P: Predicates + ?Sized,
{
    match expr {
        GuardExpr::Leaf(name) => {
            let allow = if scope.skip {
                None
            } else {
                Some(predicates.check(name)?)
            };
            Ok(scope.node(allow, TraceKind::Leaf(name.clone())))
        }
        GuardExpr::Not(inner) => {
            let inner = walk(predicates, inner, Scope { blame: false, ..scope })?;
            let allow = inner.allow.map(|allow| !allow);
            Ok(scope.node(allow, TraceKind::Not(Box::new(inner))))
        }
        GuardExpr::And(children) => {
            let (nodes, _) = walk_children(predicates, children, scope, false)?;
            let allow = (!scope.skip).then(|| nodes.iter().all(|n| n.allow != Some(false)));
            Ok(TraceNode {
                allow,
                cause: false,
                kind: TraceKind::And(nodes),
            })
        }
        GuardExpr::Or(children) => {
            let child_scope = Scope {
                blame: false,
                ..scope
            };
            let (nodes, decided) = walk_children(predicates, children, child_scope, true)?;
            let allow = (!scope.skip).then_some(decided);
            Ok(scope.node(allow, TraceKind::Or(nodes)))
        }
    }
}

/// Trace children left to right until one of them yields `stop_on`; the
/// rest are recorded as skipped. Returns the nodes and whether `stop_on`
/// was reached.
fn walk_children<P>(
    predicates: &P,
    children: &[GuardExpr],
    scope: Scope,
    stop_on: bool,
) -> Result<(Vec<TraceNode>, bool), GuardError>
where
    P: Predicates + ?Sized,
{
    let mut nodes = Vec::with_capacity(children.len());
    let mut scope = scope;
    let mut stopped = false;

    for child in children {
        let node = walk(predicates, child, scope)?;
        if node.allow == Some(stop_on) {
            stopped = true;
            scope.skip = true;
        }
        nodes.push(node);
    }

    Ok((nodes, stopped))
}
