//! Guard expressions.
//!
//! A guard is a boolean formula over named predicates. It is evaluated two
//! ways:
//!
//! - [`evaluate`] reduces it to a `bool` with `&&`/`||` short-circuiting.
//! - [`trace`] follows the exact same evaluation order but records, per
//!   node, whether it passed, failed or was skipped and which node caused
//!   a failure. [`format_trace`] renders that record as source code with a
//!   caret line underneath.
//!
//! # Example
//!
//! ```rust
//! use switchyard::guard::{and, evaluate, format_trace, not, or, trace, GuardError};
//!
//! let guard = and([or(["isReady", "isStopped"]), not("isDestroyed")]);
//! let predicates = |name: &str| -> Result<bool, GuardError> { Ok(name != "isStopped") };
//!
//! assert!(!evaluate(&predicates, &guard).unwrap());
//! assert_eq!(
//!     format_trace(&trace(&predicates, &guard).unwrap()),
//!     "((isReady || isStopped) && !isDestroyed)\n                           ^^^^^^^^^^^^ "
//! );
//! ```

mod error;
mod eval;
mod format;
mod trace;

pub use error::GuardError;
pub use eval::{evaluate, Predicates};
pub use format::format_trace;
pub use trace::{trace, TraceKind, TraceNode};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Boolean formula over named predicates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuardExpr {
    /// Reference to a named predicate.
    Leaf(String),
    Not(Box<GuardExpr>),
    /// True when every child is; the empty list is true.
    And(Vec<GuardExpr>),
    /// True when any child is; the empty list is false.
    Or(Vec<GuardExpr>),
}

impl GuardExpr {
    /// Predicate names in evaluation order, duplicates included.
    pub fn names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            GuardExpr::Leaf(name) => names.push(name),
            GuardExpr::Not(inner) => inner.collect_names(names),
            GuardExpr::And(children) | GuardExpr::Or(children) => {
                for child in children {
                    child.collect_names(names);
                }
            }
        }
    }
}

impl From<&str> for GuardExpr {
    fn from(name: &str) -> Self {
        leaf(name)
    }
}

impl From<String> for GuardExpr {
    fn from(name: String) -> Self {
        GuardExpr::Leaf(name)
    }
}

/// Canonical infix rendering: `a`, `!a`, `(a && b)`, `(a || b)`.
impl fmt::Display for GuardExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardExpr::Leaf(name) => f.write_str(name),
            GuardExpr::Not(inner) => write!(f, "!{inner}"),
            GuardExpr::And(children) => write_joined(f, children, " && "),
            GuardExpr::Or(children) => write_joined(f, children, " || "),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, children: &[GuardExpr], sep: &str) -> fmt::Result {
    f.write_str("(")?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{child}")?;
    }
    f.write_str(")")
}

pub fn leaf(name: impl Into<String>) -> GuardExpr {
    GuardExpr::Leaf(name.into())
}

pub fn not(expr: impl Into<GuardExpr>) -> GuardExpr {
    GuardExpr::Not(Box::new(expr.into()))
}

pub fn and<I>(exprs: I) -> GuardExpr
where
    I: IntoIterator,
    I::Item: Into<GuardExpr>,
{
    GuardExpr::And(exprs.into_iter().map(Into::into).collect())
}

pub fn or<I>(exprs: I) -> GuardExpr
where
    I: IntoIterator,
    I::Item: Into<GuardExpr>,
{
    GuardExpr::Or(exprs.into_iter().map(Into::into).collect())
}
