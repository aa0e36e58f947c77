//! Production guard evaluation.

use super::{GuardError, GuardExpr};

/// Source of named predicate results.
///
/// Implemented by [`BoundGuards`](crate::core::BoundGuards) for a machine
/// configuration and by any `Fn(&str) -> Result<bool, GuardError>`.
pub trait Predicates {
    fn check(&self, name: &str) -> Result<bool, GuardError>;
}

impl<F> Predicates for F
where
    F: Fn(&str) -> Result<bool, GuardError>,
{
    fn check(&self, name: &str) -> Result<bool, GuardError> {
        self(name)
    }
}

/// Reduce a guard expression to a boolean.
///
/// Children of `And`/`Or` are evaluated left to right; evaluation stops at
/// the first `false` (`And`) or `true` (`Or`) and later predicates are not
/// called.
pub fn evaluate<P>(predicates: &P, expr: &GuardExpr) -> Result<bool, GuardError>
where
    P: Predicates + ?Sized,
{
    match expr {
        GuardExpr::Leaf(name) => predicates.check(name),
        GuardExpr::Not(inner) => evaluate(predicates, inner).map(|allow| !allow),
        GuardExpr::And(children) => {
            for child in children {
                if !evaluate(predicates, child)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        GuardExpr::Or(children) => {
            for child in children {
                if evaluate(predicates, child)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
    }
}
