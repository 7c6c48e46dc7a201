//! Solver error taxonomy.
//!
//! Failed pattern matches and inconsistent infer bindings are ordinary
//! control flow (the matcher reports `false`, the resolver takes the false
//! branch) and never appear here. Everything below is fatal for the
//! triggering call and propagates to the caller via `Result`; the engine is
//! pure and deterministic, so nothing is retried.

use serde::Serialize;
use std::fmt;

use crate::types::TypeId;

/// Result alias used throughout the solver.
pub type SolverResult<T> = Result<T, SolverError>;

/// An unrecoverable fault in a solver operation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum SolverError {
    /// Generic instantiation with the wrong number of type arguments.
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    /// A type variable was resolved outside any substitution that binds it,
    /// or a declared infer variable ended up unbound after a successful
    /// pattern match.
    UnboundVariable { name: String },

    /// Two source keys of a mapped type remapped to the same output key.
    KeyCollision { key: String },

    /// Indexed access named a key the object does not have.
    UnknownKey { key: String },

    /// A utility was applied to a type whose shape it does not accept
    /// (e.g. `parameters` of a non-function).
    UnsupportedShape {
        operation: &'static str,
        type_id: TypeId,
    },

    /// The recursion guard tripped while expanding aliases or evaluating
    /// nested meta-types. `chain` lists the alias names entered on the way
    /// down, outermost first.
    RecursionLimitExceeded { depth: u32, chain: Vec<String> },
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::ArityMismatch {
                name,
                expected,
                found,
            } => write!(
                f,
                "'{name}' expects {expected} type argument(s) but got {found}"
            ),
            SolverError::UnboundVariable { name } => {
                write!(f, "type variable '{name}' is not bound")
            }
            SolverError::KeyCollision { key } => {
                write!(f, "mapped type produced duplicate key '{key}'")
            }
            SolverError::UnknownKey { key } => {
                write!(f, "type has no key '{key}'")
            }
            SolverError::UnsupportedShape { operation, type_id } => {
                write!(f, "'{operation}' cannot be applied to type #{}", type_id.0)
            }
            SolverError::RecursionLimitExceeded { depth, chain } => {
                write!(f, "type instantiation is excessively deep (depth {depth})")?;
                if !chain.is_empty() {
                    write!(f, " via {}", chain.join(" -> "))?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for SolverError {}
