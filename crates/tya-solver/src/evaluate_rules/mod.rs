//! Per-meta-type evaluation rules.
//!
//! Each module extends [`TypeEvaluator`](crate::evaluate::TypeEvaluator)
//! with the rule set for one kind of type-level computation.

mod conditional;
mod index_access;
mod infer_pattern;
mod keyof;
mod mapped;
mod string_intrinsic;
mod template_literal;
