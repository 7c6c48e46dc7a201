//! Structural type algebra engine.
//!
//! Represents types as interned data, matches them against patterns with
//! variable binding, and derives new types by structural transformation:
//!
//! - Conditional types with distribution over unions
//! - Pattern-based type-variable inference (infer variables)
//! - Mapped types with key remapping and modifier deltas
//! - Template-literal expansion (cross product of literal sets)
//! - A utility library (pick, omit, partial, extract, parameters, ...)
//!   built as fixed compositions of those primitives
//!
//! Key properties:
//! - O(1) type equality via interning (`TypeId` comparison)
//! - Pure transformations: trees are immutable, results freshly interned
//! - Recursion bounded by an explicit guard, never by the call stack
//!
//! The engine has no syntax surface: callers build `TypeData` trees through
//! [`TypeInterner`] (a parser is an external collaborator) and get result
//! trees back.

pub mod def;
pub mod diagnostics;
pub mod equivalence;
pub mod evaluate;
mod evaluate_rules;
pub mod instantiate;
mod intern;
pub mod operations;
pub mod recursion;
pub mod types;

pub use def::{DefId, DefinitionInfo, DefinitionStore};
pub use diagnostics::{SolverError, SolverResult};
pub use equivalence::are_types_equivalent;
pub use evaluate::{
    TypeEvaluator, evaluate_conditional, evaluate_keyof, evaluate_mapped, evaluate_type,
    instantiate_alias,
};
pub use instantiate::{
    TypeSubstitution, collect_free_type_params, collect_infer_names, instantiate_generic,
    instantiate_type,
};
pub use intern::{TEMPLATE_LITERAL_EXPANSION_LIMIT, TypeInterner};
pub use recursion::{EnterOutcome, RecursionGuard, RecursionProfile};
pub use types::{
    ConditionalType, ConditionalTypeId, FunctionShape, FunctionShapeId, IntrinsicKind,
    LiteralValue, MappedModifier, MappedType, MappedTypeId, ObjectShape, ObjectShapeId,
    OrderedFloat, ParamInfo, PropertyInfo, StringIntrinsicKind, TemplateListId, TemplateSpan,
    TupleElement, TupleListId, TypeApplication, TypeApplicationId, TypeData, TypeFlags, TypeId,
    TypeListId, TypeParamInfo,
};

// Test modules: some are loaded by their source files via #[path = "tests/..."]
// declarations (intern, def, instantiate, operations). Only include modules
// here that aren't loaded elsewhere.
#[cfg(test)]
#[path = "../tests/conditional_comprehensive_tests.rs"]
mod conditional_comprehensive_tests;
#[cfg(test)]
#[path = "../tests/mapped_comprehensive_tests.rs"]
mod mapped_comprehensive_tests;
#[cfg(test)]
#[path = "../tests/template_expansion_tests.rs"]
mod template_expansion_tests;
#[cfg(test)]
#[path = "../tests/type_law_tests.rs"]
mod type_law_tests;
