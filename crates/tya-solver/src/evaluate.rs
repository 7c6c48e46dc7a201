//! Type evaluation for meta-types (conditional, mapped, keyof, indexed
//! access, template literals, alias applications).
//!
//! Meta-types are "type-level functions" that compute output types from input
//! types. The evaluator rewrites them into concrete structural types where
//! possible and leaves them deferred where a free type parameter blocks the
//! computation.
//!
//! Key design:
//! - Pure: input trees are never mutated, results are freshly interned.
//! - Deferred evaluation when type parameters are unknown.
//! - Recursion bounded by [`RecursionGuard`]; a tripped guard is a
//!   [`SolverError::RecursionLimitExceeded`], not a stack overflow.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::def::{DefId, DefinitionStore};
use crate::diagnostics::{SolverError, SolverResult};
use crate::instantiate::{collect_free_type_params, instantiate_generic};
use crate::intern::TypeInterner;
use crate::recursion::{EnterOutcome, RecursionGuard, RecursionProfile};
use crate::types::*;

/// Type evaluator for meta-types.
///
/// Each instance owns its result cache and recursion guard; nothing is
/// retained across instances, so one evaluator per top-level call gives the
/// per-call environment lifecycle the algebra requires.
pub struct TypeEvaluator<'a> {
    interner: &'a TypeInterner,
    defs: Option<&'a DefinitionStore>,
    cache: FxHashMap<TypeId, TypeId>,
    guard: RecursionGuard<TypeId>,
    /// Aliases currently being expanded. Re-entering one means the alias
    /// expands through itself without converging.
    visiting_defs: FxHashSet<DefId>,
    /// Alias names entered on the way down, outermost first. Reported in
    /// recursion-limit errors.
    chain: Vec<String>,
}

impl<'a> TypeEvaluator<'a> {
    /// Create an evaluator without alias resolution.
    pub fn new(interner: &'a TypeInterner) -> Self {
        TypeEvaluator {
            interner,
            defs: None,
            cache: FxHashMap::default(),
            guard: RecursionGuard::with_profile(RecursionProfile::TypeEvaluation),
            visiting_defs: FxHashSet::default(),
            chain: Vec::new(),
        }
    }

    /// Create an evaluator that resolves `Lazy` / `Application` types
    /// against the given store.
    pub fn with_definitions(interner: &'a TypeInterner, defs: &'a DefinitionStore) -> Self {
        TypeEvaluator {
            defs: Some(defs),
            ..TypeEvaluator::new(interner)
        }
    }

    /// Override the recursion depth limit.
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.guard = RecursionGuard::with_profile(RecursionProfile::TypeEvaluation)
            .with_max_depth(max_depth);
        self
    }

    #[inline]
    pub(crate) fn interner(&self) -> &'a TypeInterner {
        self.interner
    }

    pub(crate) fn recursion_error(&self) -> SolverError {
        SolverError::RecursionLimitExceeded {
            depth: self.guard.max_depth(),
            chain: self.chain.clone(),
        }
    }

    /// Evaluate a type, resolving any meta-types if possible.
    /// Returns the evaluated type (may be the same id if nothing applied).
    pub fn evaluate(&mut self, type_id: TypeId) -> SolverResult<TypeId> {
        // Fast path for intrinsics and fully concrete structures.
        if type_id.is_intrinsic() {
            return Ok(type_id);
        }
        if !self
            .interner
            .flags_of(type_id)
            .intersects(TypeFlags::CONTAINS_DEFERRED)
        {
            return Ok(type_id);
        }

        if let Some(&cached) = self.cache.get(&type_id) {
            return Ok(cached);
        }

        match self.guard.enter(type_id) {
            EnterOutcome::Entered => {}
            // A type that resolves through itself keeps its deferred form.
            EnterOutcome::Cycle => return Ok(type_id),
            EnterOutcome::LimitExceeded => return Err(self.recursion_error()),
        }

        let result = self.visit(type_id);
        self.guard.leave(type_id);

        let result = result?;
        self.cache.insert(type_id, result);
        Ok(result)
    }

    fn visit(&mut self, type_id: TypeId) -> SolverResult<TypeId> {
        let Some(key) = self.interner.lookup(type_id) else {
            return Ok(type_id);
        };

        tracing::trace!(type_id = type_id.0, "TypeEvaluator::visit");

        match key {
            TypeData::Union(list_id) => self.visit_union(list_id),
            TypeData::Conditional(cond_id) => {
                let cond = self.interner.conditional_type(cond_id);
                self.evaluate_conditional(type_id, cond.as_ref())
            }
            TypeData::Mapped(mapped_id) => {
                let mapped = self.interner.mapped_type(mapped_id);
                self.evaluate_mapped(type_id, mapped.as_ref())
            }
            TypeData::KeyOf(operand) => self.evaluate_keyof(operand),
            TypeData::IndexAccess(object, index) => self.evaluate_index_access(object, index),
            TypeData::TemplateLiteral(spans) => self.evaluate_template_literal(spans),
            TypeData::StringIntrinsic { kind, type_arg } => {
                self.evaluate_string_intrinsic(kind, type_arg)
            }
            TypeData::Lazy(def_id) => self.visit_lazy(def_id, type_id),
            TypeData::Application(app_id) => self.visit_application(app_id, type_id),
            // Structural and atomic types pass through; their members are
            // evaluated where they are consumed (mapped templates, branch
            // selection, lookups).
            _ => Ok(type_id),
        }
    }

    /// Evaluate a union by evaluating members and re-interning; union
    /// normalization collapses duplicates and drops `never` members.
    fn visit_union(&mut self, list_id: TypeListId) -> SolverResult<TypeId> {
        let members = self.interner.type_list(list_id);
        let mut evaluated = Vec::with_capacity(members.len());
        for &member in members.iter() {
            evaluated.push(self.evaluate(member)?);
        }
        Ok(self.interner.union(evaluated))
    }

    /// Resolve a plain alias reference. Generic aliases stay deferred until
    /// applied to arguments.
    fn visit_lazy(&mut self, def_id: DefId, original: TypeId) -> SolverResult<TypeId> {
        let Some(defs) = self.defs else {
            return Ok(original);
        };
        let Some(info) = defs.get(def_id) else {
            return Ok(original);
        };
        if !info.type_params.is_empty() {
            return Ok(original);
        }

        if self.visiting_defs.contains(&def_id) {
            return Ok(original);
        }
        self.visiting_defs.insert(def_id);
        self.chain.push(self.interner.resolve_atom(info.name));
        let result = self.evaluate(info.body);
        self.chain.pop();
        self.visiting_defs.remove(&def_id);
        result
    }

    /// Evaluate a generic alias application: `Alias<Args>`.
    ///
    /// Algorithm:
    /// 1. Resolve the base alias and check argument arity.
    /// 2. Evaluate the arguments.
    /// 3. Substitute them into the alias body and evaluate the result.
    fn visit_application(
        &mut self,
        app_id: TypeApplicationId,
        original: TypeId,
    ) -> SolverResult<TypeId> {
        let app = self.interner.type_application(app_id);

        let Some(defs) = self.defs else {
            return Ok(original);
        };
        let Some(TypeData::Lazy(def_id)) = self.interner.lookup(app.base) else {
            return Ok(original);
        };
        let Some(info) = defs.get(def_id) else {
            return Ok(original);
        };

        let name = self.interner.resolve_atom(info.name);

        if info.type_params.len() != app.args.len() {
            return Err(SolverError::ArityMismatch {
                name,
                expected: info.type_params.len(),
                found: app.args.len(),
            });
        }

        // An alias whose expansion passes through itself with fresh arguments
        // (`type Loop<X> = Loop<[X]>`) never converges; cut it off here with
        // the chain that got us into it.
        if self.visiting_defs.contains(&def_id) {
            let mut chain = self.chain.clone();
            chain.push(name);
            return Err(SolverError::RecursionLimitExceeded {
                depth: self.guard.depth(),
                chain,
            });
        }

        // Arguments that contain free variables keep the application
        // deferred; it will be revisited once an outer substitution binds
        // them.
        let mut args = Vec::with_capacity(app.args.len());
        let mut all_concrete = true;
        for &arg in app.args.iter() {
            let evaluated = self.evaluate(arg)?;
            if self
                .interner
                .flags_of(evaluated)
                .intersects(TypeFlags::CONTAINS_TYPE_PARAMETER | TypeFlags::CONTAINS_INFER)
            {
                all_concrete = false;
            }
            args.push(evaluated);
        }
        if !all_concrete {
            return Ok(self.interner.application(app.base, args));
        }

        self.visiting_defs.insert(def_id);
        self.chain.push(name);
        let instantiated = instantiate_generic(self.interner, info.body, &info.type_params, &args);
        let result = self.evaluate(instantiated);
        self.chain.pop();
        self.visiting_defs.remove(&def_id);
        result
    }
}

/// Convenience function for full type evaluation.
pub fn evaluate_type(interner: &TypeInterner, type_id: TypeId) -> SolverResult<TypeId> {
    let mut evaluator = TypeEvaluator::new(interner);
    evaluator.evaluate(type_id)
}

/// Convenience function for evaluating conditional types.
pub fn evaluate_conditional(interner: &TypeInterner, cond: &ConditionalType) -> SolverResult<TypeId> {
    let cond_id = interner.conditional(cond.clone());
    evaluate_type(interner, cond_id)
}

/// Convenience function for evaluating mapped types.
pub fn evaluate_mapped(interner: &TypeInterner, mapped: &MappedType) -> SolverResult<TypeId> {
    let mapped_id = interner.mapped(mapped.clone());
    evaluate_type(interner, mapped_id)
}

/// Convenience function for evaluating keyof types.
pub fn evaluate_keyof(interner: &TypeInterner, operand: TypeId) -> SolverResult<TypeId> {
    let keyof_id = interner.keyof(operand);
    evaluate_type(interner, keyof_id)
}

/// Look up a registered alias by name, bind its parameters to `args`
/// positionally, and evaluate the instantiated body.
///
/// Errors with `ArityMismatch` on an argument-count mismatch and
/// `UnboundVariable` if the name is unregistered or the body references a
/// variable no parameter declares.
pub fn instantiate_alias(
    interner: &TypeInterner,
    defs: &DefinitionStore,
    name: &str,
    args: &[TypeId],
) -> SolverResult<TypeId> {
    let atom = interner.intern_string(name);
    let def_id = defs
        .resolve_name(atom)
        .ok_or_else(|| SolverError::UnboundVariable {
            name: name.to_string(),
        })?;
    let info = defs.get(def_id).ok_or_else(|| SolverError::UnboundVariable {
        name: name.to_string(),
    })?;

    if info.type_params.len() != args.len() {
        return Err(SolverError::ArityMismatch {
            name: name.to_string(),
            expected: info.type_params.len(),
            found: args.len(),
        });
    }

    let instantiated = instantiate_generic(interner, info.body, &info.type_params, args);

    // Every variable surviving substitution is one no parameter declared.
    let mut free = Vec::new();
    collect_free_type_params(interner, instantiated, &mut free);
    if let Some(&name) = free.first() {
        return Err(SolverError::UnboundVariable {
            name: interner.resolve_atom(name),
        });
    }

    let mut evaluator = TypeEvaluator::with_definitions(interner, defs);
    evaluator.evaluate(instantiated)
}
