//! Conditional type evaluation: `check extends pattern ? T : F`.
//!
//! Distribution over a union substituted into a bare-parameter check happens
//! during substitution (see `instantiate.rs`); by the time a conditional
//! reaches this resolver its check type is concrete, or the node stays
//! deferred. A conditional built directly with a union check and the
//! distributive flag set is resolved member by member here.

use rustc_hash::FxHashMap;
use tya_common::interner::Atom;

use crate::diagnostics::{SolverError, SolverResult};
use crate::evaluate::TypeEvaluator;
use crate::instantiate::{collect_infer_names, instantiate_type, TypeSubstitution};
use crate::types::*;

impl<'a> TypeEvaluator<'a> {
    pub(crate) fn evaluate_conditional(
        &mut self,
        original: TypeId,
        cond: &ConditionalType,
    ) -> SolverResult<TypeId> {
        let check = self.evaluate(cond.check_type)?;

        // `never` resolves the whole conditional to `never`; both branches
        // are skipped. Distribution over the empty union has no members.
        if check.is_never() {
            return Ok(TypeId::NEVER);
        }

        // `any` is both a match and a non-match: the result is the union of
        // both branches.
        if check.is_any() {
            return self.both_branches(cond);
        }

        // A check that still contains free variables keeps the conditional
        // deferred until an outer substitution binds them.
        if self
            .interner()
            .flags_of(check)
            .intersects(TypeFlags::CONTAINS_TYPE_PARAMETER | TypeFlags::CONTAINS_INFER)
        {
            return Ok(original);
        }

        if cond.is_distributive
            && let Some(TypeData::Union(member_list)) = self.interner().lookup(check)
        {
            let members = self.interner().type_list(member_list);
            let mut results = Vec::with_capacity(members.len());
            for &member in members.iter() {
                results.push(self.resolve_branch(member, cond)?);
            }
            return Ok(self.interner().union(results));
        }

        self.resolve_branch(check, cond)
    }

    /// Resolve one (non-union) check type against the conditional's pattern
    /// and take the corresponding branch.
    fn resolve_branch(&mut self, check: TypeId, cond: &ConditionalType) -> SolverResult<TypeId> {
        if check.is_never() {
            return Ok(TypeId::NEVER);
        }
        if check.is_any() {
            return self.both_branches(cond);
        }

        let mut bindings: FxHashMap<Atom, TypeId> = FxHashMap::default();
        if self.match_infer_pattern(check, cond.extends_type, &mut bindings) {
            let mut declared = Vec::new();
            collect_infer_names(self.interner(), cond.extends_type, &mut declared);

            // A successful match must have bound every declared infer
            // variable; a hole here is an engine fault, not a default.
            let mut subst = TypeSubstitution::new();
            for name in declared {
                match bindings.get(&name) {
                    Some(&bound) => subst.insert(name, bound),
                    None => {
                        return Err(SolverError::UnboundVariable {
                            name: self.interner().resolve_atom(name),
                        });
                    }
                }
            }

            let substituted = instantiate_type(self.interner(), cond.true_type, &subst);
            self.evaluate(substituted)
        } else {
            // Infer variables stay unbound on this path; the false branch
            // must not reference them.
            self.evaluate(cond.false_type)
        }
    }

    /// Evaluate both branches independently and union them, with declared
    /// infer variables pinned to `unknown` (there is no match to bind them).
    fn both_branches(&mut self, cond: &ConditionalType) -> SolverResult<TypeId> {
        let mut declared = Vec::new();
        collect_infer_names(self.interner(), cond.extends_type, &mut declared);
        let mut subst = TypeSubstitution::new();
        for name in declared {
            subst.insert(name, TypeId::UNKNOWN);
        }

        let true_type = instantiate_type(self.interner(), cond.true_type, &subst);
        let true_result = self.evaluate(true_type)?;
        let false_result = self.evaluate(cond.false_type)?;
        Ok(self.interner().union2(true_result, false_result))
    }
}
