//! Pattern matching for conditional extends clauses.
//!
//! Matches a concrete source type against a pattern type that may contain
//! `Infer` variables, extracting bindings on success. Failure is ordinary
//! control flow: the matcher reports `false` and the resolver takes the
//! false branch.
//!
//! Binding rules:
//! - An infer variable binds whatever it faces; the first occurrence wins
//!   and later occurrences of the same variable must bind an equivalent type
//!   or the whole match fails (consistent binding).
//! - A union *source* in this non-distributive context matches only if every
//!   member matches, with per-variable bindings unioned across members.
//! - A union *pattern* matches if any member matches; the first successful
//!   member's bindings are kept.

use rustc_hash::FxHashMap;
use tya_common::interner::Atom;

use crate::equivalence::are_types_equivalent;
use crate::evaluate::TypeEvaluator;
use crate::types::*;

type Bindings = FxHashMap<Atom, TypeId>;

impl<'a> TypeEvaluator<'a> {
    /// Check if a type contains any `Infer` variables.
    #[inline]
    pub(crate) fn type_contains_infer(&self, type_id: TypeId) -> bool {
        self.interner()
            .flags_of(type_id)
            .intersects(TypeFlags::CONTAINS_INFER)
    }

    /// Main pattern matching entry point.
    ///
    /// Returns `true` if the match succeeded, with extracted bindings merged
    /// into `bindings`. On failure `bindings` may hold partial entries;
    /// callers pass a scratch map and discard it on failure.
    pub(crate) fn match_infer_pattern(
        &self,
        source: TypeId,
        pattern: TypeId,
        bindings: &mut Bindings,
    ) -> bool {
        let Some(pattern_key) = self.interner().lookup(pattern) else {
            return false;
        };

        // Infer binds whatever it faces, unions included, before any
        // source splitting.
        if let TypeData::Infer(info) = &pattern_key {
            return self.bind_infer(info, source, bindings);
        }

        if source == pattern {
            return true;
        }

        // `any` matches every pattern.
        if source.is_any() {
            return true;
        }

        // Union source: every member must match; per-variable bindings are
        // unioned across members.
        if let Some(TypeData::Union(member_list)) = self.interner().lookup(source) {
            let members = self.interner().type_list(member_list);
            let mut combined: Bindings = Bindings::default();
            for &member in members.iter() {
                let mut member_bindings = Bindings::default();
                if !self.match_infer_pattern(member, pattern, &mut member_bindings) {
                    return false;
                }
                for (name, ty) in member_bindings {
                    combined
                        .entry(name)
                        .and_modify(|existing| {
                            *existing = self.interner().union2(*existing, ty);
                        })
                        .or_insert(ty);
                }
            }
            return self.merge_bindings(combined, bindings);
        }

        match pattern_key {
            TypeData::Intrinsic(IntrinsicKind::Any) | TypeData::Intrinsic(IntrinsicKind::Unknown) => {
                true
            }
            // Literals extend their base primitive.
            TypeData::Intrinsic(IntrinsicKind::String) => matches!(
                self.interner().lookup(source),
                Some(TypeData::Literal(LiteralValue::String(_)))
            ),
            TypeData::Intrinsic(IntrinsicKind::Number) => matches!(
                self.interner().lookup(source),
                Some(TypeData::Literal(LiteralValue::Number(_)))
            ),
            TypeData::Intrinsic(IntrinsicKind::Boolean) => matches!(
                self.interner().lookup(source),
                Some(TypeData::Literal(LiteralValue::Boolean(_)))
            ),
            // Identity matches were handled above; the remaining intrinsics
            // and literals accept nothing else.
            TypeData::Intrinsic(_) | TypeData::Literal(_) => false,

            // Union pattern: any member may match; first success wins.
            TypeData::Union(pattern_members) => {
                let pattern_members = self.interner().type_list(pattern_members);
                for &pattern_member in pattern_members.iter() {
                    let mut scratch = bindings.clone();
                    if self.match_infer_pattern(source, pattern_member, &mut scratch) {
                        *bindings = scratch;
                        return true;
                    }
                }
                false
            }

            TypeData::Tuple(pattern_elems) => match self.interner().lookup(source) {
                Some(TypeData::Tuple(source_elems)) => {
                    let source_elems = self.interner().tuple_list(source_elems);
                    let pattern_elems = self.interner().tuple_list(pattern_elems);
                    self.match_tuple_elements(&source_elems, &pattern_elems, bindings)
                }
                _ => false,
            },

            TypeData::Object(pattern_shape_id) => {
                self.match_object_pattern(source, pattern_shape_id, bindings)
            }

            TypeData::Function(pattern_shape_id) => {
                self.match_function_pattern(source, pattern_shape_id, bindings)
            }

            // Deferred computations are not patterns; they should have been
            // evaluated away before matching.
            TypeData::TypeParameter(_)
            | TypeData::Infer(_)
            | TypeData::Conditional(_)
            | TypeData::Mapped(_)
            | TypeData::TemplateLiteral(_)
            | TypeData::KeyOf(_)
            | TypeData::IndexAccess(_, _)
            | TypeData::StringIntrinsic { .. }
            | TypeData::Lazy(_)
            | TypeData::Application(_) => false,
        }
    }

    /// Bind an inferred type to an infer variable.
    ///
    /// Applies the variable's constraint (if any) as a filter and enforces
    /// consistent binding against earlier occurrences.
    pub(crate) fn bind_infer(
        &self,
        info: &TypeParamInfo,
        inferred: TypeId,
        bindings: &mut Bindings,
    ) -> bool {
        let mut inferred = inferred;
        if let Some(constraint) = info.constraint {
            match self.filter_inferred_by_constraint(inferred, constraint) {
                Some(filtered) => inferred = filtered,
                None => return false,
            }
        }

        if let Some(&existing) = bindings.get(&info.name) {
            return existing == inferred
                || are_types_equivalent(self.interner(), existing, inferred);
        }

        bindings.insert(info.name, inferred);
        true
    }

    /// Filter an inferred type by a constraint. Union members that fail the
    /// constraint are dropped; if nothing survives the binding fails.
    fn filter_inferred_by_constraint(&self, inferred: TypeId, constraint: TypeId) -> Option<TypeId> {
        if inferred == constraint {
            return Some(inferred);
        }

        if let Some(TypeData::Union(member_list)) = self.interner().lookup(inferred) {
            let members = self.interner().type_list(member_list);
            let mut filtered = Vec::new();
            for &member in members.iter() {
                let mut scratch = Bindings::default();
                if self.match_infer_pattern(member, constraint, &mut scratch) {
                    filtered.push(member);
                }
            }
            return match filtered.len() {
                0 => None,
                _ => Some(self.interner().union(filtered)),
            };
        }

        let mut scratch = Bindings::default();
        if self.match_infer_pattern(inferred, constraint, &mut scratch) {
            Some(inferred)
        } else {
            None
        }
    }

    /// Merge freshly combined bindings into the caller's map, enforcing
    /// consistency with variables bound earlier in the same pattern.
    fn merge_bindings(&self, combined: Bindings, bindings: &mut Bindings) -> bool {
        for (name, ty) in combined {
            if let Some(&existing) = bindings.get(&name) {
                if existing != ty && !are_types_equivalent(self.interner(), existing, ty) {
                    return false;
                }
            } else {
                bindings.insert(name, ty);
            }
        }
        true
    }

    /// Match tuple elements position by position.
    ///
    /// A shorter source may still match if the pattern's tail elements are
    /// optional; infer variables in the missing tail bind `undefined`.
    pub(crate) fn match_tuple_elements(
        &self,
        source_elems: &[TupleElement],
        pattern_elems: &[TupleElement],
        bindings: &mut Bindings,
    ) -> bool {
        if source_elems.len() > pattern_elems.len() {
            return false;
        }

        for (source_elem, pattern_elem) in source_elems.iter().zip(pattern_elems.iter()) {
            let source_type = if source_elem.optional {
                self.interner()
                    .union2(source_elem.type_id, TypeId::UNDEFINED)
            } else {
                source_elem.type_id
            };
            if !self.match_infer_pattern(source_type, pattern_elem.type_id, bindings) {
                return false;
            }
        }

        for pattern_elem in &pattern_elems[source_elems.len()..] {
            if !pattern_elem.optional {
                return false;
            }
            if self.type_contains_infer(pattern_elem.type_id)
                && !self.match_infer_pattern(TypeId::UNDEFINED, pattern_elem.type_id, bindings)
            {
                return false;
            }
        }

        true
    }

    /// Match an object pattern: every pattern field must be present in the
    /// source (or be optional), with field types matching recursively.
    fn match_object_pattern(
        &self,
        source: TypeId,
        pattern_shape_id: ObjectShapeId,
        bindings: &mut Bindings,
    ) -> bool {
        let Some(TypeData::Object(source_shape_id)) = self.interner().lookup(source) else {
            return false;
        };
        let source_shape = self.interner().object_shape(source_shape_id);
        let pattern_shape = self.interner().object_shape(pattern_shape_id);

        for pattern_prop in &pattern_shape.properties {
            let Some(source_prop) = source_shape.property(pattern_prop.name) else {
                if pattern_prop.optional {
                    if self.type_contains_infer(pattern_prop.type_id)
                        && !self.match_infer_pattern(
                            TypeId::UNDEFINED,
                            pattern_prop.type_id,
                            bindings,
                        )
                    {
                        return false;
                    }
                    continue;
                }
                return false;
            };
            let source_type = if source_prop.optional {
                self.interner()
                    .union2(source_prop.type_id, TypeId::UNDEFINED)
            } else {
                source_prop.type_id
            };
            if !self.match_infer_pattern(source_type, pattern_prop.type_id, bindings) {
                return false;
            }
        }
        true
    }

    /// Match a function (or constructor) pattern.
    ///
    /// A single rest parameter in the pattern stands for the whole parameter
    /// list: an infer variable there binds the source's parameter tuple,
    /// and a plain rest parameter accepts any signature.
    fn match_function_pattern(
        &self,
        source: TypeId,
        pattern_shape_id: FunctionShapeId,
        bindings: &mut Bindings,
    ) -> bool {
        let pattern_fn = self.interner().function_shape(pattern_shape_id);
        let Some(TypeData::Function(source_shape_id)) = self.interner().lookup(source) else {
            return false;
        };
        let source_fn = self.interner().function_shape(source_shape_id);

        if source_fn.is_constructor != pattern_fn.is_constructor {
            return false;
        }

        if let Some(pattern_this) = pattern_fn.this_type {
            // A source without a `this` parameter places no constraint on
            // callers, which is what `unknown` expresses.
            let source_this = source_fn.this_type.unwrap_or(TypeId::UNKNOWN);
            if !self.match_infer_pattern(source_this, pattern_this, bindings) {
                return false;
            }
        }

        let single_rest = pattern_fn.params.len() == 1 && pattern_fn.params[0].rest;
        if single_rest {
            let rest_type = pattern_fn.params[0].type_id;
            if self.type_contains_infer(rest_type) {
                let tuple_elems: Vec<TupleElement> = source_fn
                    .params
                    .iter()
                    .map(|param| TupleElement {
                        type_id: param.type_id,
                        optional: param.optional,
                    })
                    .collect();
                let params_tuple = self.interner().tuple(tuple_elems);
                if !self.match_infer_pattern(params_tuple, rest_type, bindings) {
                    return false;
                }
            }
        } else {
            if source_fn.params.len() != pattern_fn.params.len() {
                return false;
            }
            for (source_param, pattern_param) in
                source_fn.params.iter().zip(pattern_fn.params.iter())
            {
                if source_param.optional != pattern_param.optional
                    || source_param.rest != pattern_param.rest
                {
                    return false;
                }
                let source_param_type = if source_param.optional {
                    self.interner()
                        .union2(source_param.type_id, TypeId::UNDEFINED)
                } else {
                    source_param.type_id
                };
                if !self.match_infer_pattern(source_param_type, pattern_param.type_id, bindings) {
                    return false;
                }
            }
        }

        self.match_infer_pattern(source_fn.return_type, pattern_fn.return_type, bindings)
    }
}
