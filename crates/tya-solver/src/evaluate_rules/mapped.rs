//! Mapped type evaluation: `{ [K in Keys as Remap]: Template }`.
//!
//! Homomorphic mapped types (template is `Source[K]` for the iteration
//! variable `K`) preserve the source field's optional/readonly flags wherever
//! no explicit modifier delta overrides them.

use rustc_hash::FxHashSet;
use tya_common::interner::Atom;

use crate::diagnostics::{SolverError, SolverResult};
use crate::evaluate::TypeEvaluator;
use crate::instantiate::{instantiate_type, TypeSubstitution};
use crate::types::*;

/// Concrete key set a mapped type iterates, in source order.
struct MappedKeys {
    string_literals: Vec<Atom>,
}

impl<'a> TypeEvaluator<'a> {
    /// Evaluate a mapped type.
    ///
    /// Algorithm:
    /// 1. Resolve the constraint to a concrete key set; defer if it still
    ///    contains free variables.
    /// 2. Per key, in source order: remap the key (a remap to `never`
    ///    filters the key out), instantiate the template, and compute the
    ///    modifiers.
    /// 3. Intern the resulting object. Output field order equals key
    ///    iteration order; two keys remapping to the same output key is a
    ///    `KeyCollision` error.
    pub(crate) fn evaluate_mapped(
        &mut self,
        original: TypeId,
        mapped: &MappedType,
    ) -> SolverResult<TypeId> {
        let keys_type = self.evaluate(mapped.constraint)?;

        if self
            .interner()
            .flags_of(keys_type)
            .intersects(TypeFlags::CONTAINS_TYPE_PARAMETER | TypeFlags::CONTAINS_INFER)
        {
            return Ok(original);
        }

        let Some(key_set) = self.extract_mapped_keys(keys_type) else {
            return Ok(original);
        };

        // Homomorphic mapped types read modifiers off the source object.
        let source_shape = self.homomorphic_source(mapped)?;

        let mut properties = Vec::with_capacity(key_set.string_literals.len());
        let mut seen: FxHashSet<Atom> = FxHashSet::default();

        for key_name in key_set.string_literals {
            let key_literal = self
                .interner()
                .intern(TypeData::Literal(LiteralValue::String(key_name)));

            let output_name = match mapped.name_type {
                None => key_name,
                Some(name_type) => {
                    let mut subst = TypeSubstitution::new();
                    subst.insert(mapped.type_param.name, key_literal);
                    let remapped = instantiate_type(self.interner(), name_type, &subst);
                    let remapped = self.evaluate(remapped)?;
                    if remapped.is_never() {
                        continue;
                    }
                    match self.interner().lookup(remapped) {
                        Some(TypeData::Literal(LiteralValue::String(name))) => name,
                        _ => return Ok(original),
                    }
                }
            };

            if !seen.insert(output_name) {
                return Err(SolverError::KeyCollision {
                    key: self.interner().resolve_atom(output_name),
                });
            }

            let mut subst = TypeSubstitution::new();
            subst.insert(mapped.type_param.name, key_literal);
            let value_type = instantiate_type(self.interner(), mapped.template, &subst);
            let value_type = self.evaluate(value_type)?;

            let (source_optional, source_readonly) = source_shape
                .as_ref()
                .and_then(|shape| shape.property(key_name))
                .map(|prop| (prop.optional, prop.readonly))
                .unwrap_or((false, false));

            let optional = match mapped.optional_modifier {
                Some(MappedModifier::Add) => true,
                Some(MappedModifier::Remove) => false,
                None => source_optional,
            };
            let readonly = match mapped.readonly_modifier {
                Some(MappedModifier::Add) => true,
                Some(MappedModifier::Remove) => false,
                None => source_readonly,
            };

            properties.push(PropertyInfo {
                name: output_name,
                type_id: value_type,
                optional,
                readonly,
            });
        }

        Ok(self.interner().object(properties))
    }

    /// If the template is `Source[K]` for the iteration variable `K`, return
    /// the evaluated source object's shape.
    fn homomorphic_source(
        &mut self,
        mapped: &MappedType,
    ) -> SolverResult<Option<std::sync::Arc<ObjectShape>>> {
        let Some(TypeData::IndexAccess(object, index)) = self.interner().lookup(mapped.template)
        else {
            return Ok(None);
        };
        let Some(TypeData::TypeParameter(info)) = self.interner().lookup(index) else {
            return Ok(None);
        };
        if info.name != mapped.type_param.name {
            return Ok(None);
        }
        let object = self.evaluate(object)?;
        match self.interner().lookup(object) {
            Some(TypeData::Object(shape_id)) => Ok(Some(self.interner().object_shape(shape_id))),
            _ => Ok(None),
        }
    }

    /// Extract the concrete key set from an evaluated constraint.
    /// Returns None when the keys cannot be enumerated (the mapped type
    /// stays deferred).
    fn extract_mapped_keys(&self, keys_type: TypeId) -> Option<MappedKeys> {
        let mut keys = MappedKeys {
            string_literals: Vec::new(),
        };

        if keys_type.is_never() {
            // Mapping over `never` yields an empty object.
            return Some(keys);
        }

        match self.interner().lookup(keys_type)? {
            TypeData::Literal(LiteralValue::String(name)) => {
                keys.string_literals.push(name);
                Some(keys)
            }
            TypeData::Union(member_list) => {
                let members = self.interner().type_list(member_list);
                for &member in members.iter() {
                    match self.interner().lookup(member) {
                        Some(TypeData::Literal(LiteralValue::String(name))) => {
                            keys.string_literals.push(name);
                        }
                        _ => return None,
                    }
                }
                Some(keys)
            }
            _ => None,
        }
    }
}
