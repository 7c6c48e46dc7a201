//! Indexed access evaluation: `object[index]`.

use crate::diagnostics::{SolverError, SolverResult};
use crate::evaluate::TypeEvaluator;
use crate::types::*;

impl<'a> TypeEvaluator<'a> {
    /// Evaluate `object[index]`.
    ///
    /// - object field lookup by string literal key
    /// - tuple element lookup by number literal index
    /// - a union index distributes: `T["a" | "b"]` is `T["a"] | T["b"]`
    /// - a union object distributes over its members
    ///
    /// A missing key is an `UnknownKey` error. Free type parameters on
    /// either side keep the access deferred.
    pub(crate) fn evaluate_index_access(
        &mut self,
        object: TypeId,
        index: TypeId,
    ) -> SolverResult<TypeId> {
        let object = self.evaluate(object)?;
        let index = self.evaluate(index)?;

        let blocked = TypeFlags::CONTAINS_TYPE_PARAMETER | TypeFlags::CONTAINS_INFER;
        if self.interner().flags_of(object).intersects(blocked)
            || self.interner().flags_of(index).intersects(blocked)
        {
            return Ok(self.interner().index_access(object, index));
        }

        // Distribute over a union index first: T["a" | "b"].
        if let Some(TypeData::Union(index_members)) = self.interner().lookup(index) {
            let members = self.interner().type_list(index_members);
            let mut results = Vec::with_capacity(members.len());
            for &member in members.iter() {
                results.push(self.evaluate_index_access(object, member)?);
            }
            return Ok(self.interner().union(results));
        }

        match self.interner().lookup(object) {
            Some(TypeData::Object(shape_id)) => {
                let Some(TypeData::Literal(LiteralValue::String(name))) =
                    self.interner().lookup(index)
                else {
                    return Ok(self.interner().index_access(object, index));
                };
                let shape = self.interner().object_shape(shape_id);
                match shape.property(name) {
                    Some(prop) => Ok(prop.type_id),
                    None => Err(SolverError::UnknownKey {
                        key: self.interner().resolve_atom(name),
                    }),
                }
            }
            Some(TypeData::Tuple(list_id)) => {
                let Some(TypeData::Literal(LiteralValue::Number(value))) =
                    self.interner().lookup(index)
                else {
                    return Ok(self.interner().index_access(object, index));
                };
                let elements = self.interner().tuple_list(list_id);
                let position = value.0;
                if position.fract() != 0.0 || position < 0.0 {
                    return Err(SolverError::UnknownKey {
                        key: format!("{position}"),
                    });
                }
                match elements.get(position as usize) {
                    Some(element) if element.optional => Ok(self
                        .interner()
                        .union2(element.type_id, TypeId::UNDEFINED)),
                    Some(element) => Ok(element.type_id),
                    None => Err(SolverError::UnknownKey {
                        key: format!("{}", position as usize),
                    }),
                }
            }
            Some(TypeData::Union(object_members)) => {
                let members = self.interner().type_list(object_members);
                let mut results = Vec::with_capacity(members.len());
                for &member in members.iter() {
                    results.push(self.evaluate_index_access(member, index)?);
                }
                Ok(self.interner().union(results))
            }
            _ => Ok(self.interner().index_access(object, index)),
        }
    }
}
