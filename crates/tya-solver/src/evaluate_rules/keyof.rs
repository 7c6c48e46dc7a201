//! `keyof` evaluation: the key set of a type as a union of literals.

use crate::diagnostics::SolverResult;
use crate::evaluate::TypeEvaluator;
use crate::types::*;

impl<'a> TypeEvaluator<'a> {
    /// Evaluate `keyof operand`.
    ///
    /// - object: union of its key literals, in field order
    /// - tuple: union of its index literals
    /// - union of objects: keys present in every member, in the first
    ///   member's order
    ///
    /// Anything else (free type parameters in particular) stays deferred.
    pub(crate) fn evaluate_keyof(&mut self, operand: TypeId) -> SolverResult<TypeId> {
        let operand = self.evaluate(operand)?;

        if self
            .interner()
            .flags_of(operand)
            .intersects(TypeFlags::CONTAINS_TYPE_PARAMETER | TypeFlags::CONTAINS_INFER)
        {
            return Ok(self.interner().keyof(operand));
        }

        match self.interner().lookup(operand) {
            Some(TypeData::Object(shape_id)) => {
                let shape = self.interner().object_shape(shape_id);
                let keys: Vec<TypeId> = shape
                    .properties
                    .iter()
                    .map(|prop| {
                        self.interner()
                            .intern(TypeData::Literal(LiteralValue::String(prop.name)))
                    })
                    .collect();
                Ok(self.interner().union(keys))
            }
            Some(TypeData::Tuple(list_id)) => {
                let elements = self.interner().tuple_list(list_id);
                let keys: Vec<TypeId> = (0..elements.len())
                    .map(|index| self.interner().literal_number(index as f64))
                    .collect();
                Ok(self.interner().union(keys))
            }
            Some(TypeData::Union(member_list)) => {
                // Keys of a union are the keys every member has.
                let members = self.interner().type_list(member_list);
                let mut shapes = Vec::with_capacity(members.len());
                for &member in members.iter() {
                    let member = self.evaluate(member)?;
                    match self.interner().lookup(member) {
                        Some(TypeData::Object(shape_id)) => {
                            shapes.push(self.interner().object_shape(shape_id));
                        }
                        _ => return Ok(self.interner().keyof(operand)),
                    }
                }
                let Some((first, rest)) = shapes.split_first() else {
                    return Ok(TypeId::NEVER);
                };
                let keys: Vec<TypeId> = first
                    .properties
                    .iter()
                    .filter(|prop| rest.iter().all(|shape| shape.property(prop.name).is_some()))
                    .map(|prop| {
                        self.interner()
                            .intern(TypeData::Literal(LiteralValue::String(prop.name)))
                    })
                    .collect();
                Ok(self.interner().union(keys))
            }
            _ => Ok(self.interner().keyof(operand)),
        }
    }
}
