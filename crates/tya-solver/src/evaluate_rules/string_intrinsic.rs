//! String case-transform intrinsics: Uppercase, Lowercase, Capitalize,
//! Uncapitalize.
//!
//! These distribute over unions and transform string literal types; over a
//! free type variable they stay deferred.

use crate::diagnostics::{SolverError, SolverResult};
use crate::evaluate::TypeEvaluator;
use crate::types::*;

impl<'a> TypeEvaluator<'a> {
    pub(crate) fn evaluate_string_intrinsic(
        &mut self,
        kind: StringIntrinsicKind,
        type_arg: TypeId,
    ) -> SolverResult<TypeId> {
        let evaluated_arg = self.evaluate(type_arg)?;

        if evaluated_arg == TypeId::STRING || evaluated_arg.is_never() {
            return Ok(evaluated_arg);
        }

        if self
            .interner()
            .flags_of(evaluated_arg)
            .intersects(TypeFlags::CONTAINS_TYPE_PARAMETER | TypeFlags::CONTAINS_INFER)
        {
            return Ok(self.interner().string_intrinsic(kind, evaluated_arg));
        }

        match self.interner().lookup(evaluated_arg) {
            // Distribute over union members.
            Some(TypeData::Union(member_list)) => {
                let members = self.interner().type_list(member_list);
                let mut transformed = Vec::with_capacity(members.len());
                for &member in members.iter() {
                    let wrapped = self.interner().string_intrinsic(kind, member);
                    transformed.push(self.evaluate(wrapped)?);
                }
                Ok(self.interner().union(transformed))
            }

            Some(TypeData::Literal(LiteralValue::String(atom))) => {
                let text = self.interner().resolve_atom_ref(atom);
                let transformed = apply_string_transform(kind, &text);
                Ok(self.interner().literal_string(&transformed))
            }

            // A template literal that stayed unexpanded keeps the transform
            // wrapped around it; it applies once the template resolves.
            Some(TypeData::TemplateLiteral(_)) => {
                Ok(self.interner().string_intrinsic(kind, evaluated_arg))
            }

            _ => Err(SolverError::UnsupportedShape {
                operation: intrinsic_name(kind),
                type_id: evaluated_arg,
            }),
        }
    }
}

fn intrinsic_name(kind: StringIntrinsicKind) -> &'static str {
    match kind {
        StringIntrinsicKind::Uppercase => "Uppercase",
        StringIntrinsicKind::Lowercase => "Lowercase",
        StringIntrinsicKind::Capitalize => "Capitalize",
        StringIntrinsicKind::Uncapitalize => "Uncapitalize",
    }
}

/// Apply a case transform to one string value.
pub(crate) fn apply_string_transform(kind: StringIntrinsicKind, text: &str) -> String {
    match kind {
        StringIntrinsicKind::Uppercase => text.to_uppercase(),
        StringIntrinsicKind::Lowercase => text.to_lowercase(),
        StringIntrinsicKind::Capitalize => {
            let mut chars = text.chars();
            match chars.next() {
                Some(first) => {
                    let upper: String = first.to_uppercase().collect();
                    upper + chars.as_str()
                }
                None => text.to_string(),
            }
        }
        StringIntrinsicKind::Uncapitalize => {
            let mut chars = text.chars();
            match chars.next() {
                Some(first) => {
                    let lower: String = first.to_lowercase().collect();
                    lower + chars.as_str()
                }
                None => text.to_string(),
            }
        }
    }
}
