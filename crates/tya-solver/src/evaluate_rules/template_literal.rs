//! Template literal evaluation.
//!
//! A template literal expands to the union of all literal string
//! combinations its spans admit: `` `get${K}` `` with `K = "a" | "b"`
//! evaluates to `"geta" | "getb"`, and multiple interpolations take the
//! Cartesian product in span order.

use crate::diagnostics::SolverResult;
use crate::evaluate::TypeEvaluator;
use crate::intern::TEMPLATE_LITERAL_EXPANSION_LIMIT;
use crate::types::*;

impl<'a> TypeEvaluator<'a> {
    /// Evaluate a template literal type.
    ///
    /// A span whose type does not reduce to string-convertible literals
    /// leaves the whole template unresolved: the partially evaluated
    /// template node is returned, never a guessed string. The same applies
    /// past the expansion limit.
    pub(crate) fn evaluate_template_literal(
        &mut self,
        spans: TemplateListId,
    ) -> SolverResult<TypeId> {
        let span_list = self.interner().template_list(spans);

        tracing::trace!(span_count = span_list.len(), "evaluate_template_literal");

        // Evaluate interpolated spans up front; the evaluated spans are also
        // what we return if the template cannot fully resolve.
        let mut evaluated_spans = Vec::with_capacity(span_list.len());
        for span in span_list.iter() {
            let evaluated = match span {
                TemplateSpan::Text(text) => TemplateSpan::Text(*text),
                TemplateSpan::Type(inner) => {
                    let inner = self.evaluate(*inner)?;
                    // A `never` span admits no string, so the template has
                    // no members at all.
                    if inner.is_never() {
                        return Ok(TypeId::NEVER);
                    }
                    TemplateSpan::Type(inner)
                }
            };
            evaluated_spans.push(evaluated);
        }

        let mut combinations = vec![String::new()];

        for span in &evaluated_spans {
            match span {
                TemplateSpan::Text(text) => {
                    let text = self.interner().resolve_atom_ref(*text);
                    for combo in &mut combinations {
                        combo.push_str(&text);
                    }
                }
                TemplateSpan::Type(type_id) => {
                    let Some(values) = self.extract_literal_strings(*type_id) else {
                        return Ok(self.interner().template_literal(evaluated_spans));
                    };

                    let new_size = combinations.len().saturating_mul(values.len());
                    if new_size > TEMPLATE_LITERAL_EXPANSION_LIMIT {
                        return Ok(self.interner().template_literal(evaluated_spans));
                    }

                    let mut new_combinations = Vec::with_capacity(new_size);
                    for combo in &combinations {
                        for value in &values {
                            new_combinations.push(format!("{combo}{value}"));
                        }
                    }
                    combinations = new_combinations;
                }
            }
        }

        let literals: Vec<TypeId> = combinations
            .iter()
            .map(|text| self.interner().literal_string(text))
            .collect();
        Ok(self.interner().union(literals))
    }

    /// Extract string representations from an evaluated type: string,
    /// number, and boolean literals, and unions thereof. `None` means the
    /// type has a non-literal part.
    pub(crate) fn extract_literal_strings(&self, type_id: TypeId) -> Option<Vec<String>> {
        match self.interner().lookup(type_id)? {
            TypeData::Union(member_list) => {
                let members = self.interner().type_list(member_list);
                let mut result = Vec::with_capacity(members.len());
                for &member in members.iter() {
                    result.extend(self.extract_literal_strings(member)?);
                }
                Some(result)
            }
            TypeData::Literal(LiteralValue::String(atom)) => {
                Some(vec![self.interner().resolve_atom_ref(atom).to_string()])
            }
            TypeData::Literal(LiteralValue::Number(value)) => {
                Some(vec![number_literal_text(value.0)])
            }
            TypeData::Literal(LiteralValue::Boolean(value)) => {
                Some(vec![if value { "true" } else { "false" }.to_string()])
            }
            _ => None,
        }
    }
}

/// Render a number literal the way the host language stringifies numbers:
/// integer-valued numbers print without a fractional part.
fn number_literal_text(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
