//! The built-in utility library.
//!
//! Every utility here is a fixed composition of the engine's primitives:
//! it builds the corresponding conditional or mapped tree and hands it to
//! the evaluator. The mapped utilities go through `keyof` + indexed access,
//! the conditional utilities through a distributive conditional over a
//! single type variable, so union arguments distribute exactly as the
//! evaluation rules dictate.

use std::sync::Arc;

use tya_common::interner::Atom;

use crate::diagnostics::{SolverError, SolverResult};
use crate::evaluate::evaluate_type;
use crate::instantiate::{instantiate_type, TypeSubstitution};
use crate::intern::TypeInterner;
use crate::types::*;

/// `Pick<T, K>`: the fields of `T` named by `K`.
///
/// `K` must name existing fields; an unknown key is an `UnknownKey` error.
/// Field modifiers are preserved (the mapped template is `T[K]`).
pub fn pick(interner: &TypeInterner, source: TypeId, keys: TypeId) -> SolverResult<TypeId> {
    let source = evaluate_type(interner, source)?;
    let shape = expect_object(interner, source, "pick")?;

    let keys = evaluate_type(interner, keys)?;
    let Some(key_atoms) = literal_string_keys(interner, keys) else {
        return Err(SolverError::UnsupportedShape {
            operation: "pick",
            type_id: keys,
        });
    };
    for &key in &key_atoms {
        if shape.property(key).is_none() {
            return Err(SolverError::UnknownKey {
                key: interner.resolve_atom(key),
            });
        }
    }

    let k = interner.intern_string("K");
    let mapped = interner.mapped(MappedType {
        type_param: TypeParamInfo::named(k),
        constraint: keys,
        name_type: None,
        template: interner.index_access(source, interner.type_parameter(k)),
        optional_modifier: None,
        readonly_modifier: None,
    });
    evaluate_type(interner, mapped)
}

/// `Omit<T, K>`: `Pick<T, Exclude<keyof T, K>>`.
pub fn omit(interner: &TypeInterner, source: TypeId, keys: TypeId) -> SolverResult<TypeId> {
    let source = evaluate_type(interner, source)?;
    expect_object(interner, source, "omit")?;

    let all_keys = evaluate_type(interner, interner.keyof(source))?;
    let remaining = exclude(interner, all_keys, keys)?;
    pick(interner, source, remaining)
}

/// `Partial<T>`: every field optional.
pub fn partial(interner: &TypeInterner, source: TypeId) -> SolverResult<TypeId> {
    homomorphic_mapped(interner, source, Some(MappedModifier::Add), None, "partial")
}

/// `Required<T>`: every field required.
pub fn required(interner: &TypeInterner, source: TypeId) -> SolverResult<TypeId> {
    homomorphic_mapped(
        interner,
        source,
        Some(MappedModifier::Remove),
        None,
        "required",
    )
}

/// `Readonly<T>`: every field readonly.
pub fn readonly(interner: &TypeInterner, source: TypeId) -> SolverResult<TypeId> {
    homomorphic_mapped(interner, source, None, Some(MappedModifier::Add), "readonly")
}

/// `Record<K, V>`: an object with one field of type `V` per key in `K`.
pub fn record(interner: &TypeInterner, keys: TypeId, value: TypeId) -> SolverResult<TypeId> {
    let keys = evaluate_type(interner, keys)?;
    if literal_string_keys(interner, keys).is_none() {
        return Err(SolverError::UnsupportedShape {
            operation: "record",
            type_id: keys,
        });
    }

    let k = interner.intern_string("K");
    let mapped = interner.mapped(MappedType {
        type_param: TypeParamInfo::named(k),
        constraint: keys,
        name_type: None,
        template: value,
        optional_modifier: None,
        readonly_modifier: None,
    });
    evaluate_type(interner, mapped)
}

/// `Extract<T, U>`: `T extends U ? T : never`, distributing over `T`.
pub fn extract(interner: &TypeInterner, target: TypeId, filter: TypeId) -> SolverResult<TypeId> {
    let target = evaluate_type(interner, target)?;
    let t = interner.intern_string("T");
    let check = interner.type_parameter(t);
    let cond = interner.conditional(ConditionalType {
        check_type: check,
        extends_type: filter,
        true_type: check,
        false_type: TypeId::NEVER,
        is_distributive: true,
    });
    apply_over(interner, cond, t, target)
}

/// `Exclude<T, U>`: `T extends U ? never : T`, distributing over `T`.
pub fn exclude(interner: &TypeInterner, target: TypeId, filter: TypeId) -> SolverResult<TypeId> {
    let target = evaluate_type(interner, target)?;
    let t = interner.intern_string("T");
    let check = interner.type_parameter(t);
    let cond = interner.conditional(ConditionalType {
        check_type: check,
        extends_type: filter,
        true_type: TypeId::NEVER,
        false_type: check,
        is_distributive: true,
    });
    apply_over(interner, cond, t, target)
}

/// `NonNullable<T>`: `Exclude<T, null | undefined>`.
pub fn non_nullable(interner: &TypeInterner, target: TypeId) -> SolverResult<TypeId> {
    let nullish = interner.union2(TypeId::NULL, TypeId::UNDEFINED);
    exclude(interner, target, nullish)
}

/// `Parameters<T>`: the parameter tuple of a function type.
///
/// `T extends (...args: infer P) => any ? P : never`. `never` stays `never`;
/// a non-function argument is an `UnsupportedShape` error.
pub fn parameters(interner: &TypeInterner, target: TypeId) -> SolverResult<TypeId> {
    let target = evaluate_type(interner, target)?;
    ensure_callable(interner, target, "parameters", false)?;

    let p = interner.intern_string("P");
    let pattern = rest_params_function(interner, None, interner.infer(p), TypeId::ANY, false);
    conditional_over(interner, target, pattern, interner.infer(p), TypeId::NEVER)
}

/// `ConstructorParameters<T>`: the parameter tuple of a constructor type.
pub fn constructor_parameters(interner: &TypeInterner, target: TypeId) -> SolverResult<TypeId> {
    let target = evaluate_type(interner, target)?;
    ensure_callable(interner, target, "constructor_parameters", true)?;

    let p = interner.intern_string("P");
    let pattern = rest_params_function(interner, None, interner.infer(p), TypeId::ANY, true);
    conditional_over(interner, target, pattern, interner.infer(p), TypeId::NEVER)
}

/// `ReturnType<T>`: the return type of a function type.
pub fn return_type(interner: &TypeInterner, target: TypeId) -> SolverResult<TypeId> {
    let target = evaluate_type(interner, target)?;
    ensure_callable(interner, target, "return_type", false)?;

    let r = interner.intern_string("R");
    let pattern = rest_params_function(interner, None, TypeId::ANY, interner.infer(r), false);
    conditional_over(interner, target, pattern, interner.infer(r), TypeId::NEVER)
}

/// `InstanceType<T>`: the instance type a constructor produces.
pub fn instance_type(interner: &TypeInterner, target: TypeId) -> SolverResult<TypeId> {
    let target = evaluate_type(interner, target)?;
    ensure_callable(interner, target, "instance_type", true)?;

    let r = interner.intern_string("R");
    let pattern = rest_params_function(interner, None, TypeId::ANY, interner.infer(r), true);
    conditional_over(interner, target, pattern, interner.infer(r), TypeId::NEVER)
}

/// `ThisParameterType<T>`: the `this` parameter of a function type, or
/// `unknown` if it has none.
pub fn this_parameter_type(interner: &TypeInterner, target: TypeId) -> SolverResult<TypeId> {
    let target = evaluate_type(interner, target)?;
    ensure_callable(interner, target, "this_parameter_type", false)?;

    let r = interner.intern_string("R");
    let pattern = rest_params_function(
        interner,
        Some(interner.infer(r)),
        TypeId::ANY,
        TypeId::ANY,
        false,
    );
    conditional_over(interner, target, pattern, interner.infer(r), TypeId::UNKNOWN)
}

/// `OmitThisParameter<T>`: the function type with its `this` parameter
/// removed.
///
/// The captured parameter list has to be spliced back into a function shape,
/// which a conditional's branch template cannot express, so the signature is
/// rebuilt from the matched shape directly.
pub fn omit_this_parameter(interner: &TypeInterner, target: TypeId) -> SolverResult<TypeId> {
    let target = evaluate_type(interner, target)?;
    if target.is_never() {
        return Ok(TypeId::NEVER);
    }
    let Some(TypeData::Function(shape_id)) = interner.lookup(target) else {
        return Err(SolverError::UnsupportedShape {
            operation: "omit_this_parameter",
            type_id: target,
        });
    };
    let shape = interner.function_shape(shape_id);
    if shape.is_constructor {
        return Err(SolverError::UnsupportedShape {
            operation: "omit_this_parameter",
            type_id: target,
        });
    }
    if shape.this_type.is_none() {
        return Ok(target);
    }
    Ok(interner.function(FunctionShape {
        this_type: None,
        params: shape.params.clone(),
        return_type: shape.return_type,
        is_constructor: false,
    }))
}

// =============================================================================
// Helpers
// =============================================================================

/// Build the homomorphic mapped type `{ [K in keyof T]: T[K] }` with the
/// given modifier deltas and evaluate it.
fn homomorphic_mapped(
    interner: &TypeInterner,
    source: TypeId,
    optional_modifier: Option<MappedModifier>,
    readonly_modifier: Option<MappedModifier>,
    operation: &'static str,
) -> SolverResult<TypeId> {
    let source = evaluate_type(interner, source)?;
    if source.is_never() {
        return Ok(TypeId::NEVER);
    }
    expect_object(interner, source, operation)?;

    let k = interner.intern_string("K");
    let mapped = interner.mapped(MappedType {
        type_param: TypeParamInfo::named(k),
        constraint: interner.keyof(source),
        name_type: None,
        template: interner.index_access(source, interner.type_parameter(k)),
        optional_modifier,
        readonly_modifier,
    });
    evaluate_type(interner, mapped)
}

/// Build a distributive conditional over a fresh variable and substitute the
/// target into it. Distribution over union targets happens in the
/// substitution, exactly as for a user-written `T extends U ? A : B`.
fn apply_over(
    interner: &TypeInterner,
    cond: TypeId,
    var: Atom,
    target: TypeId,
) -> SolverResult<TypeId> {
    let mut subst = TypeSubstitution::new();
    subst.insert(var, target);
    evaluate_type(interner, instantiate_type(interner, cond, &subst))
}

/// `target extends pattern ? true_type : false_type`, distributive.
fn conditional_over(
    interner: &TypeInterner,
    target: TypeId,
    pattern: TypeId,
    true_type: TypeId,
    false_type: TypeId,
) -> SolverResult<TypeId> {
    let t = interner.intern_string("T");
    let cond = interner.conditional(ConditionalType {
        check_type: interner.type_parameter(t),
        extends_type: pattern,
        true_type,
        false_type,
        is_distributive: true,
    });
    apply_over(interner, cond, t, target)
}

/// The `(...args: P) => R` pattern shape shared by the function utilities.
fn rest_params_function(
    interner: &TypeInterner,
    this_type: Option<TypeId>,
    params_type: TypeId,
    return_type: TypeId,
    is_constructor: bool,
) -> TypeId {
    let args = interner.intern_string("args");
    interner.function(FunctionShape {
        this_type,
        params: vec![ParamInfo {
            name: args,
            type_id: params_type,
            optional: false,
            rest: true,
        }],
        return_type,
        is_constructor,
    })
}

fn expect_object(
    interner: &TypeInterner,
    type_id: TypeId,
    operation: &'static str,
) -> SolverResult<Arc<ObjectShape>> {
    match interner.lookup(type_id) {
        Some(TypeData::Object(shape_id)) => Ok(interner.object_shape(shape_id)),
        _ => Err(SolverError::UnsupportedShape { operation, type_id }),
    }
}

/// Collect the string-literal keys of a key type: a literal, a union of
/// literals, or `never` (no keys). `None` for anything else.
fn literal_string_keys(interner: &TypeInterner, keys: TypeId) -> Option<Vec<Atom>> {
    if keys.is_never() {
        return Some(Vec::new());
    }
    match interner.lookup(keys)? {
        TypeData::Literal(LiteralValue::String(atom)) => Some(vec![atom]),
        TypeData::Union(member_list) => {
            let members = interner.type_list(member_list);
            let mut atoms = Vec::with_capacity(members.len());
            for &member in members.iter() {
                match interner.lookup(member)? {
                    TypeData::Literal(LiteralValue::String(atom)) => atoms.push(atom),
                    _ => return None,
                }
            }
            Some(atoms)
        }
        _ => None,
    }
}

/// Check the shape precondition of the function utilities: `never` and `any`
/// flow through the conditional rules, a function (or a union of functions)
/// of the right kind is matched, anything else violates the caller's
/// contract.
fn ensure_callable(
    interner: &TypeInterner,
    type_id: TypeId,
    operation: &'static str,
    want_constructor: bool,
) -> SolverResult<()> {
    if type_id.is_never() || type_id.is_any() {
        return Ok(());
    }
    let is_callable = |id: TypeId| match interner.lookup(id) {
        Some(TypeData::Function(shape_id)) => {
            interner.function_shape(shape_id).is_constructor == want_constructor
        }
        _ => false,
    };
    let ok = match interner.lookup(type_id) {
        Some(TypeData::Union(member_list)) => interner
            .type_list(member_list)
            .iter()
            .all(|&member| is_callable(member)),
        _ => is_callable(type_id),
    };
    if ok {
        Ok(())
    } else {
        Err(SolverError::UnsupportedShape { operation, type_id })
    }
}

#[cfg(test)]
#[path = "../tests/operations_tests.rs"]
mod tests;
