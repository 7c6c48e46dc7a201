//! Algebraic laws the engine must uphold, plus alias-registry behavior.
//!
//! - Distribution law: C<A | B> == C<A> | C<B> for bare-variable checks;
//!   wrapped checks do not distribute.
//! - Never absorption: a conditional over `never` is `never`.
//! - Idempotence: partial and readonly are idempotent.
//! - Pick/Omit complementarity and the pick round trip.
//! - Alias registration (last wins), arity checking, unbound variables,
//!   and the recursion limit on self-referential aliases.

use crate::def::{DefinitionInfo, DefinitionStore};
use crate::diagnostics::SolverError;
use crate::equivalence::are_types_equivalent;
use crate::evaluate::{evaluate_type, instantiate_alias};
use crate::instantiate::{TypeSubstitution, instantiate_type};
use crate::intern::TypeInterner;
use crate::operations::{omit, partial, pick, readonly};
use crate::types::*;
use tya_common::interner::Atom;

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

fn field(name: Atom, type_id: TypeId) -> PropertyInfo {
    PropertyInfo {
        name,
        type_id,
        optional: false,
        readonly: false,
    }
}

fn sample_object(interner: &TypeInterner) -> TypeId {
    let title = interner.intern_string("title");
    let description = interner.intern_string("description");
    let completed = interner.intern_string("completed");
    interner.object(vec![
        field(title, TypeId::STRING),
        PropertyInfo {
            name: description,
            type_id: TypeId::STRING,
            optional: true,
            readonly: false,
        },
        field(completed, TypeId::BOOLEAN),
    ])
}

fn field_names(interner: &TypeInterner, type_id: TypeId) -> Vec<String> {
    match interner.lookup(type_id) {
        Some(TypeData::Object(shape_id)) => interner
            .object_shape(shape_id)
            .properties
            .iter()
            .map(|prop| interner.resolve_atom(prop.name))
            .collect(),
        other => panic!("expected an object, got {other:?}"),
    }
}

/// Apply a distributive `T extends string ? "str" : "other"` to a target.
fn classify(interner: &TypeInterner, target: TypeId) -> TypeId {
    let t = interner.intern_string("T");
    let cond = interner.conditional(ConditionalType {
        check_type: interner.type_parameter(t),
        extends_type: TypeId::STRING,
        true_type: interner.literal_string("str"),
        false_type: interner.literal_string("other"),
        is_distributive: true,
    });
    let mut subst = TypeSubstitution::new();
    subst.insert(t, target);
    evaluate_type(interner, instantiate_type(interner, cond, &subst)).expect("evaluates")
}

// =============================================================================
// Distribution law
// =============================================================================

#[test]
fn conditional_over_union_equals_union_of_conditionals() {
    init_tracing();
    let interner = TypeInterner::new();
    let a = interner.literal_string("a");
    let union = interner.union2(a, TypeId::NUMBER);

    let combined = classify(&interner, union);
    let memberwise = interner.union2(classify(&interner, a), classify(&interner, TypeId::NUMBER));

    assert_eq!(combined, memberwise);
    assert!(are_types_equivalent(&interner, combined, memberwise));
}

#[test]
fn wrapped_check_is_not_distributive() {
    // C<[A | B]> with a tuple-wrapped check resolves once, against the
    // whole union, and lands in the false branch.
    let interner = TypeInterner::new();
    let t = interner.intern_string("T");
    let param = interner.type_parameter(t);
    let cond = interner.conditional(ConditionalType {
        check_type: interner.tuple(vec![TupleElement {
            type_id: param,
            optional: false,
        }]),
        extends_type: interner.tuple(vec![TupleElement {
            type_id: TypeId::STRING,
            optional: false,
        }]),
        true_type: interner.literal_string("str"),
        false_type: interner.literal_string("other"),
        is_distributive: false,
    });

    let union = interner.union2(interner.literal_string("a"), TypeId::NUMBER);
    let mut subst = TypeSubstitution::new();
    subst.insert(t, union);
    let result =
        evaluate_type(&interner, instantiate_type(&interner, cond, &subst)).expect("evaluates");

    assert_eq!(result, interner.literal_string("other"));
}

// =============================================================================
// Never absorption
// =============================================================================

#[test]
fn conditional_over_never_is_never_for_any_branches() {
    let interner = TypeInterner::new();
    for (yes, no) in [
        (TypeId::STRING, TypeId::NUMBER),
        (TypeId::ANY, TypeId::UNKNOWN),
        (interner.literal_string("x"), TypeId::NEVER),
    ] {
        assert_eq!(classify(&interner, TypeId::NEVER), TypeId::NEVER);
        let cond = interner.conditional(ConditionalType {
            check_type: TypeId::NEVER,
            extends_type: TypeId::STRING,
            true_type: yes,
            false_type: no,
            is_distributive: false,
        });
        assert_eq!(evaluate_type(&interner, cond), Ok(TypeId::NEVER));
    }
}

// =============================================================================
// Idempotence
// =============================================================================

#[test]
fn partial_is_idempotent() {
    let interner = TypeInterner::new();
    let source = sample_object(&interner);

    let once = partial(&interner, source).expect("evaluates");
    let twice = partial(&interner, once).expect("evaluates");
    assert_eq!(once, twice);
    assert!(are_types_equivalent(&interner, once, twice));
}

#[test]
fn readonly_is_idempotent() {
    let interner = TypeInterner::new();
    let source = sample_object(&interner);

    let once = readonly(&interner, source).expect("evaluates");
    let twice = readonly(&interner, once).expect("evaluates");
    assert_eq!(once, twice);
}

// =============================================================================
// Pick / Omit laws
// =============================================================================

#[test]
fn pick_and_omit_partition_the_key_set() {
    let interner = TypeInterner::new();
    let source = sample_object(&interner);
    let keys = interner.union2(
        interner.literal_string("title"),
        interner.literal_string("completed"),
    );

    let picked = pick(&interner, source, keys).expect("picks");
    let omitted = omit(&interner, source, keys).expect("omits");

    let picked_names = field_names(&interner, picked);
    let omitted_names = field_names(&interner, omitted);

    assert!(picked_names.iter().all(|name| !omitted_names.contains(name)));
    let mut all: Vec<String> = picked_names;
    all.extend(omitted_names);
    all.sort();
    let mut expected = field_names(&interner, source);
    expected.sort();
    assert_eq!(all, expected);
}

#[test]
fn picking_all_keys_round_trips() {
    let interner = TypeInterner::new();
    let source = sample_object(&interner);

    let all_keys = interner.keyof(source);
    let result = pick(&interner, source, all_keys).expect("picks");
    assert_eq!(result, source);
    assert!(are_types_equivalent(&interner, result, source));
}

// =============================================================================
// Equivalence normalization
// =============================================================================

#[test]
fn union_member_order_is_irrelevant_for_equivalence() {
    let interner = TypeInterner::new();
    let a = interner.literal_string("a");
    let b = interner.literal_string("b");

    let ab = interner.union(vec![a, b]);
    let ba = interner.union(vec![b, a]);
    assert_ne!(ab, ba);
    assert!(are_types_equivalent(&interner, ab, ba));

    // The normalization reaches through structure.
    let value = interner.intern_string("value");
    let obj_ab = interner.object(vec![field(value, ab)]);
    let obj_ba = interner.object(vec![field(value, ba)]);
    assert!(are_types_equivalent(&interner, obj_ab, obj_ba));

    let c = interner.literal_string("c");
    assert!(!are_types_equivalent(
        &interner,
        ab,
        interner.union(vec![a, c])
    ));
}

// =============================================================================
// Alias registry
// =============================================================================

#[test]
fn instantiating_a_generic_alias_substitutes_positionally() {
    let interner = TypeInterner::new();
    let defs = DefinitionStore::new();

    // type Box<T> = { value: T }
    let box_name = interner.intern_string("Box");
    let t = interner.intern_string("T");
    let value = interner.intern_string("value");
    let body = interner.object(vec![field(value, interner.type_parameter(t))]);
    defs.register(DefinitionInfo::generic_alias(
        box_name,
        vec![TypeParamInfo::named(t)],
        body,
    ));

    let result = instantiate_alias(&interner, &defs, "Box", &[TypeId::STRING]).expect("evaluates");
    assert_eq!(
        result,
        interner.object(vec![field(value, TypeId::STRING)])
    );
}

#[test]
fn alias_arity_mismatch_is_an_error() {
    let interner = TypeInterner::new();
    let defs = DefinitionStore::new();

    let pair_name = interner.intern_string("Pair");
    let a = interner.intern_string("A");
    let b = interner.intern_string("B");
    let body = interner.tuple(vec![
        TupleElement {
            type_id: interner.type_parameter(a),
            optional: false,
        },
        TupleElement {
            type_id: interner.type_parameter(b),
            optional: false,
        },
    ]);
    defs.register(DefinitionInfo::generic_alias(
        pair_name,
        vec![TypeParamInfo::named(a), TypeParamInfo::named(b)],
        body,
    ));

    assert_eq!(
        instantiate_alias(&interner, &defs, "Pair", &[TypeId::STRING]),
        Err(SolverError::ArityMismatch {
            name: "Pair".to_string(),
            expected: 2,
            found: 1,
        })
    );
}

#[test]
fn unregistered_alias_is_an_error() {
    let interner = TypeInterner::new();
    let defs = DefinitionStore::new();
    assert_eq!(
        instantiate_alias(&interner, &defs, "Nope", &[]),
        Err(SolverError::UnboundVariable {
            name: "Nope".to_string()
        })
    );
}

#[test]
fn body_referencing_an_undeclared_variable_is_an_error() {
    let interner = TypeInterner::new();
    let defs = DefinitionStore::new();

    // type Broken<T> = U
    let name = interner.intern_string("Broken");
    let t = interner.intern_string("T");
    let u = interner.intern_string("U");
    defs.register(DefinitionInfo::generic_alias(
        name,
        vec![TypeParamInfo::named(t)],
        interner.type_parameter(u),
    ));

    assert_eq!(
        instantiate_alias(&interner, &defs, "Broken", &[TypeId::STRING]),
        Err(SolverError::UnboundVariable {
            name: "U".to_string()
        })
    );
}

#[test]
fn reregistration_wins_name_lookup() {
    let interner = TypeInterner::new();
    let defs = DefinitionStore::new();

    let name = interner.intern_string("Width");
    defs.register(DefinitionInfo::alias(name, TypeId::NUMBER));
    defs.register(DefinitionInfo::alias(name, TypeId::STRING));

    assert_eq!(
        instantiate_alias(&interner, &defs, "Width", &[]),
        Ok(TypeId::STRING)
    );
}

#[test]
fn self_referential_alias_hits_the_recursion_limit() {
    let interner = TypeInterner::new();
    let defs = DefinitionStore::new();

    // type Loop<X> = Loop<[X]>
    let name = interner.intern_string("Loop");
    let x = interner.intern_string("X");
    let id = defs.register(DefinitionInfo::generic_alias(
        name,
        vec![TypeParamInfo::named(x)],
        TypeId::NEVER,
    ));
    let self_ref = interner.intern(TypeData::Lazy(id));
    let body = interner.application(
        self_ref,
        vec![interner.tuple(vec![TupleElement {
            type_id: interner.type_parameter(x),
            optional: false,
        }])],
    );
    defs.set_body(id, body);

    let result = instantiate_alias(&interner, &defs, "Loop", &[TypeId::STRING]);
    match result {
        Err(SolverError::RecursionLimitExceeded { chain, .. }) => {
            assert!(chain.iter().all(|entry| entry == "Loop"));
            assert!(!chain.is_empty());
        }
        other => panic!("expected a recursion limit error, got {other:?}"),
    }
}

#[test]
fn plain_alias_reference_resolves_through_lazy() {
    let interner = TypeInterner::new();
    let defs = DefinitionStore::new();

    let name = interner.intern_string("Id");
    let def_id = defs.register(DefinitionInfo::alias(name, TypeId::NUMBER));
    let lazy = interner.intern(TypeData::Lazy(def_id));

    let mut evaluator = crate::evaluate::TypeEvaluator::with_definitions(&interner, &defs);
    assert_eq!(evaluator.evaluate(lazy), Ok(TypeId::NUMBER));
}
