//! Tests for type interning and union normalization.

use crate::intern::TypeInterner;
use crate::types::*;

// =============================================================================
// Identity and deduplication
// =============================================================================

#[test]
fn identical_structures_share_an_id() {
    let interner = TypeInterner::new();

    let a = interner.literal_string("title");
    let b = interner.literal_string("title");
    assert_eq!(a, b);

    let tuple_a = interner.tuple(vec![TupleElement {
        type_id: TypeId::STRING,
        optional: false,
    }]);
    let tuple_b = interner.tuple(vec![TupleElement {
        type_id: TypeId::STRING,
        optional: false,
    }]);
    assert_eq!(tuple_a, tuple_b);
}

#[test]
fn reserved_intrinsics_have_stable_ids() {
    let interner = TypeInterner::new();
    assert_eq!(
        interner.intern(TypeData::Intrinsic(IntrinsicKind::String)),
        TypeId::STRING
    );
    assert_eq!(interner.literal_boolean(true), TypeId::BOOLEAN_TRUE);
    assert_eq!(interner.literal_boolean(false), TypeId::BOOLEAN_FALSE);
    assert!(TypeId::NEVER.is_intrinsic());
}

// =============================================================================
// Union invariants
// =============================================================================

#[test]
fn union_flattens_nested_unions() {
    let interner = TypeInterner::new();

    let inner = interner.union2(TypeId::STRING, TypeId::NUMBER);
    let outer = interner.union2(inner, TypeId::BOOLEAN);

    let Some(TypeData::Union(list_id)) = interner.lookup(outer) else {
        panic!("expected a union");
    };
    let members = interner.type_list(list_id);
    assert_eq!(
        members.as_ref(),
        &[TypeId::STRING, TypeId::NUMBER, TypeId::BOOLEAN]
    );
    // No member is itself a union.
    for &member in members.iter() {
        assert!(!matches!(interner.lookup(member), Some(TypeData::Union(_))));
    }
}

#[test]
fn union_deduplicates_preserving_first_occurrence_order() {
    let interner = TypeInterner::new();

    let a = interner.literal_string("a");
    let b = interner.literal_string("b");
    let union = interner.union(vec![b, a, b, a]);

    let Some(TypeData::Union(list_id)) = interner.lookup(union) else {
        panic!("expected a union");
    };
    assert_eq!(interner.type_list(list_id).as_ref(), &[b, a]);
}

#[test]
fn union_drops_never_members() {
    let interner = TypeInterner::new();
    let result = interner.union(vec![TypeId::NEVER, TypeId::STRING, TypeId::NEVER]);
    assert_eq!(result, TypeId::STRING);
}

#[test]
fn empty_union_collapses_to_never() {
    let interner = TypeInterner::new();
    assert_eq!(interner.union(vec![]), TypeId::NEVER);
    assert_eq!(interner.union(vec![TypeId::NEVER]), TypeId::NEVER);
}

#[test]
fn any_and_unknown_absorb_the_union() {
    let interner = TypeInterner::new();
    assert_eq!(
        interner.union(vec![TypeId::STRING, TypeId::ANY]),
        TypeId::ANY
    );
    assert_eq!(
        interner.union(vec![TypeId::STRING, TypeId::UNKNOWN]),
        TypeId::UNKNOWN
    );
}

// =============================================================================
// Classification flags
// =============================================================================

#[test]
fn flags_track_type_parameters_through_structures() {
    let interner = TypeInterner::new();

    let t = interner.intern_string("T");
    let param = interner.type_parameter(t);
    assert!(
        interner
            .flags_of(param)
            .contains(TypeFlags::CONTAINS_TYPE_PARAMETER)
    );

    let name = interner.intern_string("value");
    let object = interner.object(vec![PropertyInfo {
        name,
        type_id: param,
        optional: false,
        readonly: false,
    }]);
    assert!(
        interner
            .flags_of(object)
            .contains(TypeFlags::CONTAINS_TYPE_PARAMETER)
    );

    let concrete = interner.object(vec![PropertyInfo {
        name,
        type_id: TypeId::STRING,
        optional: false,
        readonly: false,
    }]);
    assert!(
        !interner
            .flags_of(concrete)
            .intersects(TypeFlags::CONTAINS_TYPE_PARAMETER | TypeFlags::CONTAINS_DEFERRED)
    );
}

#[test]
fn flags_mark_meta_types_deferred() {
    let interner = TypeInterner::new();

    let keyof = interner.keyof(TypeId::STRING);
    assert!(
        interner
            .flags_of(keyof)
            .contains(TypeFlags::CONTAINS_DEFERRED)
    );

    let x = interner.intern_string("X");
    let infer = interner.infer(x);
    assert!(interner.flags_of(infer).contains(TypeFlags::CONTAINS_INFER));
}
