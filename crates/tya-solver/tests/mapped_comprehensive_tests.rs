//! Comprehensive tests for mapped type evaluation.
//!
//! Covers key iteration order, homomorphic modifier preservation, modifier
//! deltas, key remapping (including the never-filter), and the key-collision
//! fault.

use crate::diagnostics::SolverError;
use crate::evaluate::{evaluate_mapped, evaluate_type};
use crate::intern::TypeInterner;
use crate::types::*;
use tya_common::interner::Atom;

fn field(name: Atom, type_id: TypeId) -> PropertyInfo {
    PropertyInfo {
        name,
        type_id,
        optional: false,
        readonly: false,
    }
}

/// `{ [K in keyof source]: source[K] }` with the given deltas.
fn homomorphic(
    interner: &TypeInterner,
    source: TypeId,
    optional_modifier: Option<MappedModifier>,
    readonly_modifier: Option<MappedModifier>,
) -> MappedType {
    let k = interner.intern_string("K");
    MappedType {
        type_param: TypeParamInfo::named(k),
        constraint: interner.keyof(source),
        name_type: None,
        template: interner.index_access(source, interner.type_parameter(k)),
        optional_modifier,
        readonly_modifier,
    }
}

fn shape_of(interner: &TypeInterner, type_id: TypeId) -> std::sync::Arc<ObjectShape> {
    match interner.lookup(type_id) {
        Some(TypeData::Object(shape_id)) => interner.object_shape(shape_id),
        other => panic!("expected an object, got {other:?}"),
    }
}

// =============================================================================
// Identity and modifier deltas
// =============================================================================

#[test]
fn identity_mapped_type_reproduces_the_object() {
    let interner = TypeInterner::new();
    let title = interner.intern_string("title");
    let count = interner.intern_string("count");
    let source = interner.object(vec![
        field(title, TypeId::STRING),
        PropertyInfo {
            name: count,
            type_id: TypeId::NUMBER,
            optional: true,
            readonly: true,
        },
    ]);

    let mapped = homomorphic(&interner, source, None, None);
    assert_eq!(evaluate_mapped(&interner, &mapped), Ok(source));
}

#[test]
fn optional_add_forces_every_field_optional() {
    let interner = TypeInterner::new();
    let title = interner.intern_string("title");
    let done = interner.intern_string("done");
    let source = interner.object(vec![
        field(title, TypeId::STRING),
        field(done, TypeId::BOOLEAN),
    ]);

    let mapped = homomorphic(&interner, source, Some(MappedModifier::Add), None);
    let result = evaluate_mapped(&interner, &mapped).expect("evaluates");
    let shape = shape_of(&interner, result);
    assert!(shape.properties.iter().all(|prop| prop.optional));
    assert_eq!(shape.properties[0].type_id, TypeId::STRING);
}

#[test]
fn optional_remove_strips_existing_optionality() {
    let interner = TypeInterner::new();
    let title = interner.intern_string("title");
    let source = interner.object(vec![PropertyInfo {
        name: title,
        type_id: TypeId::STRING,
        optional: true,
        readonly: false,
    }]);

    let mapped = homomorphic(&interner, source, Some(MappedModifier::Remove), None);
    let result = evaluate_mapped(&interner, &mapped).expect("evaluates");
    assert!(!shape_of(&interner, result).properties[0].optional);
}

#[test]
fn readonly_add_marks_every_field_readonly() {
    let interner = TypeInterner::new();
    let title = interner.intern_string("title");
    let source = interner.object(vec![field(title, TypeId::STRING)]);

    let mapped = homomorphic(&interner, source, None, Some(MappedModifier::Add));
    let result = evaluate_mapped(&interner, &mapped).expect("evaluates");
    assert!(shape_of(&interner, result).properties[0].readonly);
}

#[test]
fn homomorphic_mapping_preserves_source_modifiers() {
    let interner = TypeInterner::new();
    let a = interner.intern_string("a");
    let b = interner.intern_string("b");
    let source = interner.object(vec![
        PropertyInfo {
            name: a,
            type_id: TypeId::STRING,
            optional: true,
            readonly: false,
        },
        PropertyInfo {
            name: b,
            type_id: TypeId::NUMBER,
            optional: false,
            readonly: true,
        },
    ]);

    let mapped = homomorphic(&interner, source, None, None);
    let result = evaluate_mapped(&interner, &mapped).expect("evaluates");
    let shape = shape_of(&interner, result);
    assert!(shape.properties[0].optional);
    assert!(!shape.properties[0].readonly);
    assert!(!shape.properties[1].optional);
    assert!(shape.properties[1].readonly);
}

// =============================================================================
// Key iteration order
// =============================================================================

#[test]
fn output_field_order_follows_the_constraint_order() {
    let interner = TypeInterner::new();
    let b = interner.literal_string("b");
    let a = interner.literal_string("a");
    let keys = interner.union(vec![b, a]);

    let k = interner.intern_string("K");
    let mapped = MappedType {
        type_param: TypeParamInfo::named(k),
        constraint: keys,
        name_type: None,
        template: TypeId::NUMBER,
        optional_modifier: None,
        readonly_modifier: None,
    };

    let result = evaluate_mapped(&interner, &mapped).expect("evaluates");
    let shape = shape_of(&interner, result);
    let names: Vec<String> = shape
        .properties
        .iter()
        .map(|prop| interner.resolve_atom(prop.name))
        .collect();
    assert_eq!(names, vec!["b", "a"]);
}

#[test]
fn mapping_over_never_yields_an_empty_object() {
    let interner = TypeInterner::new();
    let k = interner.intern_string("K");
    let mapped = MappedType {
        type_param: TypeParamInfo::named(k),
        constraint: TypeId::NEVER,
        name_type: None,
        template: TypeId::STRING,
        optional_modifier: None,
        readonly_modifier: None,
    };

    let result = evaluate_mapped(&interner, &mapped).expect("evaluates");
    assert!(shape_of(&interner, result).properties.is_empty());
}

// =============================================================================
// Key remapping
// =============================================================================

#[test]
fn template_literal_remap_renames_keys_in_order() {
    // { [K in keyof T as `get${Capitalize<K>}`]: T[K] }
    let interner = TypeInterner::new();
    let name = interner.intern_string("name");
    let age = interner.intern_string("age");
    let source = interner.object(vec![
        field(name, TypeId::STRING),
        PropertyInfo {
            name: age,
            type_id: TypeId::NUMBER,
            optional: true,
            readonly: false,
        },
    ]);

    let k = interner.intern_string("K");
    let get = interner.intern_string("get");
    let remap = interner.template_literal(vec![
        TemplateSpan::Text(get),
        TemplateSpan::Type(
            interner.string_intrinsic(StringIntrinsicKind::Capitalize, interner.type_parameter(k)),
        ),
    ]);
    let mapped = MappedType {
        name_type: Some(remap),
        ..homomorphic(&interner, source, None, None)
    };

    let result = evaluate_mapped(&interner, &mapped).expect("evaluates");
    let shape = shape_of(&interner, result);
    let names: Vec<String> = shape
        .properties
        .iter()
        .map(|prop| interner.resolve_atom(prop.name))
        .collect();
    assert_eq!(names, vec!["getName", "getAge"]);
    // Modifiers follow the source field the key came from.
    assert!(!shape.properties[0].optional);
    assert!(shape.properties[1].optional);
}

#[test]
fn remapping_a_key_to_never_filters_it_out() {
    // { [K in keyof T as K extends "secret" ? never : K]: T[K] }
    let interner = TypeInterner::new();
    let public_key = interner.intern_string("public");
    let secret_key = interner.intern_string("secret");
    let source = interner.object(vec![
        field(public_key, TypeId::STRING),
        field(secret_key, TypeId::STRING),
    ]);

    let k = interner.intern_string("K");
    let k_param = interner.type_parameter(k);
    let remap = interner.conditional(ConditionalType {
        check_type: k_param,
        extends_type: interner.literal_string("secret"),
        true_type: TypeId::NEVER,
        false_type: k_param,
        is_distributive: true,
    });
    let mapped = MappedType {
        name_type: Some(remap),
        ..homomorphic(&interner, source, None, None)
    };

    let result = evaluate_mapped(&interner, &mapped).expect("evaluates");
    let shape = shape_of(&interner, result);
    assert_eq!(shape.properties.len(), 1);
    assert_eq!(interner.resolve_atom(shape.properties[0].name), "public");
}

#[test]
fn remap_collision_is_a_construction_error() {
    // Remapping every key to the constant "same" collides on the second key.
    let interner = TypeInterner::new();
    let a = interner.intern_string("a");
    let b = interner.intern_string("b");
    let source = interner.object(vec![field(a, TypeId::STRING), field(b, TypeId::NUMBER)]);

    let mapped = MappedType {
        name_type: Some(interner.literal_string("same")),
        ..homomorphic(&interner, source, None, None)
    };

    assert_eq!(
        evaluate_mapped(&interner, &mapped),
        Err(SolverError::KeyCollision {
            key: "same".to_string()
        })
    );
}

// =============================================================================
// Deferral
// =============================================================================

#[test]
fn mapped_over_a_free_parameter_stays_deferred() {
    let interner = TypeInterner::new();
    let t = interner.intern_string("T");
    let source = interner.type_parameter(t);

    let mapped_id = interner.mapped(homomorphic(&interner, source, None, None));
    assert_eq!(evaluate_type(&interner, mapped_id), Ok(mapped_id));
}
