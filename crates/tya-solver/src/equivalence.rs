//! Structural type equivalence.
//!
//! Interning makes identical structures share an id, so equality is almost
//! always the O(1) id comparison. The recursive walk below exists for the
//! one observable normalization difference interning preserves: union member
//! order. Two unions with the same members in different order are
//! equivalent; everything else, object field order included, is compared
//! structurally as stored.

use crate::intern::TypeInterner;
use crate::types::*;

/// Structural equivalence, treating union member order as irrelevant.
pub fn are_types_equivalent(interner: &TypeInterner, a: TypeId, b: TypeId) -> bool {
    if a == b {
        return true;
    }

    let (Some(key_a), Some(key_b)) = (interner.lookup(a), interner.lookup(b)) else {
        return false;
    };

    match (key_a, key_b) {
        (TypeData::Union(list_a), TypeData::Union(list_b)) => {
            let members_a = interner.type_list(list_a);
            let members_b = interner.type_list(list_b);
            if members_a.len() != members_b.len() {
                return false;
            }
            // Unions are small; match members pairwise as a multiset.
            let mut used = vec![false; members_b.len()];
            'outer: for &member_a in members_a.iter() {
                for (index, &member_b) in members_b.iter().enumerate() {
                    if !used[index] && are_types_equivalent(interner, member_a, member_b) {
                        used[index] = true;
                        continue 'outer;
                    }
                }
                return false;
            }
            true
        }
        (TypeData::Tuple(list_a), TypeData::Tuple(list_b)) => {
            let elems_a = interner.tuple_list(list_a);
            let elems_b = interner.tuple_list(list_b);
            elems_a.len() == elems_b.len()
                && elems_a.iter().zip(elems_b.iter()).all(|(ea, eb)| {
                    ea.optional == eb.optional
                        && are_types_equivalent(interner, ea.type_id, eb.type_id)
                })
        }
        (TypeData::Object(shape_a), TypeData::Object(shape_b)) => {
            let shape_a = interner.object_shape(shape_a);
            let shape_b = interner.object_shape(shape_b);
            shape_a.properties.len() == shape_b.properties.len()
                && shape_a
                    .properties
                    .iter()
                    .zip(shape_b.properties.iter())
                    .all(|(pa, pb)| {
                        pa.name == pb.name
                            && pa.optional == pb.optional
                            && pa.readonly == pb.readonly
                            && are_types_equivalent(interner, pa.type_id, pb.type_id)
                    })
        }
        (TypeData::Function(shape_a), TypeData::Function(shape_b)) => {
            let shape_a = interner.function_shape(shape_a);
            let shape_b = interner.function_shape(shape_b);
            if shape_a.is_constructor != shape_b.is_constructor
                || shape_a.params.len() != shape_b.params.len()
            {
                return false;
            }
            let this_matches = match (shape_a.this_type, shape_b.this_type) {
                (None, None) => true,
                (Some(ta), Some(tb)) => are_types_equivalent(interner, ta, tb),
                _ => false,
            };
            this_matches
                && shape_a
                    .params
                    .iter()
                    .zip(shape_b.params.iter())
                    .all(|(pa, pb)| {
                        pa.optional == pb.optional
                            && pa.rest == pb.rest
                            && are_types_equivalent(interner, pa.type_id, pb.type_id)
                    })
                && are_types_equivalent(interner, shape_a.return_type, shape_b.return_type)
        }
        (TypeData::KeyOf(inner_a), TypeData::KeyOf(inner_b)) => {
            are_types_equivalent(interner, inner_a, inner_b)
        }
        (TypeData::IndexAccess(obj_a, idx_a), TypeData::IndexAccess(obj_b, idx_b)) => {
            are_types_equivalent(interner, obj_a, obj_b)
                && are_types_equivalent(interner, idx_a, idx_b)
        }
        (
            TypeData::StringIntrinsic {
                kind: kind_a,
                type_arg: arg_a,
            },
            TypeData::StringIntrinsic {
                kind: kind_b,
                type_arg: arg_b,
            },
        ) => kind_a == kind_b && are_types_equivalent(interner, arg_a, arg_b),
        (TypeData::Conditional(cond_a), TypeData::Conditional(cond_b)) => {
            let cond_a = interner.conditional_type(cond_a);
            let cond_b = interner.conditional_type(cond_b);
            cond_a.is_distributive == cond_b.is_distributive
                && are_types_equivalent(interner, cond_a.check_type, cond_b.check_type)
                && are_types_equivalent(interner, cond_a.extends_type, cond_b.extends_type)
                && are_types_equivalent(interner, cond_a.true_type, cond_b.true_type)
                && are_types_equivalent(interner, cond_a.false_type, cond_b.false_type)
        }
        _ => false,
    }
}
