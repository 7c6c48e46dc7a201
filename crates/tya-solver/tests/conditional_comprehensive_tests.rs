//! Comprehensive tests for conditional type evaluation.
//!
//! These cover:
//! - branch selection against primitive, literal, and structural patterns
//! - `never` and `any` as the checked type
//! - distribution over unions (and its absence for wrapped checks)
//! - infer variable binding, consistent-binding failure, and the
//!   all-declared-variables-bound engine invariant

use crate::diagnostics::SolverError;
use crate::evaluate::{evaluate_conditional, evaluate_type};
use crate::intern::TypeInterner;
use crate::types::*;

fn plain(check: TypeId, extends: TypeId, yes: TypeId, no: TypeId) -> ConditionalType {
    ConditionalType {
        check_type: check,
        extends_type: extends,
        true_type: yes,
        false_type: no,
        is_distributive: false,
    }
}

fn distributive(check: TypeId, extends: TypeId, yes: TypeId, no: TypeId) -> ConditionalType {
    ConditionalType {
        is_distributive: true,
        ..plain(check, extends, yes, no)
    }
}

// =============================================================================
// Branch selection
// =============================================================================

#[test]
fn true_branch_on_identical_types() {
    // string extends string ? number : boolean -> number
    let interner = TypeInterner::new();
    let cond = plain(TypeId::STRING, TypeId::STRING, TypeId::NUMBER, TypeId::BOOLEAN);
    assert_eq!(evaluate_conditional(&interner, &cond), Ok(TypeId::NUMBER));
}

#[test]
fn false_branch_on_mismatch() {
    // string extends number ? number : boolean -> boolean
    let interner = TypeInterner::new();
    let cond = plain(TypeId::STRING, TypeId::NUMBER, TypeId::NUMBER, TypeId::BOOLEAN);
    assert_eq!(evaluate_conditional(&interner, &cond), Ok(TypeId::BOOLEAN));
}

#[test]
fn number_literal_extends_number() {
    // 42 extends number ? "yes" : "no" -> "yes"
    let interner = TypeInterner::new();
    let literal_42 = interner.literal_number(42.0);
    let yes = interner.literal_string("yes");
    let no = interner.literal_string("no");

    let cond = plain(literal_42, TypeId::NUMBER, yes, no);
    assert_eq!(evaluate_conditional(&interner, &cond), Ok(yes));
}

#[test]
fn string_literal_extends_string() {
    // "hello" extends string ? true : false -> true
    let interner = TypeInterner::new();
    let hello = interner.literal_string("hello");

    let cond = plain(
        hello,
        TypeId::STRING,
        TypeId::BOOLEAN_TRUE,
        TypeId::BOOLEAN_FALSE,
    );
    assert_eq!(
        evaluate_conditional(&interner, &cond),
        Ok(TypeId::BOOLEAN_TRUE)
    );
}

#[test]
fn nested_conditionals_select_by_literal() {
    // "oven" extends "grill" ? 1 : ("oven" extends "oven" ? 2 : never)
    let interner = TypeInterner::new();
    let grill = interner.literal_string("grill");
    let oven = interner.literal_string("oven");
    let one = interner.literal_number(1.0);
    let two = interner.literal_number(2.0);

    let inner = interner.conditional(plain(oven, oven, two, TypeId::NEVER));
    let cond = plain(oven, grill, one, inner);
    assert_eq!(evaluate_conditional(&interner, &cond), Ok(two));
}

// =============================================================================
// never and any as the checked type
// =============================================================================

#[test]
fn never_check_skips_both_branches() {
    let interner = TypeInterner::new();

    let cond = plain(TypeId::NEVER, TypeId::STRING, TypeId::NUMBER, TypeId::BOOLEAN);
    assert_eq!(evaluate_conditional(&interner, &cond), Ok(TypeId::NEVER));

    let cond = distributive(TypeId::NEVER, TypeId::STRING, TypeId::NUMBER, TypeId::BOOLEAN);
    assert_eq!(evaluate_conditional(&interner, &cond), Ok(TypeId::NEVER));
}

#[test]
fn any_check_yields_union_of_both_branches() {
    let interner = TypeInterner::new();
    let yes = interner.literal_string("yes");
    let no = interner.literal_string("no");

    let cond = plain(TypeId::ANY, TypeId::STRING, yes, no);
    assert_eq!(
        evaluate_conditional(&interner, &cond),
        Ok(interner.union2(yes, no))
    );
}

// =============================================================================
// Distribution
// =============================================================================

#[test]
fn distributive_union_check_evaluates_per_member() {
    // ("a" | 1) extends string ? "str" : "other", distributive
    //   -> "str" | "other"
    let interner = TypeInterner::new();
    let a = interner.literal_string("a");
    let one = interner.literal_number(1.0);
    let union = interner.union2(a, one);
    let str_result = interner.literal_string("str");
    let other = interner.literal_string("other");

    let cond = distributive(union, TypeId::STRING, str_result, other);
    assert_eq!(
        evaluate_conditional(&interner, &cond),
        Ok(interner.union2(str_result, other))
    );
}

#[test]
fn non_distributive_union_check_matches_as_a_whole() {
    // ("a" | 1) extends string ? "str" : "other", NOT distributive:
    // the union is one candidate, 1 fails the pattern -> "other"
    let interner = TypeInterner::new();
    let a = interner.literal_string("a");
    let one = interner.literal_number(1.0);
    let union = interner.union2(a, one);
    let str_result = interner.literal_string("str");
    let other = interner.literal_string("other");

    let cond = plain(union, TypeId::STRING, str_result, other);
    assert_eq!(evaluate_conditional(&interner, &cond), Ok(other));
}

#[test]
fn distribution_collapses_duplicate_results() {
    // ("a" | "b") extends string ? "yes" : "no", distributive
    //   -> "yes" | "yes" -> "yes"
    let interner = TypeInterner::new();
    let union = interner.union2(interner.literal_string("a"), interner.literal_string("b"));
    let yes = interner.literal_string("yes");
    let no = interner.literal_string("no");

    let cond = distributive(union, TypeId::STRING, yes, no);
    assert_eq!(evaluate_conditional(&interner, &cond), Ok(yes));
}

// =============================================================================
// Infer variables
// =============================================================================

#[test]
fn infer_binds_the_return_type() {
    // (() => string) extends (...args: any) => infer R ? R : never -> string
    let interner = TypeInterner::new();
    let args = interner.intern_string("args");
    let r = interner.intern_string("R");

    let source = interner.function(FunctionShape {
        this_type: None,
        params: vec![],
        return_type: TypeId::STRING,
        is_constructor: false,
    });
    let pattern = interner.function(FunctionShape {
        this_type: None,
        params: vec![ParamInfo {
            name: args,
            type_id: TypeId::ANY,
            optional: false,
            rest: true,
        }],
        return_type: interner.infer(r),
        is_constructor: false,
    });

    let cond = plain(source, pattern, interner.infer(r), TypeId::NEVER);
    assert_eq!(evaluate_conditional(&interner, &cond), Ok(TypeId::STRING));
}

#[test]
fn infer_binds_tuple_elements_positionally() {
    // [string, number] extends [infer A, infer B] ? B : never -> number
    let interner = TypeInterner::new();
    let a = interner.intern_string("A");
    let b = interner.intern_string("B");

    let source = interner.tuple(vec![
        TupleElement {
            type_id: TypeId::STRING,
            optional: false,
        },
        TupleElement {
            type_id: TypeId::NUMBER,
            optional: false,
        },
    ]);
    let pattern = interner.tuple(vec![
        TupleElement {
            type_id: interner.infer(a),
            optional: false,
        },
        TupleElement {
            type_id: interner.infer(b),
            optional: false,
        },
    ]);

    let cond = plain(source, pattern, interner.infer(b), TypeId::NEVER);
    assert_eq!(evaluate_conditional(&interner, &cond), Ok(TypeId::NUMBER));
}

#[test]
fn repeated_infer_variable_requires_consistent_binding() {
    let interner = TypeInterner::new();
    let x = interner.intern_string("X");
    let mismatch = interner.literal_string("mismatch");

    let pattern = interner.tuple(vec![
        TupleElement {
            type_id: interner.infer(x),
            optional: false,
        },
        TupleElement {
            type_id: interner.infer(x),
            optional: false,
        },
    ]);

    // Same type twice: binds consistently.
    let same = interner.tuple(vec![
        TupleElement {
            type_id: TypeId::STRING,
            optional: false,
        },
        TupleElement {
            type_id: TypeId::STRING,
            optional: false,
        },
    ]);
    let cond = plain(same, pattern, interner.infer(x), mismatch);
    assert_eq!(evaluate_conditional(&interner, &cond), Ok(TypeId::STRING));

    // Different types: the match fails and the false branch is taken.
    let different = interner.tuple(vec![
        TupleElement {
            type_id: TypeId::STRING,
            optional: false,
        },
        TupleElement {
            type_id: TypeId::NUMBER,
            optional: false,
        },
    ]);
    let cond = plain(different, pattern, interner.infer(x), mismatch);
    assert_eq!(evaluate_conditional(&interner, &cond), Ok(mismatch));
}

#[test]
fn infer_bound_via_object_field() {
    // {value: 42} extends {value: infer V} ? V : never -> 42
    let interner = TypeInterner::new();
    let v = interner.intern_string("V");
    let value = interner.intern_string("value");
    let literal_42 = interner.literal_number(42.0);

    let source = interner.object(vec![PropertyInfo {
        name: value,
        type_id: literal_42,
        optional: false,
        readonly: false,
    }]);
    let pattern = interner.object(vec![PropertyInfo {
        name: value,
        type_id: interner.infer(v),
        optional: false,
        readonly: false,
    }]);

    let cond = plain(source, pattern, interner.infer(v), TypeId::NEVER);
    assert_eq!(evaluate_conditional(&interner, &cond), Ok(literal_42));
}

#[test]
fn match_that_leaves_a_declared_infer_unbound_is_an_error() {
    // string extends (string | infer X) ? X : never
    // The union member `string` matches without touching X; resolving the
    // true branch without a binding for X is an engine fault.
    let interner = TypeInterner::new();
    let x = interner.intern_string("X");
    let pattern = interner.union2(TypeId::STRING, interner.infer(x));

    let cond = plain(TypeId::STRING, pattern, interner.infer(x), TypeId::NEVER);
    assert_eq!(
        evaluate_conditional(&interner, &cond),
        Err(SolverError::UnboundVariable {
            name: "X".to_string()
        })
    );
}

// =============================================================================
// Deferral
// =============================================================================

#[test]
fn conditional_over_free_parameter_stays_deferred() {
    let interner = TypeInterner::new();
    let t = interner.intern_string("T");
    let check = interner.type_parameter(t);

    let cond_id = interner.conditional(plain(
        check,
        TypeId::STRING,
        TypeId::NUMBER,
        TypeId::BOOLEAN,
    ));
    assert_eq!(evaluate_type(&interner, cond_id), Ok(cond_id));
}
