//! Tests for function inlining.

use super::beta_func::beta_func;
use super::{appc, appf, halt, letc, letf, letp, letv, Term, Value};
use crate::error::CompilerError;

#[test]
fn identity_without_functions() {
    let term = letv("x", Value::F64(1.0), halt("x"));
    assert_eq!(beta_func(&term).unwrap(), term);
}

#[test]
fn inlines_call_substituting_params_and_return() {
    let body = letp("r", "+", vec!["a".into(), "a".into()], appc("k", "r"));
    let term = letf(
        "f",
        "k",
        vec!["a".into()],
        None,
        body,
        letv(
            "x",
            Value::F64(42.0),
            letc(
                "ret",
                vec!["y".into()],
                halt("y"),
                appf("f", "ret", vec!["x".into()]),
            ),
        ),
    );
    let expected = letv(
        "x",
        Value::F64(42.0),
        letc(
            "ret",
            vec!["y".into()],
            halt("y"),
            letp("r", "+", vec!["x".into(), "x".into()], appc("ret", "r")),
        ),
    );
    assert_eq!(beta_func(&term).unwrap(), expected);
}

#[test]
fn call_of_unknown_function_is_left_alone() {
    let term = letv("x", Value::F64(1.0), appf("f", "k", vec!["x".into()]));
    assert_eq!(beta_func(&term).unwrap(), term);
}

#[test]
fn call_before_definition_is_not_expanded() {
    // A one-pass walk only knows functions defined on the path above.
    let term = letc(
        "j",
        vec!["z".into()],
        appf("f", "k", vec!["z".into()]),
        letf("f", "k2", vec!["p".into()], None, appc("k2", "p"), appc("j", "q")),
    );
    let reduced = beta_func(&term).unwrap();
    match &*reduced {
        Term::LetC { body, .. } => {
            assert!(matches!(&**body, Term::AppF { .. }));
        }
        other => panic!("unexpected term {:?}", other),
    }
}

#[test]
fn arity_mismatch_is_fatal() {
    let term = letf(
        "f",
        "k",
        vec!["a".into()],
        None,
        appc("k", "a"),
        appf("f", "ret", vec!["x".into(), "y".into()]),
    );
    let err = beta_func(&term).unwrap_err();
    assert!(matches!(err, CompilerError::CpsError(_)));
}
