//! Tests for the CPS translation.

use std::collections::HashSet;

use super::convert::ast_to_cps;
use super::verify::{verify, verify_open};
use super::{appc, appf, halt, letc, letp, letv, Term, TermRef, Value};
use crate::ast::{Expr, ExprBuilder};
use crate::error::CompilerError;
use crate::TypeTable;

fn cps(expr: &Expr) -> TermRef {
    ast_to_cps(expr, &TypeTable::new()).unwrap()
}

#[test]
fn literal_binds_then_halts() {
    let mut b = ExprBuilder::new();
    let expr = b.f64(1.5);
    assert_eq!(cps(&expr), letv("_v0", Value::F64(1.5), halt("_v0")));
}

#[test]
fn bare_identifier_halts_directly() {
    let mut b = ExprBuilder::new();
    let expr = b.var("x");
    let term = cps(&expr);
    assert_eq!(term, halt("x"));
    let free: HashSet<_> = ["x".to_string()].into_iter().collect();
    verify_open(&term, &free).unwrap();
}

#[test]
fn prim_names_arguments_left_to_right() {
    let mut b = ExprBuilder::new();
    let lhs = b.f64(23.0);
    let rhs = b.f64(42.0);
    let expr = b.add(lhs, rhs);
    let expected = letv(
        "_v1",
        Value::F64(23.0),
        letv(
            "_v2",
            Value::F64(42.0),
            letp("_v0", "+", vec!["_v1".into(), "_v2".into()], halt("_v0")),
        ),
    );
    assert_eq!(cps(&expr), expected);
}

#[test]
fn tuple_accumulates_fields_then_binds() {
    let mut b = ExprBuilder::new();
    let one = b.f64(1.0);
    let two = b.f64(2.0);
    let expr = b.tuple(vec![one, two]);
    let expected = letv(
        "_v1",
        Value::F64(1.0),
        letv(
            "_v2",
            Value::F64(2.0),
            letv("_v0", Value::Tuple(vec!["_v1".into(), "_v2".into()]), halt("_v0")),
        ),
    );
    assert_eq!(cps(&expr), expected);
}

#[test]
fn projection_becomes_lett() {
    let mut b = ExprBuilder::new();
    let t = b.var("t");
    let expr = b.project(1, t);
    match &*cps(&expr) {
        Term::LetT {
            name,
            field,
            tuple,
            rest,
        } => {
            assert_eq!(field, &1);
            assert_eq!(tuple, "t");
            assert_eq!(**rest, Term::Halt { name: name.clone() });
        }
        other => panic!("unexpected term {:?}", other),
    }
}

#[test]
fn application_wraps_caller_continuation() {
    let mut b = ExprBuilder::new();
    let f = b.var("f");
    let arg = b.f64(1.0);
    let expr = b.apply(f, vec![arg]);
    let expected = letv(
        "_v0",
        Value::F64(1.0),
        letc(
            "_v1",
            vec!["_v2".into()],
            halt("_v2"),
            appf("f", "_v1", vec!["_v0".into()]),
        ),
    );
    assert_eq!(cps(&expr), expected);
}

#[test]
fn lambda_returns_through_its_continuation() {
    let mut b = ExprBuilder::new();
    let body = b.var("x");
    let expr = b.lambda(&["x"], body);
    match &*cps(&expr) {
        Term::LetF {
            name,
            cont,
            params,
            ty,
            body,
            rest,
        } => {
            assert_eq!(params, &vec!["x".to_string()]);
            assert!(ty.is_none());
            assert_eq!(**body, *appc(cont.clone(), "x"));
            assert_eq!(**rest, Term::Halt { name: name.clone() });
        }
        other => panic!("unexpected term {:?}", other),
    }
}

#[test]
fn let_in_becomes_join_continuation() {
    let mut b = ExprBuilder::new();
    let value = b.f64(42.0);
    let body = b.var("a");
    let expr = b.let_in("a", value, body);
    let expected = letc(
        "_v0",
        vec!["a".into()],
        halt("a"),
        letv("_v1", Value::F64(42.0), appc("_v0", "_v1")),
    );
    assert_eq!(cps(&expr), expected);
}

#[test]
fn conditionals_are_rejected() {
    let mut b = ExprBuilder::new();
    let pred = b.boolean(true);
    let one = b.f64(1.0);
    let two = b.f64(2.0);
    let expr = b.cond(pred, one, two);
    let err = ast_to_cps(&expr, &TypeTable::new()).unwrap_err();
    assert!(matches!(err, CompilerError::CpsError(_)));
}

#[test]
fn closed_programs_translate_to_well_formed_terms() {
    let mut b = ExprBuilder::new();
    let one = b.f64(1.0);
    let two = b.f64(2.0);
    let three = b.f64(3.0);
    let value = b.tuple(vec![one, two, three]);
    let t = b.var("t");
    let projected = b.project(1, t);
    let shifted = {
        let offset = b.f64(10.0);
        b.add(projected, offset)
    };
    let expr = b.let_in("t", value, shifted);
    verify(&cps(&expr)).unwrap();

    let mut b = ExprBuilder::new();
    let x = b.var("x");
    let x2 = b.var("x");
    let body = b.add(x, x2);
    let func = b.lambda(&["x"], body);
    let arg = b.f64(42.0);
    let expr = b.apply(func, vec![arg]);
    verify(&cps(&expr)).unwrap();
}

#[test]
fn letf_carries_the_lambda_type() {
    use crate::types::{equivalent, f64_type, resolved, TypeKind};

    let mut b = ExprBuilder::new();
    let x = b.var("x");
    let x2 = b.var("x");
    let body = b.add(x, x2);
    let expr = b.lambda(&["x"], body);

    let converted = crate::Ast::new(expr).typecheck().unwrap().alpha_convert().to_cps().unwrap();
    match &*converted.term {
        Term::LetF { ty: Some(ty), .. } => match &*resolved(ty).unwrap() {
            TypeKind::Func(f) => {
                assert!(equivalent(&f.args[0], &f64_type()));
                assert!(equivalent(&f.result, &f64_type()));
            }
            other => panic!("expected a function type, got {}", other),
        },
        other => panic!("unexpected term {:?}", other),
    }
}
