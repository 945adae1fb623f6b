//! Tests for type inference and unification.

use crate::ast::{Expr, ExprBuilder, ExprKind, NodeId};
use crate::error::CompilerError;
use crate::types::checker::typecheck;
use crate::types::{bool_type, equivalent, f64_type, resolved, TypeKind};

fn collect_ids(expr: &Expr, out: &mut Vec<NodeId>) {
    out.push(expr.id);
    match &expr.kind {
        ExprKind::FloatLiteral(_) | ExprKind::BoolLiteral(_) | ExprKind::Identifier(_) => {}
        ExprKind::Prim { args, .. } => args.iter().for_each(|a| collect_ids(a, out)),
        ExprKind::Tuple(fields) => fields.iter().for_each(|f| collect_ids(f, out)),
        ExprKind::Proj { tuple, .. } => collect_ids(tuple, out),
        ExprKind::LetIn(l) => {
            collect_ids(&l.value, out);
            collect_ids(&l.body, out);
        }
        ExprKind::Lambda(l) => collect_ids(&l.body, out),
        ExprKind::Application { func, args } => {
            collect_ids(func, out);
            args.iter().for_each(|a| collect_ids(a, out));
        }
        ExprKind::If(c) => {
            collect_ids(&c.condition, out);
            collect_ids(&c.then_branch, out);
            collect_ids(&c.else_branch, out);
        }
    }
}

#[test]
fn literal_add_is_f64() {
    let mut b = ExprBuilder::new();
    let lhs = b.f64(23.0);
    let rhs = b.f64(42.0);
    let expr = b.add(lhs, rhs);
    let (ty, _) = typecheck(&expr).unwrap();
    assert!(equivalent(&ty, &f64_type()));
}

#[test]
fn prim_rejects_mixed_operands() {
    let mut b = ExprBuilder::new();
    let lhs = b.f64(1.0);
    let rhs = b.boolean(true);
    let expr = b.add(lhs, rhs);
    let err = typecheck(&expr).unwrap_err();
    assert!(matches!(err, CompilerError::TypeError(_)));
    let message = err.to_string();
    assert!(message.contains("F64"), "message was: {}", message);
    assert!(message.contains("Bool"), "message was: {}", message);
}

#[test]
fn unknown_operator_is_illegal() {
    let mut b = ExprBuilder::new();
    let lhs = b.f64(1.0);
    let rhs = b.f64(2.0);
    let expr = b.prim("/", vec![lhs, rhs]);
    let err = typecheck(&expr).unwrap_err();
    assert!(matches!(err, CompilerError::IllegalPrim(_)));
}

#[test]
fn wrong_prim_arity_is_illegal() {
    let mut b = ExprBuilder::new();
    let only = b.f64(1.0);
    let expr = b.prim("+", vec![only]);
    let err = typecheck(&expr).unwrap_err();
    assert!(matches!(err, CompilerError::IllegalPrim(_)));
}

#[test]
fn tuple_of_literals_is_closed() {
    let mut b = ExprBuilder::new();
    let one = b.f64(1.0);
    let yes = b.boolean(true);
    let expr = b.tuple(vec![one, yes]);
    let (ty, _) = typecheck(&expr).unwrap();
    match &*resolved(&ty).unwrap() {
        TypeKind::Tuple(t) => {
            assert!(t.closed);
            let fields = t.fields.borrow().clone();
            assert_eq!(fields.len(), 2);
            assert!(equivalent(&fields[0], &f64_type()));
            assert!(equivalent(&fields[1], &bool_type()));
        }
        other => panic!("expected a tuple type, got {}", other),
    }
}

#[test]
fn projection_types_the_field() {
    let mut b = ExprBuilder::new();
    let one = b.f64(1.0);
    let yes = b.boolean(true);
    let three = b.f64(3.0);
    let value = b.tuple(vec![one, yes, three]);
    let scrutinee = b.var("t");
    let body = b.project(1, scrutinee);
    let expr = b.let_in("t", value, body);
    let (ty, _) = typecheck(&expr).unwrap();
    assert!(equivalent(&ty, &bool_type()));
}

#[test]
fn projection_extends_open_row() {
    // \sim. sim.2 infers an open tuple of arity >= 3 for the parameter,
    // with the projected field aliased to the result type.
    let mut b = ExprBuilder::new();
    let sim = b.var("sim");
    let body = b.project(2, sim);
    let expr = b.lambda(&["sim"], body);
    let (ty, _) = typecheck(&expr).unwrap();
    let func = resolved(&ty).unwrap();
    match &*func {
        TypeKind::Func(f) => {
            assert_eq!(f.args.len(), 1);
            let arg = resolved(&f.args[0]).unwrap();
            match &*arg {
                TypeKind::Tuple(t) => {
                    assert!(!t.closed);
                    let fields = t.fields.borrow().clone();
                    assert!(fields.len() >= 3);
                    assert!(equivalent(&fields[2], &f.result));
                }
                other => panic!("expected an open tuple, got {}", other),
            }
        }
        other => panic!("expected a function type, got {}", other),
    }
}

#[test]
fn repeated_projection_grows_the_open_row() {
    // \p. (p.0, p.3) forces the parameter row out to four fields.
    let mut b = ExprBuilder::new();
    let p = b.var("p");
    let first = b.project(0, p);
    let p2 = b.var("p");
    let fourth = b.project(3, p2);
    let body = b.tuple(vec![first, fourth]);
    let expr = b.lambda(&["p"], body);
    let (ty, _) = typecheck(&expr).unwrap();
    match &*resolved(&ty).unwrap() {
        TypeKind::Func(f) => match &*resolved(&f.args[0]).unwrap() {
            TypeKind::Tuple(t) => {
                assert!(!t.closed);
                assert_eq!(t.fields.borrow().len(), 4);
            }
            other => panic!("expected a tuple type, got {}", other),
        },
        other => panic!("expected a function type, got {}", other),
    }
}

#[test]
fn projection_beyond_closed_tuple_fails() {
    let mut b = ExprBuilder::new();
    let one = b.f64(1.0);
    let two = b.f64(2.0);
    let pair = b.tuple(vec![one, two]);
    let expr = b.project(3, pair);
    let err = typecheck(&expr).unwrap_err();
    assert!(matches!(err, CompilerError::TypeError(_)));
}

#[test]
fn applying_a_non_function_fails() {
    let mut b = ExprBuilder::new();
    let not_a_function = b.f64(1.0);
    let arg = b.f64(2.0);
    let expr = b.apply(not_a_function, vec![arg]);
    let err = typecheck(&expr).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("expected"), "message was: {}", message);
}

#[test]
fn application_arity_mismatch_fails() {
    let mut b = ExprBuilder::new();
    let x = b.var("x");
    let x2 = b.var("x");
    let body = b.add(x, x2);
    let func = b.lambda(&["x"], body);
    let one = b.f64(1.0);
    let two = b.f64(2.0);
    let expr = b.apply(func, vec![one, two]);
    let err = typecheck(&expr).unwrap_err();
    assert!(matches!(err, CompilerError::TypeError(_)));
}

#[test]
fn application_types_the_result() {
    let mut b = ExprBuilder::new();
    let x = b.var("x");
    let x2 = b.var("x");
    let body = b.add(x, x2);
    let func = b.lambda(&["x"], body);
    let arg = b.f64(42.0);
    let expr = b.apply(func, vec![arg]);
    let (ty, _) = typecheck(&expr).unwrap();
    assert!(equivalent(&ty, &f64_type()));
}

#[test]
fn let_annotation_unifies_with_body() {
    let mut b = ExprBuilder::new();
    let value = b.f64(42.0);
    let body = b.var("a");
    let expr = b.let_in_annotated("a", f64_type(), value, body);
    assert!(typecheck(&expr).is_ok());

    let mut b = ExprBuilder::new();
    let value = b.f64(42.0);
    let body = b.var("a");
    let expr = b.let_in_annotated("a", bool_type(), value, body);
    assert!(typecheck(&expr).is_err());
}

#[test]
fn free_identifier_binds_a_fresh_variable() {
    let mut b = ExprBuilder::new();
    let unknown = b.var("x");
    let unknown_id = unknown.id;
    let one = b.f64(1.0);
    let expr = b.add(unknown, one);
    let (ty, table) = typecheck(&expr).unwrap();
    assert!(equivalent(&ty, &f64_type()));
    // The use as a primitive operand pinned the free identifier to F64.
    let inferred = table.get(&unknown_id).unwrap();
    assert!(equivalent(inferred, &f64_type()));
}

#[test]
fn cond_requires_bool_predicate() {
    let mut b = ExprBuilder::new();
    let pred = b.f64(0.0);
    let one = b.f64(1.0);
    let two = b.f64(2.0);
    let expr = b.cond(pred, one, two);
    assert!(typecheck(&expr).is_err());
}

#[test]
fn cond_unifies_branches() {
    let mut b = ExprBuilder::new();
    let pred = b.boolean(false);
    let one = b.f64(1.0);
    let two = b.f64(2.0);
    let expr = b.cond(pred, one, two);
    let (ty, _) = typecheck(&expr).unwrap();
    assert!(equivalent(&ty, &f64_type()));

    let mut b = ExprBuilder::new();
    let pred = b.boolean(false);
    let one = b.f64(1.0);
    let yes = b.boolean(true);
    let expr = b.cond(pred, one, yes);
    assert!(typecheck(&expr).is_err());
}

#[test]
fn lambda_parameters_inferred_from_body() {
    let mut b = ExprBuilder::new();
    let x = b.var("x");
    let x2 = b.var("x");
    let body = b.add(x, x2);
    let expr = b.lambda(&["x"], body);
    let (ty, _) = typecheck(&expr).unwrap();
    match &*resolved(&ty).unwrap() {
        TypeKind::Func(f) => {
            assert_eq!(f.args.len(), 1);
            assert!(equivalent(&f.args[0], &f64_type()));
            assert!(equivalent(&f.result, &f64_type()));
        }
        other => panic!("expected a function type, got {}", other),
    }
}

#[test]
fn every_node_gets_an_annotation() {
    let mut b = ExprBuilder::new();
    let one = b.f64(1.0);
    let two = b.f64(2.0);
    let three = b.f64(3.0);
    let value = b.tuple(vec![one, two, three]);
    let t = b.var("t");
    let body = b.project(1, t);
    let expr = b.let_in("t", value, body);

    let (_, table) = typecheck(&expr).unwrap();
    let mut ids = Vec::new();
    collect_ids(&expr, &mut ids);
    for id in ids {
        assert!(table.contains_key(&id), "missing annotation for node {:?}", id);
    }
}
