//! Surface AST of the source language.
//!
//! Expressions carry a `NodeId` so inferred types can be attached through a
//! side table instead of threading mutable slots through the tree. All
//! construction goes through [`ExprBuilder`], which owns the id counter.

use std::collections::HashSet;

use crate::types::Type;
use crate::IdSource;

/// Operators accepted by `Prim` nodes.
pub const PRIM_OPS: &[&str] = &["+", "-", "*"];

/// Unique identifier for AST nodes.
/// Used to look up inferred types in the type table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl From<u32> for NodeId {
    fn from(value: u32) -> Self {
        NodeId(value)
    }
}

/// Counter for generating unique node ids.
pub type NodeCounter = IdSource<NodeId>;

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    FloatLiteral(f64),
    BoolLiteral(bool),
    Identifier(String),
    /// Primitive operation; always exactly two arguments.
    Prim { op: String, args: Vec<Expr> },
    Tuple(Vec<Expr>),
    /// Projection of a tuple field by position.
    Proj { field: usize, tuple: Box<Expr> },
    LetIn(LetInExpr),
    Lambda(LambdaExpr),
    Application { func: Box<Expr>, args: Vec<Expr> },
    If(IfExpr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LetInExpr {
    pub name: String,
    /// Optional type annotation, unified with the body's type.
    pub annotation: Option<Type>,
    pub value: Box<Expr>,
    pub body: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LambdaExpr {
    /// Parameter names; locally distinct.
    pub params: Vec<String>,
    pub body: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfExpr {
    pub condition: Box<Expr>,
    pub then_branch: Box<Expr>,
    pub else_branch: Box<Expr>,
}

/// Builder for surface expressions.
///
/// Owns the node counter so every constructed node gets a unique id.
#[derive(Debug, Default)]
pub struct ExprBuilder {
    ids: NodeCounter,
}

impl ExprBuilder {
    pub fn new() -> Self {
        ExprBuilder {
            ids: NodeCounter::new(),
        }
    }

    fn mk(&mut self, kind: ExprKind) -> Expr {
        Expr {
            id: self.ids.next_id(),
            kind,
        }
    }

    pub fn f64(&mut self, value: f64) -> Expr {
        self.mk(ExprKind::FloatLiteral(value))
    }

    pub fn boolean(&mut self, value: bool) -> Expr {
        self.mk(ExprKind::BoolLiteral(value))
    }

    pub fn var(&mut self, name: &str) -> Expr {
        self.mk(ExprKind::Identifier(name.to_string()))
    }

    pub fn tuple(&mut self, fields: Vec<Expr>) -> Expr {
        self.mk(ExprKind::Tuple(fields))
    }

    pub fn project(&mut self, field: usize, tuple: Expr) -> Expr {
        self.mk(ExprKind::Proj {
            field,
            tuple: Box::new(tuple),
        })
    }

    pub fn prim(&mut self, op: &str, args: Vec<Expr>) -> Expr {
        self.mk(ExprKind::Prim {
            op: op.to_string(),
            args,
        })
    }

    pub fn add(&mut self, lhs: Expr, rhs: Expr) -> Expr {
        self.prim("+", vec![lhs, rhs])
    }

    pub fn sub(&mut self, lhs: Expr, rhs: Expr) -> Expr {
        self.prim("-", vec![lhs, rhs])
    }

    pub fn mul(&mut self, lhs: Expr, rhs: Expr) -> Expr {
        self.prim("*", vec![lhs, rhs])
    }

    pub fn lambda(&mut self, params: &[&str], body: Expr) -> Expr {
        self.mk(ExprKind::Lambda(LambdaExpr {
            params: params.iter().map(|p| p.to_string()).collect(),
            body: Box::new(body),
        }))
    }

    pub fn apply(&mut self, func: Expr, args: Vec<Expr>) -> Expr {
        self.mk(ExprKind::Application {
            func: Box::new(func),
            args,
        })
    }

    pub fn let_in(&mut self, name: &str, value: Expr, body: Expr) -> Expr {
        self.mk(ExprKind::LetIn(LetInExpr {
            name: name.to_string(),
            annotation: None,
            value: Box::new(value),
            body: Box::new(body),
        }))
    }

    pub fn let_in_annotated(&mut self, name: &str, annotation: Type, value: Expr, body: Expr) -> Expr {
        self.mk(ExprKind::LetIn(LetInExpr {
            name: name.to_string(),
            annotation: Some(annotation),
            value: Box::new(value),
            body: Box::new(body),
        }))
    }

    pub fn cond(&mut self, condition: Expr, then_branch: Expr, else_branch: Expr) -> Expr {
        self.mk(ExprKind::If(IfExpr {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        }))
    }

    /// Sugar: `let name = tuple.field in body`.
    pub fn pi(&mut self, name: &str, field: usize, tuple: Expr, body: Expr) -> Expr {
        let value = self.project(field, tuple);
        self.let_in(name, value, body)
    }

    /// Sugar: `let name = \params. body in rest`.
    pub fn defn(&mut self, name: &str, params: &[&str], body: Expr, rest: Expr) -> Expr {
        let value = self.lambda(params, body);
        self.let_in(name, value, rest)
    }
}

/// The set of identifiers that occur free in `expr`.
pub fn free_variables(expr: &Expr) -> HashSet<String> {
    let mut free = HashSet::new();
    let mut bound = Vec::new();
    collect_free(expr, &mut bound, &mut free);
    free
}

fn collect_free(expr: &Expr, bound: &mut Vec<String>, free: &mut HashSet<String>) {
    match &expr.kind {
        ExprKind::FloatLiteral(_) | ExprKind::BoolLiteral(_) => {}
        ExprKind::Identifier(name) => {
            if !bound.iter().any(|b| b == name) {
                free.insert(name.clone());
            }
        }
        ExprKind::Prim { args, .. } => {
            for arg in args {
                collect_free(arg, bound, free);
            }
        }
        ExprKind::Tuple(fields) => {
            for field in fields {
                collect_free(field, bound, free);
            }
        }
        ExprKind::Proj { tuple, .. } => collect_free(tuple, bound, free),
        ExprKind::LetIn(let_in) => {
            collect_free(&let_in.value, bound, free);
            bound.push(let_in.name.clone());
            collect_free(&let_in.body, bound, free);
            bound.pop();
        }
        ExprKind::Lambda(lambda) => {
            for param in &lambda.params {
                bound.push(param.clone());
            }
            collect_free(&lambda.body, bound, free);
            for _ in &lambda.params {
                bound.pop();
            }
        }
        ExprKind::Application { func, args } => {
            collect_free(func, bound, free);
            for arg in args {
                collect_free(arg, bound, free);
            }
        }
        ExprKind::If(if_expr) => {
            collect_free(&if_expr.condition, bound, free);
            collect_free(&if_expr.then_branch, bound, free);
            collect_free(&if_expr.else_branch, bound, free);
        }
    }
}
