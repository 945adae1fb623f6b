//! Alpha conversion: rename every binder to a globally unique name.
//!
//! The environment is an assoc list used as a scope stack; lookups scan
//! from the innermost binding outward. Free identifiers fall through the
//! stack and keep their original names. Node ids are preserved, so a type
//! table built before the rename stays valid afterwards.

use log::debug;

use crate::ast::{Expr, ExprKind, IfExpr, LambdaExpr, LetInExpr};

pub fn alpha_convert(expr: &Expr) -> Expr {
    let mut pass = AlphaConvert {
        env: Vec::new(),
        counter: 0,
    };
    let converted = pass.convert(expr);
    debug!("alpha conversion allocated {} names", pass.counter);
    converted
}

struct AlphaConvert {
    /// Scope stack as an assoc list, innermost binding last.
    env: Vec<(String, String)>,
    counter: u32,
}

impl AlphaConvert {
    fn fresh(&mut self) -> String {
        let name = format!("_a{}", self.counter);
        self.counter += 1;
        name
    }

    fn find(&self, name: &str) -> Option<String> {
        self.env.iter().rev().find(|(original, _)| original == name).map(|(_, fresh)| fresh.clone())
    }

    fn convert(&mut self, expr: &Expr) -> Expr {
        let kind = match &expr.kind {
            ExprKind::FloatLiteral(value) => ExprKind::FloatLiteral(*value),
            ExprKind::BoolLiteral(value) => ExprKind::BoolLiteral(*value),
            ExprKind::Identifier(name) => {
                ExprKind::Identifier(self.find(name).unwrap_or_else(|| name.clone()))
            }
            ExprKind::Prim { op, args } => ExprKind::Prim {
                op: op.clone(),
                args: args.iter().map(|arg| self.convert(arg)).collect(),
            },
            ExprKind::Tuple(fields) => {
                ExprKind::Tuple(fields.iter().map(|field| self.convert(field)).collect())
            }
            ExprKind::Proj { field, tuple } => ExprKind::Proj {
                field: *field,
                tuple: Box::new(self.convert(tuple)),
            },
            // The value is converted before the binder exists, so the value
            // cannot see the new name.
            ExprKind::LetIn(let_in) => {
                let value = Box::new(self.convert(&let_in.value));
                let fresh = self.fresh();
                self.env.push((let_in.name.clone(), fresh.clone()));
                let body = Box::new(self.convert(&let_in.body));
                self.env.pop();
                ExprKind::LetIn(LetInExpr {
                    name: fresh,
                    annotation: let_in.annotation.clone(),
                    value,
                    body,
                })
            }
            ExprKind::Lambda(lambda) => {
                let mut params = Vec::with_capacity(lambda.params.len());
                for param in &lambda.params {
                    let fresh = self.fresh();
                    self.env.push((param.clone(), fresh.clone()));
                    params.push(fresh);
                }
                let body = Box::new(self.convert(&lambda.body));
                for _ in &lambda.params {
                    self.env.pop();
                }
                ExprKind::Lambda(LambdaExpr { params, body })
            }
            ExprKind::Application { func, args } => ExprKind::Application {
                func: Box::new(self.convert(func)),
                args: args.iter().map(|arg| self.convert(arg)).collect(),
            },
            ExprKind::If(if_expr) => ExprKind::If(IfExpr {
                condition: Box::new(self.convert(&if_expr.condition)),
                then_branch: Box::new(self.convert(&if_expr.then_branch)),
                else_branch: Box::new(self.convert(&if_expr.else_branch)),
            }),
        };
        Expr { id: expr.id, kind }
    }
}
