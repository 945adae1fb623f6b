//! Constraint-based type inference with destructive unification.
//!
//! The checker walks the AST once, allocating a fresh inference variable
//! wherever a type is not yet known and unifying as constraints appear.
//! Unification writes forward `alias` edges into variables (a union-find
//! chain) and may extend open tuple rows in place. Every visited node gets
//! an entry in the returned type table.

use log::debug;

use super::{bool_type, equivalent, f64_type, function, open_tuple, resolved, tuple, var, Type, TypeKind};
use crate::ast::{Expr, ExprKind, PRIM_OPS};
use crate::diags;
use crate::error::{CompilerError, Result};
use crate::scope::ScopeStack;
use crate::{bail_prim, err_type, TypeTable};

/// Infer the type of `expr`.
///
/// Returns the expression's type together with a table assigning a type to
/// every node. Free identifiers are not an error: each one binds a fresh
/// inference variable in the outermost scope, so open program fragments
/// stay typeable.
pub fn typecheck(expr: &Expr) -> Result<(Type, TypeTable)> {
    TypeChecker::new().check(expr)
}

pub struct TypeChecker {
    scopes: ScopeStack<Type>,
    table: TypeTable,
    var_counter: u32,
}

impl Default for TypeChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeChecker {
    pub fn new() -> Self {
        TypeChecker {
            scopes: ScopeStack::new(),
            table: TypeTable::new(),
            var_counter: 0,
        }
    }

    pub fn check(mut self, expr: &Expr) -> Result<(Type, TypeTable)> {
        let ty = self.infer(expr)?;
        debug!("typecheck allocated {} inference variables", self.var_counter);
        Ok((ty, self.table))
    }

    fn fresh(&mut self) -> Type {
        let ty = var(format!("_t{}", self.var_counter));
        self.var_counter += 1;
        ty
    }

    fn infer(&mut self, expr: &Expr) -> Result<Type> {
        let ty = match &expr.kind {
            ExprKind::FloatLiteral(_) => f64_type(),
            ExprKind::BoolLiteral(_) => bool_type(),
            ExprKind::Identifier(name) => match self.scopes.lookup(name) {
                Some(ty) => ty.clone(),
                None => {
                    let ty = self.fresh();
                    self.scopes.insert_global(name.clone(), ty.clone());
                    ty
                }
            },
            ExprKind::Prim { op, args } => {
                if !PRIM_OPS.contains(&op.as_str()) {
                    bail_prim!("unknown operator: {}", op);
                }
                if args.len() != 2 {
                    bail_prim!("operator {} expects 2 arguments, got {}", op, args.len());
                }
                for arg in args {
                    let ty_arg = self.infer(arg)?;
                    self.unify(&ty_arg, &f64_type(), Some(expr))?;
                }
                f64_type()
            }
            ExprKind::Tuple(fields) => {
                let mut field_types = Vec::with_capacity(fields.len());
                for field in fields {
                    field_types.push(self.infer(field)?);
                }
                tuple(field_types)
            }
            ExprKind::Proj { field, tuple: tup } => {
                let ty_tuple = self.infer(tup)?;
                let row: Vec<Type> = (0..=*field).map(|_| self.fresh()).collect();
                let open = open_tuple(row);
                self.unify(&ty_tuple, &open, Some(expr))?;
                let field_ty = match &*open {
                    TypeKind::Tuple(t) => t.fields.borrow()[*field].clone(),
                    _ => unreachable!("open_tuple constructs a tuple"),
                };
                field_ty
            }
            ExprKind::Application { func, args } => {
                let ty_func = resolved(&self.infer(func)?)?;
                let func_ty = match &*ty_func {
                    TypeKind::Func(f) => f,
                    _ => {
                        return Err(self.type_error(
                            &format!("Got {} where a function was expected", ty_func),
                            Some(expr),
                        ))
                    }
                };
                if func_ty.args.len() != args.len() {
                    return Err(self.type_error(
                        &format!(
                            "Function expects {} arguments, got {}",
                            func_ty.args.len(),
                            args.len()
                        ),
                        Some(expr),
                    ));
                }
                for (param_ty, arg) in func_ty.args.iter().zip(args) {
                    let ty_arg = self.infer(arg)?;
                    self.unify(param_ty, &ty_arg, Some(expr))?;
                }
                func_ty.result.clone()
            }
            ExprKind::LetIn(let_in) => {
                let ty_value = self.infer(&let_in.value)?;
                self.scopes.push_scope();
                self.scopes.insert(let_in.name.clone(), ty_value);
                let ty_body = self.infer(&let_in.body)?;
                self.scopes.pop_scope();
                if let Some(annotation) = &let_in.annotation {
                    self.unify(annotation, &ty_body, Some(expr))?;
                }
                ty_body
            }
            ExprKind::Lambda(lambda) => {
                self.scopes.push_scope();
                let mut params = Vec::with_capacity(lambda.params.len());
                for param in &lambda.params {
                    let ty = self.fresh();
                    self.scopes.insert(param.clone(), ty.clone());
                    params.push(ty);
                }
                let ty_body = self.infer(&lambda.body)?;
                self.scopes.pop_scope();
                function(params, ty_body)
            }
            ExprKind::If(if_expr) => {
                let ty_pred = self.infer(&if_expr.condition)?;
                self.unify(&ty_pred, &bool_type(), Some(expr))?;
                let ty_then = self.infer(&if_expr.then_branch)?;
                let ty_else = self.infer(&if_expr.else_branch)?;
                self.unify(&ty_then, &ty_else, Some(expr))?;
                ty_then
            }
        };
        self.table.insert(expr.id, ty.clone());
        Ok(ty)
    }

    /// Make `lhs` and `rhs` equal, writing alias edges and extending open
    /// tuple rows as needed.
    fn unify(&mut self, lhs: &Type, rhs: &Type, ctx: Option<&Expr>) -> Result<()> {
        let a = resolved(lhs)?;
        let b = resolved(rhs)?;
        if equivalent(&a, &b) {
            return Ok(());
        }
        if let TypeKind::Var(v) = &*a {
            *v.alias.borrow_mut() = Some(b.clone());
            return Ok(());
        }
        if let TypeKind::Var(v) = &*b {
            *v.alias.borrow_mut() = Some(a.clone());
            return Ok(());
        }
        match (&*a, &*b) {
            (TypeKind::Tuple(tuple_a), TypeKind::Tuple(tuple_b)) => {
                let size_a = tuple_a.fields.borrow().len();
                let size_b = tuple_b.fields.borrow().len();
                if size_a < size_b && !tuple_a.closed {
                    let fresh: Vec<Type> = (size_a..size_b).map(|_| self.fresh()).collect();
                    tuple_a.fields.borrow_mut().extend(fresh);
                }
                if size_b < size_a && !tuple_b.closed {
                    let fresh: Vec<Type> = (size_b..size_a).map(|_| self.fresh()).collect();
                    tuple_b.fields.borrow_mut().extend(fresh);
                }
                let fields_a = tuple_a.fields.borrow().clone();
                let fields_b = tuple_b.fields.borrow().clone();
                if fields_a.len() != fields_b.len() {
                    return Err(self.unify_error(&a, &b, ctx));
                }
                for (l, r) in fields_a.iter().zip(&fields_b) {
                    self.unify(l, r, ctx)?;
                }
                Ok(())
            }
            (TypeKind::Func(func_a), TypeKind::Func(func_b)) => {
                if func_a.args.len() != func_b.args.len() {
                    return Err(self.unify_error(&a, &b, ctx));
                }
                for (l, r) in func_a.args.iter().zip(&func_b.args) {
                    self.unify(l, r, ctx)?;
                }
                self.unify(&func_a.result, &func_b.result, ctx)
            }
            _ => Err(self.unify_error(&a, &b, ctx)),
        }
    }

    fn unify_error(&self, lhs: &Type, rhs: &Type, ctx: Option<&Expr>) -> CompilerError {
        self.type_error(&format!("Cannot unify types {} and {}", lhs, rhs), ctx)
    }

    fn type_error(&self, message: &str, ctx: Option<&Expr>) -> CompilerError {
        match ctx {
            Some(expr) => err_type!("{}\n{}", message, diags::sexp_with_prefix(expr, 2, "  |")),
            None => err_type!("{}", message),
        }
    }
}
