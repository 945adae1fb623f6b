//! One-pass translation from the surface AST to tail CPS.
//!
//! The translator threads a meta-continuation: a host-level function that
//! maps the variable naming a subexpression's value to the CPS term for
//! the rest of the program. The top-level continuation produces `Halt`.
//! Every binder introduced here is freshly generated from a per-converter
//! counter, so translation of an alpha-converted expression yields a term
//! whose binders are globally unique.

use log::debug;

use super::{appc, appf, halt, letc, letf, letp, lett, letv, TermRef, Value, Variable};
use crate::ast::{Expr, ExprKind};
use crate::bail_cps;
use crate::error::Result;
use crate::TypeTable;

/// Translate `expr` to a tail-CPS term.
///
/// `types` supplies function types for `LetF` nodes; an expression that was
/// never type checked translates fine, its functions just lose their
/// annotations.
pub fn ast_to_cps<'a>(expr: &'a Expr, types: &'a TypeTable) -> Result<TermRef> {
    let mut converter = Converter::new(types);
    let term = converter.convert(expr)?;
    debug!("cps translation allocated {} names", converter.counter);
    Ok(term)
}

/// "The rest of the program", as a function from the variable that names
/// the current value to the remaining term.
type MetaCont<'a> = Box<dyn FnOnce(&mut Converter<'a>, Variable) -> Result<TermRef> + 'a>;

/// Continuation for a sequence of named values (tuple fields, call
/// arguments).
type SeqCont<'a> = Box<dyn FnOnce(&mut Converter<'a>, Vec<Variable>) -> Result<TermRef> + 'a>;

pub struct Converter<'a> {
    types: &'a TypeTable,
    counter: u32,
}

impl<'a> Converter<'a> {
    pub fn new(types: &'a TypeTable) -> Self {
        Converter { types, counter: 0 }
    }

    pub fn convert(&mut self, expr: &'a Expr) -> Result<TermRef> {
        self.go(expr, Box::new(|_, name| Ok(halt(name))))
    }

    fn fresh(&mut self) -> Variable {
        let name = format!("_v{}", self.counter);
        self.counter += 1;
        name
    }

    fn go(&mut self, expr: &'a Expr, k: MetaCont<'a>) -> Result<TermRef> {
        match &expr.kind {
            ExprKind::FloatLiteral(value) => {
                let x = self.fresh();
                let rest = k(self, x.clone())?;
                Ok(letv(x, Value::F64(*value), rest))
            }
            ExprKind::BoolLiteral(value) => {
                let x = self.fresh();
                let rest = k(self, x.clone())?;
                Ok(letv(x, Value::Bool(*value), rest))
            }
            ExprKind::Identifier(name) => k(self, name.clone()),
            ExprKind::Tuple(fields) => {
                let x = self.fresh();
                self.seq(
                    fields,
                    Vec::new(),
                    Box::new(move |me, names| {
                        let rest = k(me, x.clone())?;
                        Ok(letv(x, Value::Tuple(names), rest))
                    }),
                )
            }
            ExprKind::Proj { field, tuple } => {
                let x = self.fresh();
                let field = *field;
                self.go(
                    tuple,
                    Box::new(move |me, source| {
                        let rest = k(me, x.clone())?;
                        Ok(lett(field, x, source, rest))
                    }),
                )
            }
            ExprKind::Prim { op, args } => {
                let x = self.fresh();
                let op = op.clone();
                self.seq(
                    args,
                    Vec::new(),
                    Box::new(move |me, names| {
                        let rest = k(me, x.clone())?;
                        Ok(letp(x, op, names, rest))
                    }),
                )
            }
            ExprKind::Application { func, args } => self.go(
                func,
                Box::new(move |me, func_name| {
                    me.seq(
                        args,
                        Vec::new(),
                        Box::new(move |me, arg_names| {
                            // The call's result is delivered by invoking a
                            // fresh continuation wrapping the caller's rest.
                            let ret = me.fresh();
                            let x = me.fresh();
                            let body = k(me, x.clone())?;
                            let call = appf(func_name, ret.clone(), arg_names);
                            Ok(letc(ret, vec![x], body, call))
                        }),
                    )
                }),
            ),
            ExprKind::Lambda(lambda) => {
                let func_name = self.fresh();
                let ret = self.fresh();
                let return_to = ret.clone();
                let body = self.go(
                    &lambda.body,
                    Box::new(move |_, result| Ok(appc(return_to, result))),
                )?;
                let ty = self.types.get(&expr.id).cloned();
                let rest = k(self, func_name.clone())?;
                Ok(letf(func_name, ret, lambda.params.clone(), ty, body, rest))
            }
            ExprKind::LetIn(let_in) => {
                // The body becomes a continuation taking the bound name;
                // the value is translated to deliver into it.
                let body = self.go(&let_in.body, k)?;
                let join = self.fresh();
                let deliver_to = join.clone();
                let value = self.go(
                    &let_in.value,
                    Box::new(move |_, result| Ok(appc(deliver_to, result))),
                )?;
                Ok(letc(join, vec![let_in.name.clone()], body, value))
            }
            ExprKind::If(_) => {
                bail_cps!("no CPS lowering for conditionals")
            }
        }
    }

    /// Translate `exprs` left to right, naming each value, then hand the
    /// collected names to `done`.
    fn seq(&mut self, exprs: &'a [Expr], mut acc: Vec<Variable>, done: SeqCont<'a>) -> Result<TermRef> {
        match exprs.split_first() {
            None => done(self, acc),
            Some((head, tail)) => self.go(
                head,
                Box::new(move |me, name| {
                    acc.push(name);
                    me.seq(tail, acc, done)
                }),
            ),
        }
    }
}
