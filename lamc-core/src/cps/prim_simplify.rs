//! Constant folding over CPS terms.
//!
//! Tracks which names are known literals or tuples while walking. The
//! stacks are pushed on entering a binding's rest and popped on exit, so
//! knowledge follows the term's lexical structure. A projection out of a
//! known tuple whose field is a known literal becomes a `LetV`, and a
//! primitive applied to two known floats becomes its result. `dead_let`
//! sweeps the bindings the rewrites orphaned.

use std::rc::Rc;

use log::debug;

use super::dead_let::dead_let;
use super::{letv, Term, TermRef, Value, Variable};
use crate::bail_prim;
use crate::error::Result;

pub fn prim_simplify(term: &TermRef) -> Result<TermRef> {
    let mut pass = PrimSimplify::default();
    let folded = pass.visit(term)?;
    debug!("prim_simplify folded {} bindings", pass.folded);
    Ok(dead_let(&folded))
}

#[derive(Default)]
struct PrimSimplify {
    known_f64: Vec<(Variable, f64)>,
    known_bool: Vec<(Variable, bool)>,
    known_tuple: Vec<(Variable, Vec<Variable>)>,
    folded: usize,
}

impl PrimSimplify {
    fn find_f64(&self, name: &str) -> Option<f64> {
        self.known_f64.iter().rev().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    fn find_bool(&self, name: &str) -> Option<bool> {
        self.known_bool.iter().rev().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    fn find_tuple(&self, name: &str) -> Option<Vec<Variable>> {
        self.known_tuple.iter().rev().find(|(n, _)| n == name).map(|(_, fields)| fields.clone())
    }

    fn visit(&mut self, term: &TermRef) -> Result<TermRef> {
        match &**term {
            Term::LetV { name, value, rest } => {
                let rest = match value {
                    Value::F64(v) => {
                        self.known_f64.push((name.clone(), *v));
                        let rest = self.visit(rest)?;
                        self.known_f64.pop();
                        rest
                    }
                    Value::Bool(b) => {
                        self.known_bool.push((name.clone(), *b));
                        let rest = self.visit(rest)?;
                        self.known_bool.pop();
                        rest
                    }
                    Value::Tuple(fields) => {
                        self.known_tuple.push((name.clone(), fields.clone()));
                        let rest = self.visit(rest)?;
                        self.known_tuple.pop();
                        rest
                    }
                };
                Ok(letv(name.clone(), value.clone(), rest))
            }
            Term::LetT {
                name,
                field,
                tuple,
                rest,
            } => {
                if let Some(fields) = self.find_tuple(tuple) {
                    if let Some(element) = fields.get(*field) {
                        if let Some(value) = self.find_f64(element) {
                            self.known_f64.push((name.clone(), value));
                            let rest = self.visit(rest)?;
                            self.known_f64.pop();
                            self.folded += 1;
                            return Ok(letv(name.clone(), Value::F64(value), rest));
                        }
                        if let Some(value) = self.find_bool(element) {
                            self.known_bool.push((name.clone(), value));
                            let rest = self.visit(rest)?;
                            self.known_bool.pop();
                            self.folded += 1;
                            return Ok(letv(name.clone(), Value::Bool(value), rest));
                        }
                    }
                }
                Ok(Rc::new(Term::LetT {
                    name: name.clone(),
                    field: *field,
                    tuple: tuple.clone(),
                    rest: self.visit(rest)?,
                }))
            }
            Term::LetP {
                name,
                op,
                args,
                rest,
            } => {
                let lhs = args.first().and_then(|a| self.find_f64(a));
                let rhs = args.get(1).and_then(|a| self.find_f64(a));
                if let (Some(l), Some(r)) = (lhs, rhs) {
                    let value = match op.as_str() {
                        "+" => l + r,
                        "-" => l - r,
                        "*" => l * r,
                        other => bail_prim!("unknown operator: {}", other),
                    };
                    self.known_f64.push((name.clone(), value));
                    let rest = self.visit(rest)?;
                    self.known_f64.pop();
                    self.folded += 1;
                    return Ok(letv(name.clone(), Value::F64(value), rest));
                }
                if !matches!(op.as_str(), "+" | "-" | "*") {
                    bail_prim!("unknown operator: {}", op);
                }
                Ok(Rc::new(Term::LetP {
                    name: name.clone(),
                    op: op.clone(),
                    args: args.clone(),
                    rest: self.visit(rest)?,
                }))
            }
            Term::LetC {
                name,
                params,
                body,
                rest,
            } => Ok(Rc::new(Term::LetC {
                name: name.clone(),
                params: params.clone(),
                body: self.visit(body)?,
                rest: self.visit(rest)?,
            })),
            Term::LetF {
                name,
                cont,
                params,
                ty,
                body,
                rest,
            } => Ok(Rc::new(Term::LetF {
                name: name.clone(),
                cont: cont.clone(),
                params: params.clone(),
                ty: ty.clone(),
                body: self.visit(body)?,
                rest: self.visit(rest)?,
            })),
            Term::AppC { .. } | Term::AppF { .. } | Term::Halt { .. } => Ok(term.clone()),
        }
    }
}
