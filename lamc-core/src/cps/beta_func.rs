//! Beta reduction of functions.
//!
//! Every call to a known function is inlined unconditionally: the body is
//! spliced at the call site with the parameters substituted by the
//! arguments and the return-continuation parameter substituted by the call
//! site's continuation. No size or recursion heuristic is applied; the
//! surface language cannot express recursion, so expansion terminates.

use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use super::dead_let::dead_let;
use super::substitute::{substitute, Substitution};
use super::{Term, TermRef, Variable};
use crate::bail_cps;
use crate::error::Result;

pub fn beta_func(term: &TermRef) -> Result<TermRef> {
    let mut pass = BetaFunc {
        functions: HashMap::new(),
        inlined: 0,
    };
    let reduced = pass.walk(term)?;
    debug!("beta_func inlined {} calls", pass.inlined);
    Ok(dead_let(&reduced))
}

#[derive(Clone)]
struct FuncDef {
    cont: Variable,
    params: Vec<Variable>,
    body: TermRef,
}

struct BetaFunc {
    functions: HashMap<Variable, FuncDef>,
    inlined: usize,
}

impl BetaFunc {
    fn walk(&mut self, term: &TermRef) -> Result<TermRef> {
        match &**term {
            Term::LetV { name, value, rest } => Ok(Rc::new(Term::LetV {
                name: name.clone(),
                value: value.clone(),
                rest: self.walk(rest)?,
            })),
            Term::LetT {
                name,
                field,
                tuple,
                rest,
            } => Ok(Rc::new(Term::LetT {
                name: name.clone(),
                field: *field,
                tuple: tuple.clone(),
                rest: self.walk(rest)?,
            })),
            Term::LetP {
                name,
                op,
                args,
                rest,
            } => Ok(Rc::new(Term::LetP {
                name: name.clone(),
                op: op.clone(),
                args: args.clone(),
                rest: self.walk(rest)?,
            })),
            Term::LetC {
                name,
                params,
                body,
                rest,
            } => Ok(Rc::new(Term::LetC {
                name: name.clone(),
                params: params.clone(),
                body: self.walk(body)?,
                rest: self.walk(rest)?,
            })),
            Term::LetF {
                name,
                cont,
                params,
                ty,
                body,
                rest,
            } => {
                let body = self.walk(body)?;
                self.functions.insert(
                    name.clone(),
                    FuncDef {
                        cont: cont.clone(),
                        params: params.clone(),
                        body: body.clone(),
                    },
                );
                Ok(Rc::new(Term::LetF {
                    name: name.clone(),
                    cont: cont.clone(),
                    params: params.clone(),
                    ty: ty.clone(),
                    body,
                    rest: self.walk(rest)?,
                }))
            }
            Term::AppF { func, cont, args } => match self.functions.get(func).cloned() {
                Some(def) => {
                    if def.params.len() != args.len() {
                        bail_cps!(
                            "function {} expects {} arguments, got {}",
                            func,
                            def.params.len(),
                            args.len()
                        );
                    }
                    self.inlined += 1;
                    let mut mapping = Substitution::new();
                    for (param, arg) in def.params.iter().zip(args) {
                        mapping.insert(param.clone(), arg.clone());
                    }
                    mapping.insert(def.cont.clone(), cont.clone());
                    Ok(substitute(&def.body, &mapping))
                }
                None => Ok(term.clone()),
            },
            Term::AppC { .. } | Term::Halt { .. } => Ok(term.clone()),
        }
    }
}
