//! Beta reduction of local continuations.
//!
//! Every application of a known local continuation is expanded exactly
//! once: the body is spliced in place with the parameter substituted by
//! the argument. Continuations that end up unused afterwards are stripped
//! by `dead_let`.

use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use super::dead_let::dead_let;
use super::substitute::{substitute, Substitution};
use super::{Term, TermRef, Variable};
use crate::bail_cps;
use crate::error::Result;

pub fn beta_cont(term: &TermRef) -> Result<TermRef> {
    let mut pass = BetaCont {
        continuations: HashMap::new(),
        inlined: 0,
    };
    let reduced = pass.walk(term)?;
    debug!("beta_cont inlined {} continuation calls", pass.inlined);
    Ok(dead_let(&reduced))
}

struct BetaCont {
    /// Known continuations: name -> (parameter, reduced body).
    continuations: HashMap<Variable, (Variable, TermRef)>,
    inlined: usize,
}

impl BetaCont {
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
            } => {
                if params.len() != 1 {
                    bail_cps!(
                        "continuation {} takes {} parameters, expected 1",
                        name,
                        params.len()
                    );
                }
                let body = self.walk(body)?;
                self.continuations.insert(name.clone(), (params[0].clone(), body.clone()));
                Ok(Rc::new(Term::LetC {
                    name: name.clone(),
                    params: params.clone(),
                    body,
                    rest: self.walk(rest)?,
                }))
            }
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
                body: self.walk(body)?,
                rest: self.walk(rest)?,
            })),
            Term::AppC { cont, arg } => match self.continuations.get(cont).cloned() {
                Some((param, body)) => {
                    self.inlined += 1;
                    let mut mapping = Substitution::new();
                    mapping.insert(param, arg.clone());
                    Ok(substitute(&body, &mapping))
                }
                None => Ok(term.clone()),
            },
            Term::AppF { .. } | Term::Halt { .. } => Ok(term.clone()),
        }
    }
}
