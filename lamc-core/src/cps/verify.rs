//! Structural invariants of well-formed CPS terms.
//!
//! A violation means the producing pass has a bug, so failures are fatal.

use std::collections::HashSet;

use super::{Term, TermRef, Value, Variable};
use crate::bail_cps;
use crate::error::Result;

/// Check well-formedness of a closed term:
/// - every variable in use position is bound by an enclosing binder or
///   parameter list,
/// - the term contains exactly one `Halt`,
/// - every local continuation takes exactly one parameter.
pub fn verify(term: &TermRef) -> Result<()> {
    verify_open(term, &HashSet::new())
}

/// Like [`verify`], but allows the given names to occur unbound. Used for
/// terms translated from expressions with free variables.
pub fn verify_open(term: &TermRef, free: &HashSet<Variable>) -> Result<()> {
    let mut bound = Vec::new();
    let mut halts = 0usize;
    check(term, free, &mut bound, &mut halts)?;
    if halts != 1 {
        bail_cps!("expected exactly one halt, found {}", halts);
    }
    Ok(())
}

fn check(
    term: &Term,
    free: &HashSet<Variable>,
    bound: &mut Vec<Variable>,
    halts: &mut usize,
) -> Result<()> {
    match term {
        Term::LetV { name, value, rest } => {
            if let Value::Tuple(fields) = value {
                for field in fields {
                    check_used(field, free, bound)?;
                }
            }
            bound.push(name.clone());
            check(rest, free, bound, halts)?;
            bound.pop();
        }
        Term::LetT { name, tuple, rest, .. } => {
            check_used(tuple, free, bound)?;
            bound.push(name.clone());
            check(rest, free, bound, halts)?;
            bound.pop();
        }
        Term::LetP { name, args, rest, .. } => {
            for arg in args {
                check_used(arg, free, bound)?;
            }
            bound.push(name.clone());
            check(rest, free, bound, halts)?;
            bound.pop();
        }
        Term::LetC {
            name,
            params,
            body,
            rest,
        } => {
            if params.len() != 1 {
                bail_cps!("continuation {} takes {} parameters, expected 1", name, params.len());
            }
            bound.push(name.clone());
            bound.extend(params.iter().cloned());
            check(body, free, bound, halts)?;
            for _ in params {
                bound.pop();
            }
            check(rest, free, bound, halts)?;
            bound.pop();
        }
        Term::LetF {
            name,
            cont,
            params,
            body,
            rest,
            ..
        } => {
            bound.push(name.clone());
            bound.push(cont.clone());
            bound.extend(params.iter().cloned());
            check(body, free, bound, halts)?;
            for _ in params {
                bound.pop();
            }
            bound.pop();
            check(rest, free, bound, halts)?;
            bound.pop();
        }
        Term::AppC { cont, arg } => {
            check_used(cont, free, bound)?;
            check_used(arg, free, bound)?;
        }
        Term::AppF { func, cont, args } => {
            check_used(func, free, bound)?;
            check_used(cont, free, bound)?;
            for arg in args {
                check_used(arg, free, bound)?;
            }
        }
        Term::Halt { name } => {
            check_used(name, free, bound)?;
            *halts += 1;
        }
    }
    Ok(())
}

fn check_used(name: &Variable, free: &HashSet<Variable>, bound: &[Variable]) -> Result<()> {
    if bound.iter().any(|b| b == name) || free.contains(name) {
        Ok(())
    } else {
        bail_cps!("unbound variable {}", name)
    }
}
