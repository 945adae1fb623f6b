//! Dead-binding elimination.

use std::collections::HashSet;
use std::rc::Rc;

use log::debug;

use super::{Term, TermRef, Value, Variable};

/// Collect every variable that occurs in use position.
///
/// Binder names do not count as uses of themselves; a binder shows up here
/// only when something downstream references it.
pub fn used_symbols(term: &TermRef) -> HashSet<Variable> {
    let mut used = HashSet::new();
    collect(term, &mut used);
    used
}

fn collect(term: &Term, used: &mut HashSet<Variable>) {
    match term {
        Term::LetV { value, rest, .. } => {
            if let Value::Tuple(fields) = value {
                used.extend(fields.iter().cloned());
            }
            collect(rest, used);
        }
        Term::LetT { tuple, rest, .. } => {
            used.insert(tuple.clone());
            collect(rest, used);
        }
        Term::LetP { args, rest, .. } => {
            used.extend(args.iter().cloned());
            collect(rest, used);
        }
        Term::LetC { body, rest, .. } => {
            collect(body, used);
            collect(rest, used);
        }
        Term::LetF { body, rest, .. } => {
            collect(body, used);
            collect(rest, used);
        }
        Term::AppC { cont, arg } => {
            used.insert(cont.clone());
            used.insert(arg.clone());
        }
        Term::AppF { func, cont, args } => {
            used.insert(func.clone());
            used.insert(cont.clone());
            used.extend(args.iter().cloned());
        }
        Term::Halt { name } => {
            used.insert(name.clone());
        }
    }
}

/// Remove every binding whose name is never used, then repeat: dropping a
/// binding can strand the bindings only it referenced. Stops at the first
/// sweep that removes nothing.
pub fn dead_let(term: &TermRef) -> TermRef {
    let mut current = term.clone();
    loop {
        let used = used_symbols(&current);
        let mut removed = 0usize;
        current = sweep(&current, &used, &mut removed);
        if removed == 0 {
            return current;
        }
        debug!("dead_let removed {} bindings", removed);
    }
}

fn sweep(term: &TermRef, used: &HashSet<Variable>, removed: &mut usize) -> TermRef {
    match &**term {
        Term::LetV { name, value, rest } => {
            if !used.contains(name) {
                *removed += 1;
                return sweep(rest, used, removed);
            }
            Rc::new(Term::LetV {
                name: name.clone(),
                value: value.clone(),
                rest: sweep(rest, used, removed),
            })
        }
        Term::LetT {
            name,
            field,
            tuple,
            rest,
        } => {
            if !used.contains(name) {
                *removed += 1;
                return sweep(rest, used, removed);
            }
            Rc::new(Term::LetT {
                name: name.clone(),
                field: *field,
                tuple: tuple.clone(),
                rest: sweep(rest, used, removed),
            })
        }
        Term::LetP {
            name,
            op,
            args,
            rest,
        } => {
            if !used.contains(name) {
                *removed += 1;
                return sweep(rest, used, removed);
            }
            Rc::new(Term::LetP {
                name: name.clone(),
                op: op.clone(),
                args: args.clone(),
                rest: sweep(rest, used, removed),
            })
        }
        Term::LetC {
            name,
            params,
            body,
            rest,
        } => {
            if !used.contains(name) {
                *removed += 1;
                return sweep(rest, used, removed);
            }
            Rc::new(Term::LetC {
                name: name.clone(),
                params: params.clone(),
                body: sweep(body, used, removed),
                rest: sweep(rest, used, removed),
            })
        }
        Term::LetF {
            name,
            cont,
            params,
            ty,
            body,
            rest,
        } => {
            if !used.contains(name) {
                *removed += 1;
                return sweep(rest, used, removed);
            }
            Rc::new(Term::LetF {
                name: name.clone(),
                cont: cont.clone(),
                params: params.clone(),
                ty: ty.clone(),
                body: sweep(body, used, removed),
                rest: sweep(rest, used, removed),
            })
        }
        Term::AppC { .. } | Term::AppF { .. } | Term::Halt { .. } => term.clone(),
    }
}
