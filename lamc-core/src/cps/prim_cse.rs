//! Common-subexpression elimination over primitive applications.
//!
//! A single walk value-numbers every `LetP`: the first binding of an
//! operator applied to a given argument list names the value, and each
//! later identical binding is scheduled for replacement. The collected
//! substitution is applied once after the walk and the stranded bindings
//! are swept by `dead_let`.

use indexmap::IndexMap;
use log::debug;

use super::dead_let::dead_let;
use super::substitute::{substitute, Substitution};
use super::{Term, TermRef, Variable};

pub fn prim_cse(term: &TermRef) -> TermRef {
    let mut pass = PrimCse {
        numbered: IndexMap::new(),
        replaced: Substitution::new(),
    };
    pass.visit(term);
    if pass.replaced.is_empty() {
        return term.clone();
    }
    debug!("prim_cse replaced {} bindings", pass.replaced.len());
    dead_let(&substitute(term, &pass.replaced))
}

struct PrimCse {
    /// Canonical key `"op:arg1:arg2"` -> the first binder with that value.
    numbered: IndexMap<String, Variable>,
    replaced: Substitution,
}

impl PrimCse {
    /// Key for a primitive application. Argument names are routed through
    /// the pending substitution so chains of duplicates converge in one
    /// walk and the pass is idempotent.
    fn key(&self, op: &str, args: &[Variable]) -> String {
        let mut key = op.to_string();
        for arg in args {
            key.push(':');
            key.push_str(self.replaced.get(arg).unwrap_or(arg));
        }
        key
    }

    fn visit(&mut self, term: &Term) {
        match term {
            Term::LetP {
                name,
                op,
                args,
                rest,
            } => {
                let key = self.key(op, args);
                match self.numbered.get(&key) {
                    Some(earlier) => {
                        self.replaced.insert(name.clone(), earlier.clone());
                    }
                    None => {
                        self.numbered.insert(key, name.clone());
                    }
                }
                self.visit(rest);
            }
            Term::LetV { rest, .. } | Term::LetT { rest, .. } => self.visit(rest),
            Term::LetC { body, rest, .. } | Term::LetF { body, rest, .. } => {
                self.visit(body);
                self.visit(rest);
            }
            Term::AppC { .. } | Term::AppF { .. } | Term::Halt { .. } => {}
        }
    }
}
