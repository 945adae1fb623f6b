//! Variable-for-variable substitution over CPS terms.
//!
//! Only use positions are rewritten, including the field names carried by
//! a `LetV`-bound tuple. Binders are left untouched: names are globally
//! unique after translation, so substitution cannot capture.

use std::collections::HashMap;
use std::rc::Rc;

use super::{Term, TermRef, Value, Variable};

pub type Substitution = HashMap<Variable, Variable>;

pub fn substitute(term: &TermRef, mapping: &Substitution) -> TermRef {
    if mapping.is_empty() {
        return term.clone();
    }
    walk(term, mapping)
}

fn replace(name: &Variable, mapping: &Substitution) -> Variable {
    mapping.get(name).cloned().unwrap_or_else(|| name.clone())
}

fn walk(term: &TermRef, mapping: &Substitution) -> TermRef {
    match &**term {
        Term::LetV { name, value, rest } => {
            let value = match value {
                Value::Tuple(fields) => {
                    Value::Tuple(fields.iter().map(|f| replace(f, mapping)).collect())
                }
                other => other.clone(),
            };
            Rc::new(Term::LetV {
                name: name.clone(),
                value,
                rest: walk(rest, mapping),
            })
        }
        Term::LetT {
            name,
            field,
            tuple,
            rest,
        } => Rc::new(Term::LetT {
            name: name.clone(),
            field: *field,
            tuple: replace(tuple, mapping),
            rest: walk(rest, mapping),
        }),
        Term::LetP {
            name,
            op,
            args,
            rest,
        } => Rc::new(Term::LetP {
            name: name.clone(),
            op: op.clone(),
            args: args.iter().map(|a| replace(a, mapping)).collect(),
            rest: walk(rest, mapping),
        }),
        Term::LetC {
            name,
            params,
            body,
            rest,
        } => Rc::new(Term::LetC {
            name: name.clone(),
            params: params.clone(),
            body: walk(body, mapping),
            rest: walk(rest, mapping),
        }),
        Term::LetF {
            name,
            cont,
            params,
            ty,
            body,
            rest,
        } => Rc::new(Term::LetF {
            name: name.clone(),
            cont: cont.clone(),
            params: params.clone(),
            ty: ty.clone(),
            body: walk(body, mapping),
            rest: walk(rest, mapping),
        }),
        Term::AppC { cont, arg } => Rc::new(Term::AppC {
            cont: replace(cont, mapping),
            arg: replace(arg, mapping),
        }),
        Term::AppF { func, cont, args } => Rc::new(Term::AppF {
            func: replace(func, mapping),
            cont: replace(cont, mapping),
            args: args.iter().map(|a| replace(a, mapping)).collect(),
        }),
        Term::Halt { name } => Rc::new(Term::Halt {
            name: replace(name, mapping),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::super::{appc, halt, letp, letv, Value};
    use super::*;

    fn mapping(pairs: &[(&str, &str)]) -> Substitution {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn rewrites_uses_but_not_binders() {
        let term = letp("x", "+", vec!["a".into(), "b".into()], halt("x"));
        let out = substitute(&term, &mapping(&[("a", "c"), ("x", "should_not_apply")]));
        match &*out {
            Term::LetP { name, args, rest, .. } => {
                assert_eq!(name, "x");
                assert_eq!(args, &vec!["c".to_string(), "b".to_string()]);
                assert_eq!(**rest, Term::Halt { name: "x".into() });
            }
            other => panic!("unexpected term {:?}", other),
        }
    }

    #[test]
    fn rewrites_tuple_fields_in_letv() {
        let term = letv("t", Value::Tuple(vec!["a".into(), "b".into()]), halt("t"));
        let out = substitute(&term, &mapping(&[("b", "c")]));
        match &*out {
            Term::LetV {
                value: Value::Tuple(fields),
                ..
            } => assert_eq!(fields, &vec!["a".to_string(), "c".to_string()]),
            other => panic!("unexpected term {:?}", other),
        }
    }

    #[test]
    fn disjoint_substitutions_commute() {
        let term = letp("x", "*", vec!["a".into(), "b".into()], appc("k", "x"));
        let first = mapping(&[("a", "c")]);
        let second = mapping(&[("b", "d")]);
        let composed: Substitution = first.iter().chain(second.iter()).map(|(k, v)| (k.clone(), v.clone())).collect();

        let one_way = substitute(&substitute(&term, &first), &second);
        let other_way = substitute(&substitute(&term, &second), &first);
        let at_once = substitute(&term, &composed);
        assert_eq!(one_way, other_way);
        assert_eq!(one_way, at_once);
    }
}
