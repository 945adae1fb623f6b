//! Type representation for the surface language.
//!
//! Types form a DAG of reference-counted nodes shared between AST
//! annotations and the checker's scopes. Unification mutates exactly two
//! things in place, both behind `RefCell`s: the forward `alias` edge of an
//! inference variable, and the field row of an open tuple. Everything else
//! is immutable.

pub mod checker;

#[cfg(test)]
mod checker_tests;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::bail_type;
use crate::error::Result;

pub type Type = Rc<TypeKind>;

#[derive(Debug, Clone)]
pub enum TypeKind {
    F64,
    Bool,
    Tuple(TupleType),
    Func(FuncType),
    Var(VarType),
}

#[derive(Debug, Clone)]
pub struct TupleType {
    pub fields: RefCell<Vec<Type>>,
    /// A closed row has fixed arity; an open row may be extended by
    /// unification to accommodate projections.
    pub closed: bool,
}

#[derive(Debug, Clone)]
pub struct FuncType {
    pub args: Vec<Type>,
    pub result: Type,
}

#[derive(Debug, Clone)]
pub struct VarType {
    pub name: String,
    /// Union-find forward edge, written during unification.
    pub alias: RefCell<Option<Type>>,
}

pub fn f64_type() -> Type {
    Rc::new(TypeKind::F64)
}

pub fn bool_type() -> Type {
    Rc::new(TypeKind::Bool)
}

/// A closed tuple type with the given field types.
pub fn tuple(fields: Vec<Type>) -> Type {
    Rc::new(TypeKind::Tuple(TupleType {
        fields: RefCell::new(fields),
        closed: true,
    }))
}

/// An open tuple type; unification may grow its row.
pub fn open_tuple(fields: Vec<Type>) -> Type {
    Rc::new(TypeKind::Tuple(TupleType {
        fields: RefCell::new(fields),
        closed: false,
    }))
}

pub fn function(args: Vec<Type>, result: Type) -> Type {
    Rc::new(TypeKind::Func(FuncType { args, result }))
}

pub fn var(name: impl Into<String>) -> Type {
    Rc::new(TypeKind::Var(VarType {
        name: name.into(),
        alias: RefCell::new(None),
    }))
}

/// Follow the alias chain of `ty` to its terminal head.
///
/// Unification performs no occurs check, so a chain can be made cyclic;
/// the walk detects the cycle and fails instead of spinning. Path
/// compression is applied: every variable on the chain ends up pointing
/// directly at the head.
pub fn resolved(ty: &Type) -> Result<Type> {
    let mut chain: Vec<Type> = Vec::new();
    let mut current = ty.clone();
    loop {
        let next = match &*current {
            TypeKind::Var(v) => {
                let seen = chain
                    .iter()
                    .any(|link| matches!(&**link, TypeKind::Var(u) if u.name == v.name));
                if seen {
                    bail_type!("cyclic type variable chain through {}", v.name);
                }
                match v.alias.borrow().clone() {
                    Some(target) => target,
                    None => break,
                }
            }
            _ => break,
        };
        chain.push(current);
        current = next;
    }
    for link in &chain {
        if let TypeKind::Var(v) = &**link {
            if !Rc::ptr_eq(link, &current) {
                *v.alias.borrow_mut() = Some(current.clone());
            }
        }
    }
    Ok(current)
}

/// Structural equality after full alias resolution.
///
/// Variables compare by name, open and closed rows compare by their fields
/// alone, and a cyclic alias chain compares unequal to everything. Types
/// made structurally cyclic through a tuple row (possible without an
/// occurs check) compare unequal once the depth cap is hit.
pub fn equivalent(lhs: &Type, rhs: &Type) -> bool {
    equivalent_at(lhs, rhs, 0)
}

fn equivalent_at(lhs: &Type, rhs: &Type, depth: usize) -> bool {
    if depth > MAX_TYPE_DEPTH {
        return false;
    }
    let a = match resolved(lhs) {
        Ok(t) => t,
        Err(_) => return false,
    };
    let b = match resolved(rhs) {
        Ok(t) => t,
        Err(_) => return false,
    };
    match (&*a, &*b) {
        (TypeKind::F64, TypeKind::F64) => true,
        (TypeKind::Bool, TypeKind::Bool) => true,
        (TypeKind::Var(x), TypeKind::Var(y)) => x.name == y.name,
        (TypeKind::Tuple(x), TypeKind::Tuple(y)) => {
            let xs = x.fields.borrow().clone();
            let ys = y.fields.borrow().clone();
            xs.len() == ys.len() && xs.iter().zip(&ys).all(|(l, r)| equivalent_at(l, r, depth + 1))
        }
        (TypeKind::Func(x), TypeKind::Func(y)) => {
            x.args.len() == y.args.len()
                && x.args.iter().zip(&y.args).all(|(l, r)| equivalent_at(l, r, depth + 1))
                && equivalent_at(&x.result, &y.result, depth + 1)
        }
        _ => false,
    }
}

impl PartialEq for TypeKind {
    fn eq(&self, other: &Self) -> bool {
        equivalent(&Rc::new(self.clone()), &Rc::new(other.clone()))
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_type(self, f, 0)
    }
}

// A term produced without an occurs check can tie a tuple row back into
// itself; the depth cap keeps rendering of such a type finite.
const MAX_TYPE_DEPTH: usize = 64;

fn fmt_type(ty: &TypeKind, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    if depth > MAX_TYPE_DEPTH {
        return write!(f, "...");
    }
    match ty {
        TypeKind::F64 => write!(f, "F64"),
        TypeKind::Bool => write!(f, "Bool"),
        TypeKind::Tuple(t) => {
            let fields = t.fields.borrow().clone();
            write!(f, "(")?;
            for (i, field) in fields.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                fmt_type(field, f, depth + 1)?;
            }
            write!(f, ")")
        }
        TypeKind::Func(func) => {
            write!(f, "(")?;
            for (i, arg) in func.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                fmt_type(arg, f, depth + 1)?;
            }
            write!(f, ") -> ")?;
            fmt_type(&func.result, f, depth + 1)
        }
        TypeKind::Var(v) => {
            let alias = v.alias.borrow().clone();
            match alias {
                Some(target) => fmt_type(&target, f, depth + 1),
                None => write!(f, "{}", v.name),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_follows_alias_chains() {
        let a = var("a");
        let b = var("b");
        if let TypeKind::Var(v) = &*a {
            *v.alias.borrow_mut() = Some(b.clone());
        }
        if let TypeKind::Var(v) = &*b {
            *v.alias.borrow_mut() = Some(f64_type());
        }
        let head = resolved(&a).unwrap();
        assert!(matches!(&*head, TypeKind::F64));
        // Path compression points `a` straight at the head.
        if let TypeKind::Var(v) = &*a {
            let target = v.alias.borrow().clone().unwrap();
            assert!(matches!(&*target, TypeKind::F64));
        }
    }

    #[test]
    fn resolved_reports_cyclic_chains() {
        let a = var("a");
        let b = var("b");
        if let TypeKind::Var(v) = &*a {
            *v.alias.borrow_mut() = Some(b.clone());
        }
        if let TypeKind::Var(v) = &*b {
            *v.alias.borrow_mut() = Some(a.clone());
        }
        assert!(resolved(&a).is_err());
    }

    #[test]
    fn equivalence_resolves_before_comparing() {
        let a = var("a");
        if let TypeKind::Var(v) = &*a {
            *v.alias.borrow_mut() = Some(f64_type());
        }
        assert!(equivalent(&a, &f64_type()));
        assert!(!equivalent(&a, &bool_type()));
    }

    #[test]
    fn equivalence_compares_rows_field_by_field() {
        let lhs = tuple(vec![f64_type(), bool_type()]);
        let rhs = open_tuple(vec![f64_type(), bool_type()]);
        let shorter = tuple(vec![f64_type()]);
        assert!(equivalent(&lhs, &rhs));
        assert!(!equivalent(&lhs, &shorter));
    }

    #[test]
    fn display_renders_through_aliases() {
        let a = var("a");
        if let TypeKind::Var(v) = &*a {
            *v.alias.borrow_mut() = Some(f64_type());
        }
        let func = function(vec![a, bool_type()], f64_type());
        assert_eq!(func.to_string(), "(F64, Bool) -> F64");
    }
}
