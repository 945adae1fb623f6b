//! Continuation-passing-style intermediate representation.
//!
//! Every non-trivial expression is bound to a name by one of the `Let*`
//! forms; control transfer is explicit through `AppC`/`AppF`, and a
//! well-formed program ends in exactly one `Halt`. Terms are immutable and
//! shared structurally between pass input and output through `Rc`, so a
//! pass only allocates along the spine it actually rewrites.

pub mod convert;
pub mod verify;

pub mod substitute;

pub mod dead_let;

pub mod beta_cont;
pub mod beta_func;

pub mod prim_cse;
pub mod prim_simplify;

#[cfg(test)]
mod convert_tests;

#[cfg(test)]
mod beta_func_tests;


use std::rc::Rc;

use crate::types::Type;

pub type Variable = String;

/// Atoms bound by `LetV`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    F64(f64),
    Bool(bool),
    Tuple(Vec<Variable>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// Bind an atom.
    LetV {
        name: Variable,
        value: Value,
        rest: TermRef,
    },
    /// Bind a tuple projection.
    LetT {
        name: Variable,
        field: usize,
        tuple: Variable,
        rest: TermRef,
    },
    /// Bind the result of a primitive operation.
    LetP {
        name: Variable,
        op: String,
        args: Vec<Variable>,
        rest: TermRef,
    },
    /// Define a local continuation. Always one parameter.
    LetC {
        name: Variable,
        params: Vec<Variable>,
        body: TermRef,
        rest: TermRef,
    },
    /// Define a function with an explicit return-continuation parameter.
    /// `ty` carries the originating lambda's inferred type when available.
    LetF {
        name: Variable,
        cont: Variable,
        params: Vec<Variable>,
        ty: Option<Type>,
        body: TermRef,
        rest: TermRef,
    },
    /// Invoke a continuation with exactly one argument.
    AppC { cont: Variable, arg: Variable },
    /// Tail-call a function, passing its return continuation.
    AppF {
        func: Variable,
        cont: Variable,
        args: Vec<Variable>,
    },
    /// Terminal node; names the whole program's result.
    Halt { name: Variable },
}

pub type TermRef = Rc<Term>;

pub fn letv(name: impl Into<Variable>, value: Value, rest: TermRef) -> TermRef {
    Rc::new(Term::LetV {
        name: name.into(),
        value,
        rest,
    })
}

pub fn lett(field: usize, name: impl Into<Variable>, tuple: impl Into<Variable>, rest: TermRef) -> TermRef {
    Rc::new(Term::LetT {
        name: name.into(),
        field,
        tuple: tuple.into(),
        rest,
    })
}

pub fn letp(name: impl Into<Variable>, op: impl Into<String>, args: Vec<Variable>, rest: TermRef) -> TermRef {
    Rc::new(Term::LetP {
        name: name.into(),
        op: op.into(),
        args,
        rest,
    })
}

pub fn letc(name: impl Into<Variable>, params: Vec<Variable>, body: TermRef, rest: TermRef) -> TermRef {
    Rc::new(Term::LetC {
        name: name.into(),
        params,
        body,
        rest,
    })
}

pub fn letf(
    name: impl Into<Variable>,
    cont: impl Into<Variable>,
    params: Vec<Variable>,
    ty: Option<Type>,
    body: TermRef,
    rest: TermRef,
) -> TermRef {
    Rc::new(Term::LetF {
        name: name.into(),
        cont: cont.into(),
        params,
        ty,
        body,
        rest,
    })
}

pub fn appc(cont: impl Into<Variable>, arg: impl Into<Variable>) -> TermRef {
    Rc::new(Term::AppC {
        cont: cont.into(),
        arg: arg.into(),
    })
}

pub fn appf(func: impl Into<Variable>, cont: impl Into<Variable>, args: Vec<Variable>) -> TermRef {
    Rc::new(Term::AppF {
        func: func.into(),
        cont: cont.into(),
        args,
    })
}

pub fn halt(name: impl Into<Variable>) -> TermRef {
    Rc::new(Term::Halt { name: name.into() })
}
