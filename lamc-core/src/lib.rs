//! lamc-core: a small functional-language compiler core.
//!
//! The surface language is a typed lambda calculus with f64 and bool
//! scalars, tuples with positional projection, and the primitives `+`,
//! `-`, `*`. The middle end is a tail-CPS intermediate representation
//! with a suite of term-rewriting passes; the back end emits C-style
//! source text.

pub mod alpha;
pub mod ast;
pub mod codegen;
pub mod cps;
pub mod diags;
pub mod error;
pub mod scope;
pub mod types;


use std::collections::HashMap;
use std::marker::PhantomData;

use ast::{Expr, NodeId};
use cps::TermRef;
use error::Result;
use types::Type;

pub use alpha::alpha_convert;
pub use codegen::{generate_string, generate_target};
pub use cps::beta_cont::beta_cont;
pub use cps::beta_func::beta_func;
pub use cps::convert::ast_to_cps;
pub use cps::dead_let::{dead_let, used_symbols};
pub use cps::prim_cse::prim_cse;
pub use cps::prim_simplify::prim_simplify;
pub use cps::substitute::substitute;
pub use diags::{cps_to_sexp, to_sexp};
pub use types::checker::typecheck;

// =============================================================================
// Generic ID allocation
// =============================================================================

/// Generic counter for generating unique IDs.
///
/// The ID type must implement `From<u32>` to convert the raw counter value.
#[derive(Debug, Clone)]
pub struct IdSource<Id> {
    next_id: u32,
    _phantom: PhantomData<Id>,
}

impl<Id: From<u32>> IdSource<Id> {
    pub fn new() -> Self {
        IdSource {
            next_id: 0,
            _phantom: PhantomData,
        }
    }

    pub fn next_id(&mut self) -> Id {
        let id = Id::from(self.next_id);
        self.next_id += 1;
        id
    }
}

impl<Id: From<u32>> Default for IdSource<Id> {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps AST nodes to their inferred types.
pub type TypeTable = HashMap<NodeId, Type>;

// =============================================================================
// Typestate compiler pipeline
// =============================================================================
//
// Each struct represents a stage; methods consume `self` and return the
// next stage, enforcing valid ordering:
//
//   Ast::new(expr)
//     -> .typecheck()?      -> Typed
//     -> .alpha_convert()   -> Renamed
//     -> .to_cps()?         -> Converted   (verifies well-formedness)
//     -> .dead_let()        -> Pruned
//     -> .beta_cont()?      -> ContReduced
//     -> .beta_func()?      -> FuncReduced
//     -> .prim_cse()        -> Deduped
//     -> .prim_simplify()?  -> Folded
//     -> .generate()?       -> String

/// A surface expression, ready for the pipeline.
pub struct Ast {
    pub expr: Expr,
}

impl Ast {
    pub fn new(expr: Expr) -> Self {
        Ast { expr }
    }

    /// Infer types for every node.
    pub fn typecheck(self) -> Result<Typed> {
        let (ty, types) = types::checker::typecheck(&self.expr)?;
        Ok(Typed {
            expr: self.expr,
            ty,
            types,
        })
    }
}

/// Every node has an entry in the type table.
pub struct Typed {
    pub expr: Expr,
    pub ty: Type,
    pub types: TypeTable,
}

impl Typed {
    /// Rename every binder to a globally unique name. Node ids are
    /// preserved, so the type table remains valid.
    pub fn alpha_convert(self) -> Renamed {
        let expr = alpha::alpha_convert(&self.expr);
        Renamed {
            expr,
            ty: self.ty,
            types: self.types,
        }
    }
}

/// Binders are globally unique.
pub struct Renamed {
    pub expr: Expr,
    pub ty: Type,
    pub types: TypeTable,
}

impl Renamed {
    /// Translate to tail CPS and verify the result's well-formedness.
    pub fn to_cps(self) -> Result<Converted> {
        let term = cps::convert::ast_to_cps(&self.expr, &self.types)?;
        let free = ast::free_variables(&self.expr);
        cps::verify::verify_open(&term, &free)?;
        Ok(Converted { term })
    }
}

/// The program as a well-formed CPS term.
pub struct Converted {
    pub term: TermRef,
}

impl Converted {
    /// Strip unused bindings.
    pub fn dead_let(self) -> Pruned {
        Pruned {
            term: cps::dead_let::dead_let(&self.term),
        }
    }
}

/// Unused bindings have been removed.
pub struct Pruned {
    pub term: TermRef,
}

impl Pruned {
    /// Inline local continuations.
    pub fn beta_cont(self) -> Result<ContReduced> {
        Ok(ContReduced {
            term: cps::beta_cont::beta_cont(&self.term)?,
        })
    }
}

/// Local continuation calls have been expanded.
pub struct ContReduced {
    pub term: TermRef,
}

impl ContReduced {
    /// Inline functions, then run continuation inlining once more:
    /// substituting a call site's continuation for the callee's return
    /// parameter turns `AppC` nodes into redexes that were not visible
    /// before the functions were expanded.
    pub fn beta_func(self) -> Result<FuncReduced> {
        let inlined = cps::beta_func::beta_func(&self.term)?;
        Ok(FuncReduced {
            term: cps::beta_cont::beta_cont(&inlined)?,
        })
    }
}

/// Function calls have been expanded.
pub struct FuncReduced {
    pub term: TermRef,
}

impl FuncReduced {
    /// Deduplicate primitive applications.
    pub fn prim_cse(self) -> Deduped {
        Deduped {
            term: cps::prim_cse::prim_cse(&self.term),
        }
    }
}

/// Duplicate primitive applications share one binding.
pub struct Deduped {
    pub term: TermRef,
}

impl Deduped {
    /// Fold constant projections and primitive applications.
    pub fn prim_simplify(self) -> Result<Folded> {
        Ok(Folded {
            term: cps::prim_simplify::prim_simplify(&self.term)?,
        })
    }
}

/// Final stage: the residual term, ready for emission.
pub struct Folded {
    pub term: TermRef,
}

impl Folded {
    /// Emit target source for the residual term.
    pub fn generate(&self) -> Result<String> {
        codegen::generate_string(&self.term)
    }
}
