//! Diagnostic rendering for AST expressions and CPS terms.
//!
//! Both printers produce an S-expression form meant for debugging output
//! and error context. The format is not designed to be parsed back.

use std::fmt::{self, Write};

use itertools::Itertools;

use crate::ast::{Expr, ExprKind};
use crate::cps::{Term, Value};

/// Write `expr` as an S-expression.
pub fn to_sexp<W: Write>(out: &mut W, expr: &Expr) -> fmt::Result {
    let mut printer = SExpPrinter::new(out, 0, "");
    printer.lead()?;
    printer.write_expr(expr)
}

/// Render `expr` as an S-expression string.
pub fn expr_to_sexp(expr: &Expr) -> String {
    let mut out = String::new();
    let _ = to_sexp(&mut out, expr);
    out
}

/// Render `expr` with every line prefixed, for embedding in error messages.
pub fn sexp_with_prefix(expr: &Expr, indent: usize, prefix: &str) -> String {
    let mut out = String::new();
    let mut printer = SExpPrinter::new(&mut out, indent, prefix);
    let _ = printer.lead();
    let _ = printer.write_expr(expr);
    out
}

struct SExpPrinter<'w, W> {
    out: &'w mut W,
    indent: usize,
    prefix: String,
}

impl<'w, W: Write> SExpPrinter<'w, W> {
    fn new(out: &'w mut W, indent: usize, prefix: &str) -> Self {
        SExpPrinter {
            out,
            indent,
            prefix: prefix.to_string(),
        }
    }

    fn lead(&mut self) -> fmt::Result {
        write!(self.out, "{}{}", self.prefix, " ".repeat(self.indent))
    }

    fn pad(&mut self) -> fmt::Result {
        write!(self.out, "\n{}{}", self.prefix, " ".repeat(self.indent))
    }

    fn write_expr(&mut self, expr: &Expr) -> fmt::Result {
        match &expr.kind {
            ExprKind::FloatLiteral(value) => write!(self.out, "{}", value),
            ExprKind::BoolLiteral(value) => write!(self.out, "{}", value),
            ExprKind::Identifier(name) => write!(self.out, "{}", name),
            ExprKind::Prim { op, args } => {
                write!(self.out, "({}", op)?;
                for arg in args {
                    write!(self.out, " ")?;
                    self.write_expr(arg)?;
                }
                write!(self.out, ")")
            }
            ExprKind::Tuple(fields) => {
                write!(self.out, "(tuple")?;
                for field in fields {
                    write!(self.out, " ")?;
                    self.write_expr(field)?;
                }
                write!(self.out, ")")
            }
            ExprKind::Proj { field, tuple } => {
                write!(self.out, "(pi-{} ", field)?;
                self.write_expr(tuple)?;
                write!(self.out, ")")
            }
            ExprKind::LetIn(let_in) => {
                write!(self.out, "(let ({}", let_in.name)?;
                if let Some(annotation) = &let_in.annotation {
                    write!(self.out, " : {}", annotation)?;
                }
                write!(self.out, " ")?;
                self.write_expr(&let_in.value)?;
                write!(self.out, ")")?;
                self.indent += 4;
                self.pad()?;
                self.write_expr(&let_in.body)?;
                write!(self.out, ")")?;
                self.indent -= 4;
                Ok(())
            }
            ExprKind::Lambda(lambda) => {
                write!(self.out, "(lambda ({})", lambda.params.iter().join(" "))?;
                self.indent += 4;
                self.pad()?;
                self.write_expr(&lambda.body)?;
                write!(self.out, ")")?;
                self.indent -= 4;
                Ok(())
            }
            ExprKind::Application { func, args } => {
                write!(self.out, "(")?;
                self.write_expr(func)?;
                for arg in args {
                    write!(self.out, " ")?;
                    self.write_expr(arg)?;
                }
                write!(self.out, ")")
            }
            ExprKind::If(if_expr) => {
                write!(self.out, "(if ")?;
                self.write_expr(&if_expr.condition)?;
                self.indent += 4;
                self.pad()?;
                self.write_expr(&if_expr.then_branch)?;
                self.pad()?;
                self.write_expr(&if_expr.else_branch)?;
                write!(self.out, ")")?;
                self.indent -= 4;
                Ok(())
            }
        }
    }
}

/// Write a CPS term as an S-expression.
pub fn cps_to_sexp<W: Write>(out: &mut W, term: &Term) -> fmt::Result {
    let mut printer = CpsPrinter { out, indent: 0 };
    printer.lead()?;
    printer.write_term(term)
}

/// Render a CPS term as an S-expression string.
pub fn term_to_sexp(term: &Term) -> String {
    let mut out = String::new();
    let _ = cps_to_sexp(&mut out, term);
    out
}

struct CpsPrinter<'w, W> {
    out: &'w mut W,
    indent: usize,
}

impl<'w, W: Write> CpsPrinter<'w, W> {
    fn lead(&mut self) -> fmt::Result {
        write!(self.out, "{}", " ".repeat(self.indent))
    }

    fn pad(&mut self) -> fmt::Result {
        write!(self.out, "\n{}", " ".repeat(self.indent))
    }

    fn write_term(&mut self, term: &Term) -> fmt::Result {
        match term {
            Term::LetV { name, value, rest } => {
                write!(self.out, "(let-value ({} ", name)?;
                self.write_value(value)?;
                write!(self.out, ")")?;
                self.indent += 4;
                self.pad()?;
                self.write_term(rest)?;
                write!(self.out, ")")?;
                self.indent -= 4;
                Ok(())
            }
            Term::LetT {
                name,
                field,
                tuple,
                rest,
            } => {
                write!(self.out, "(pi-{} {} {}", field, name, tuple)?;
                self.indent += 4;
                self.pad()?;
                self.write_term(rest)?;
                write!(self.out, ")")?;
                self.indent -= 4;
                Ok(())
            }
            Term::LetP {
                name,
                op,
                args,
                rest,
            } => {
                write!(self.out, "(let-prim ({} ({} {}))", name, op, args.iter().join(" "))?;
                self.indent += 4;
                self.pad()?;
                self.write_term(rest)?;
                write!(self.out, ")")?;
                self.indent -= 4;
                Ok(())
            }
            Term::LetC {
                name,
                params,
                body,
                rest,
            } => {
                write!(self.out, "(let-cont ({} ({}))", name, params.iter().join(" "))?;
                self.indent += 4;
                self.pad()?;
                self.write_term(body)?;
                self.pad()?;
                self.write_term(rest)?;
                write!(self.out, ")")?;
                self.indent -= 4;
                Ok(())
            }
            Term::LetF {
                name,
                cont,
                params,
                body,
                rest,
                ..
            } => {
                write!(self.out, "(let-func {} {} ({})", name, cont, params.iter().join(" "))?;
                self.indent += 4;
                self.pad()?;
                self.write_term(body)?;
                self.pad()?;
                self.write_term(rest)?;
                write!(self.out, ")")?;
                self.indent -= 4;
                Ok(())
            }
            Term::AppC { cont, arg } => write!(self.out, "(apply-cont {} {})", cont, arg),
            Term::AppF { func, cont, args } => {
                write!(self.out, "(apply-func {} {} {})", func, cont, args.iter().join(" "))
            }
            Term::Halt { name } => write!(self.out, "(halt {})", name),
        }
    }

    fn write_value(&mut self, value: &Value) -> fmt::Result {
        match value {
            Value::F64(v) => write!(self.out, "{}", v),
            Value::Bool(b) => write!(self.out, "{}", b),
            Value::Tuple(fields) => write!(self.out, "({})", fields.iter().join(" ")),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", term_to_sexp(self))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::F64(v) => write!(f, "{}", v),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Tuple(fields) => write!(f, "({})", fields.iter().join(" ")),
        }
    }
}
