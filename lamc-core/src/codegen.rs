//! Target source emission.
//!
//! Walks a residual CPS term and writes C++-flavored source lines into a
//! caller-provided sink. The tree shape dictates emission directly: value,
//! projection and primitive bindings become `const` declarations, a
//! function definition opens a scope whose return continuation turns into
//! `return`, and residual control nodes are kept as commentary so the
//! output stays a faithful rendering of the term.

use std::fmt::Write;

use crate::cps::{Term, TermRef, Value, Variable};
use crate::error::Result;
use crate::types::{resolved, Type, TypeKind};
use crate::{bail_codegen, err_codegen};

/// Emit target source for `term` into `sink`.
pub fn generate_target<W: Write>(sink: &mut W, term: &TermRef) -> Result<()> {
    let mut emitter = Emitter {
        indent: 0,
        returns: Vec::new(),
    };
    emitter.emit(sink, term)
}

/// Emit target source for `term` into a fresh string.
pub fn generate_string(term: &TermRef) -> Result<String> {
    let mut out = String::new();
    generate_target(&mut out, term)?;
    Ok(out)
}

struct Emitter {
    indent: usize,
    /// Return continuations of the functions currently open, innermost
    /// last. An `AppC` on the innermost one is a `return`.
    returns: Vec<Variable>,
}

impl Emitter {
    fn line<W: Write>(&self, sink: &mut W, content: &str) -> Result<()> {
        writeln!(sink, "{}{}", "  ".repeat(self.indent), content).map_err(|e| err_codegen!("{}", e))
    }

    fn emit<W: Write>(&mut self, sink: &mut W, term: &TermRef) -> Result<()> {
        match &**term {
            Term::LetV { name, value, rest } => {
                self.line(sink, &format!("const auto {} = {};", name, render_value(value)))?;
                self.emit(sink, rest)
            }
            Term::LetT {
                name,
                field,
                tuple,
                rest,
            } => {
                self.line(sink, &format!("const auto {} = std::get<{}>({});", name, field, tuple))?;
                self.emit(sink, rest)
            }
            Term::LetP {
                name,
                op,
                args,
                rest,
            } => {
                if args.len() != 2 {
                    bail_codegen!("operator {} applied to {} arguments", op, args.len());
                }
                self.line(
                    sink,
                    &format!("const auto {} = {} {} {};", name, args[0], op, args[1]),
                )?;
                self.emit(sink, rest)
            }
            Term::LetF {
                name,
                cont,
                params,
                ty,
                body,
                rest,
            } => {
                let (param_types, result_type) = match ty {
                    Some(ty) => function_signature(ty)?,
                    None => (Vec::new(), "auto".to_string()),
                };
                let rendered: Vec<String> = params
                    .iter()
                    .enumerate()
                    .map(|(i, param)| {
                        let ty = param_types.get(i).cloned().unwrap_or_else(|| "auto".to_string());
                        format!("{} {}", ty, param)
                    })
                    .collect();
                self.line(
                    sink,
                    &format!("{} {}({}) {{", result_type, name, rendered.join(", ")),
                )?;
                self.indent += 1;
                self.returns.push(cont.clone());
                self.emit(sink, body)?;
                self.returns.pop();
                self.indent -= 1;
                self.line(sink, "}")?;
                self.emit(sink, rest)
            }
            Term::LetC {
                name,
                params,
                body,
                rest,
            } => {
                self.line(sink, &format!("// continuation {}({})", name, params.join(", ")))?;
                self.indent += 1;
                self.emit(sink, body)?;
                self.indent -= 1;
                self.emit(sink, rest)
            }
            Term::AppC { cont, arg } => {
                if self.returns.last() == Some(cont) {
                    self.line(sink, &format!("return {};", arg))
                } else {
                    self.line(sink, &format!("// continue {} with {}", cont, arg))
                }
            }
            Term::AppF { func, cont, args } => self.line(
                sink,
                &format!("// call {}({}) returning to {}", func, args.join(", "), cont),
            ),
            Term::Halt { name } => self.line(sink, &format!("// halt: {}", name)),
        }
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::F64(v) => format!("{:?}", v),
        Value::Bool(b) => format!("{}", b),
        Value::Tuple(fields) => format!("std::tuple{{{}}}", fields.join(", ")),
    }
}

/// Split a function type into rendered parameter types and return type.
fn function_signature(ty: &Type) -> Result<(Vec<String>, String)> {
    let head = resolved(ty)?;
    match &*head {
        TypeKind::Func(func) => {
            let mut params = Vec::with_capacity(func.args.len());
            for arg in &func.args {
                params.push(render_type(arg)?);
            }
            Ok((params, render_type(&func.result)?))
        }
        _ => bail_codegen!("{} is not a function type", head),
    }
}

fn render_type(ty: &Type) -> Result<String> {
    let head = resolved(ty)?;
    match &*head {
        TypeKind::F64 => Ok("double".to_string()),
        TypeKind::Bool => Ok("bool".to_string()),
        TypeKind::Var(_) => Ok("auto".to_string()),
        TypeKind::Tuple(tuple) => {
            let fields = tuple.fields.borrow().clone();
            let rendered = fields.iter().map(render_type).collect::<Result<Vec<_>>>()?;
            Ok(format!("std::tuple<{}>", rendered.join(", ")))
        }
        TypeKind::Func(_) => bail_codegen!("cannot express a function type in the target language"),
    }
}
