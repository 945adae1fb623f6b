//! Error types for the compiler pipeline.
//!
//! Errors are never recovered mid-pipeline: a pass that fails aborts the
//! whole compilation and the driver reports the message and exits.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CompilerError>;

#[derive(Debug, Clone, Error)]
pub enum CompilerError {
    /// Unification failure, application arity mismatch, or a non-function
    /// in call position. The message embeds both printed types and, when
    /// available, an S-expression rendering of the offending node.
    #[error("type error: {0}")]
    TypeError(String),

    /// Unknown primitive operator or wrong primitive arity.
    #[error("illegal primitive: {0}")]
    IllegalPrim(String),

    /// Broken CPS invariant, or a construct the translator does not lower.
    #[error("cps error: {0}")]
    CpsError(String),

    /// The emitter met a type it cannot render in the target language.
    #[error("codegen error: {0}")]
    CodegenError(String),
}

/// Construct a `CompilerError::TypeError` with a formatted message.
#[macro_export]
macro_rules! err_type {
    ($($arg:tt)*) => {
        $crate::error::CompilerError::TypeError(format!($($arg)*))
    };
}

/// Return early with a `CompilerError::TypeError`.
#[macro_export]
macro_rules! bail_type {
    ($($arg:tt)*) => {
        return Err($crate::err_type!($($arg)*))
    };
}

/// Construct a `CompilerError::IllegalPrim` with a formatted message.
#[macro_export]
macro_rules! err_prim {
    ($($arg:tt)*) => {
        $crate::error::CompilerError::IllegalPrim(format!($($arg)*))
    };
}

/// Return early with a `CompilerError::IllegalPrim`.
#[macro_export]
macro_rules! bail_prim {
    ($($arg:tt)*) => {
        return Err($crate::err_prim!($($arg)*))
    };
}

/// Construct a `CompilerError::CpsError` with a formatted message.
#[macro_export]
macro_rules! err_cps {
    ($($arg:tt)*) => {
        $crate::error::CompilerError::CpsError(format!($($arg)*))
    };
}

/// Return early with a `CompilerError::CpsError`.
#[macro_export]
macro_rules! bail_cps {
    ($($arg:tt)*) => {
        return Err($crate::err_cps!($($arg)*))
    };
}

/// Construct a `CompilerError::CodegenError` with a formatted message.
#[macro_export]
macro_rules! err_codegen {
    ($($arg:tt)*) => {
        $crate::error::CompilerError::CodegenError(format!($($arg)*))
    };
}

/// Return early with a `CompilerError::CodegenError`.
#[macro_export]
macro_rules! bail_codegen {
    ($($arg:tt)*) => {
        return Err($crate::err_codegen!($($arg)*))
    };
}
