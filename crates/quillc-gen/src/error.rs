//! Fatal lowering errors.
//!
//! The base spec draws a line between *recoverable* parse diagnostics
//! (collected on a `Handler`, see `quillc-util::diagnostic`) and *fatal*
//! lowering errors: a reference to an undefined name, a call to an unknown
//! function, or an arity mismatch. These abort lowering of the containing
//! expression rather than being collected — there is no recovery substitute
//! for "which LLVM value does this identifier mean".

use quillc_util::Symbol;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodeGenError {
    #[error("undefined name '{0}'")]
    UndefinedName(Symbol),

    #[error("call to unknown function '{0}'")]
    UnknownFunction(Symbol),

    #[error("'{callee}' expects {expected} argument(s), found {found}")]
    ArityMismatch {
        callee: Symbol,
        expected: usize,
        found: usize,
    },

    #[error("unknown type '{0}'")]
    UnknownType(Symbol),

    #[error("'{0}' is not an object type")]
    NotAnObject(Symbol),

    #[error("object type '{object}' has no field '{field}'")]
    UnknownField { object: Symbol, field: Symbol },

    #[error("LLVM builder operation failed: {0}")]
    LlvmOperationFailed(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, CodeGenError>;

impl From<inkwell::builder::BuilderError> for CodeGenError {
    fn from(e: inkwell::builder::BuilderError) -> Self {
        CodeGenError::LlvmOperationFailed(e.to_string())
    }
}
