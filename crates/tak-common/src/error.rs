//! Internal invariant violations.
//!
//! The original implementation calls `panic()` (`include/panic.hpp`) when
//! an internal invariant is broken — a symbol index that must exist but
//! doesn't, a generic permutation missing its base. These stay fatal in
//! spirit (they indicate a front-end bug, not a user source error) but
//! are modeled as a `Result` error rather than a process abort, so a
//! caller (tests, the LSP-less CLI) can report them cleanly.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TakInternalError {
    #[error("internal parse-error: failed to lookup unique symbol with index {0}")]
    UnknownSymbolIndex(u32),

    #[error("internal parse-error: failed to lookup user type '{0}'")]
    UnknownUserType(String),

    #[error("internal parse-error: generic base for permutation '{0}' no longer exists")]
    MissingGenericBase(String),

    #[error("internal parse-error: scope stack underflow")]
    ScopeStackUnderflow,

    #[error("internal parse-error: lexer re-seek target out of bounds (offset {0} in a {1}-byte buffer)")]
    SeekOutOfBounds(u32, usize),

    #[error("internal parse-error: exceeded {0} while {1}")]
    LimitExceeded(u32, &'static str),
}

pub type TakResult<T> = Result<T, TakInternalError>;
