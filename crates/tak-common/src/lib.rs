//! Shared types for the tak compiler front end.
//!
//! This crate provides foundational types used by every later stage:
//! - Source locations (`SourceLocation`, byte offset + 1-based line)
//! - Diagnostics (`Diagnostic`, `DiagnosticSink`, `DiagnosticCategory`)
//! - Compiler limits (`limits`)
//! - `CompilerOptions`, the immutable configuration handle threaded into
//!   every stage
//! - `TakInternalError`, the small set of invariant violations that would
//!   have `panic()`'d in the original implementation

pub mod diagnostics;
pub mod error;
pub mod limits;
pub mod location;
pub mod options;

pub use diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticSink};
pub use error::{TakInternalError, TakResult};
pub use location::SourceLocation;
pub use options::{CompilerOptions, ConfigFlags, LogLevel, OptLevel};
