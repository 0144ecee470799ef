//! The immutable configuration handle threaded into every stage.
//!
//! Grounded in `tsz-common::checker_options::CheckerOptions` for the "plain
//! struct, threaded by reference" shape, and in the original's `tak::Config`
//! (`include/config.hpp`) for the field set. The original makes `Config` a
//! process-wide "initialize once" singleton; this is instead threaded as
//! an immutable handle built once by the CLI collaborator and passed down
//! by reference to each stage — no global state.

use bitflags::bitflags;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogLevel {
    #[default]
    Disabled,
    Enabled,
    Trace,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OptLevel {
    #[default]
    O0,
    O1,
    O2,
}

bitflags! {
    /// Dump/behavior flag bits. These only affect what the CLI
    /// collaborator does with the result the front end hands back; the
    /// front end itself only consults `WARN_IS_ERR` (promotes warnings to
    /// errors) and `TIME_ACTIONS` (wraps each stage in a timed `tracing`
    /// span).
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ConfigFlags: u32 {
        const DUMP_IR      = 1 << 0;
        const DUMP_SYMBOLS = 1 << 1;
        const DUMP_AST     = 1 << 2;
        const DUMP_TYPES   = 1 << 3;
        const WARN_IS_ERR  = 1 << 4;
        const TIME_ACTIONS = 1 << 5;
    }
}

/// Compiler configuration, built once by the CLI collaborator and passed
/// by shared reference into the lexer/parser/post-parser/checker.
#[derive(Clone, Debug)]
pub struct CompilerOptions {
    pub input_file: String,
    pub output_file: String,
    pub arch: Option<String>,
    pub opt_level: OptLevel,
    pub log_level: LogLevel,
    pub flags: ConfigFlags,
    pub max_jobs: u16,
    pub max_error_count: u32,
}

impl CompilerOptions {
    #[must_use]
    pub fn new(input_file: impl Into<String>, output_file: impl Into<String>) -> Self {
        Self {
            input_file: input_file.into(),
            output_file: output_file.into(),
            arch: None,
            opt_level: OptLevel::O0,
            log_level: LogLevel::Disabled,
            flags: ConfigFlags::empty(),
            max_jobs: 1,
            max_error_count: crate::limits::DEFAULT_MAX_ERROR_COUNT,
        }
    }

    #[must_use]
    pub fn warn_is_error(&self) -> bool {
        self.flags.contains(ConfigFlags::WARN_IS_ERR)
    }
}
