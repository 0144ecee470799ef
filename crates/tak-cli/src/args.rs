//! Command-line surface. Grounded in `tsz-cli::args::CliArgs`'s use of
//! `clap::Parser` for the shape, narrowed to the flags `EXTERNAL
//! INTERFACES` names for this front end: an input/output file pair, an
//! architecture string, an optimization level, a log level, the dump/
//! behavior flag bits, and a max job count.

use std::fmt;

use clap::{Parser, ValueEnum};

use tak_common::{CompilerOptions, ConfigFlags, LogLevel, OptLevel};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OptLevelArg {
    #[default]
    O0,
    O1,
    O2,
}

impl fmt::Display for OptLevelArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::O0 => "o0",
            Self::O1 => "o1",
            Self::O2 => "o2",
        })
    }
}

impl From<OptLevelArg> for OptLevel {
    fn from(value: OptLevelArg) -> Self {
        match value {
            OptLevelArg::O0 => OptLevel::O0,
            OptLevelArg::O1 => OptLevel::O1,
            OptLevelArg::O2 => OptLevel::O2,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogLevelArg {
    #[default]
    Disabled,
    Enabled,
    Trace,
}

impl fmt::Display for LogLevelArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disabled => "disabled",
            Self::Enabled => "enabled",
            Self::Trace => "trace",
        })
    }
}

impl From<LogLevelArg> for LogLevel {
    fn from(value: LogLevelArg) -> Self {
        match value {
            LogLevelArg::Disabled => LogLevel::Disabled,
            LogLevelArg::Enabled => LogLevel::Enabled,
            LogLevelArg::Trace => LogLevel::Trace,
        }
    }
}

/// CLI arguments for the `tak` binary.
#[derive(Parser, Debug)]
#[command(name = "tak", version, about = "tak compiler front end")]
pub struct CliArgs {
    /// Root source file to compile.
    pub input: String,

    /// Path the code-generation collaborator should eventually write to.
    /// Accepted and stored; this front end never opens it.
    #[arg(short = 'o', long, default_value = "a.out")]
    pub output: String,

    /// Target architecture string, passed through to the (unimplemented)
    /// back end.
    #[arg(long)]
    pub arch: Option<String>,

    /// Optimization level.
    #[arg(short = 'O', long = "opt-level", value_enum, default_value_t = OptLevelArg::O0)]
    pub opt_level: OptLevelArg,

    /// Logging verbosity.
    #[arg(long = "log-level", value_enum, default_value_t = LogLevelArg::Disabled)]
    pub log_level: LogLevelArg,

    /// Maximum number of parallel jobs. Accepted and stored; this front
    /// end compiles one file sequentially regardless.
    #[arg(short = 'j', long = "jobs", default_value_t = 1)]
    pub max_jobs: u16,

    /// Maximum number of errors to accumulate before aborting.
    #[arg(long = "max-errors", default_value_t = tak_common::limits::DEFAULT_MAX_ERROR_COUNT)]
    pub max_errors: u32,

    /// Promote warnings to errors.
    #[arg(long = "warn-is-error")]
    pub warn_is_error: bool,

    /// Wrap each pipeline stage in a timed tracing span.
    #[arg(long = "time-actions")]
    pub time_actions: bool,

    /// Dump the generated IR. Rejected: no back end is wired up.
    #[arg(long = "dump-ir")]
    pub dump_ir: bool,

    /// Pretty-print the entity table's symbols after checking.
    #[arg(long = "dump-symbols")]
    pub dump_symbols: bool,

    /// Pretty-print the parsed AST after checking.
    #[arg(long = "dump-ast")]
    pub dump_ast: bool,

    /// Pretty-print the entity table's user types after checking.
    #[arg(long = "dump-types")]
    pub dump_types: bool,
}

impl CliArgs {
    /// Builds the immutable [`CompilerOptions`] handle threaded into
    /// every stage from this binary's own flags.
    #[must_use]
    pub fn to_compiler_options(&self) -> CompilerOptions {
        let mut flags = ConfigFlags::empty();
        flags.set(ConfigFlags::WARN_IS_ERR, self.warn_is_error);
        flags.set(ConfigFlags::TIME_ACTIONS, self.time_actions);
        flags.set(ConfigFlags::DUMP_IR, self.dump_ir);
        flags.set(ConfigFlags::DUMP_SYMBOLS, self.dump_symbols);
        flags.set(ConfigFlags::DUMP_AST, self.dump_ast);
        flags.set(ConfigFlags::DUMP_TYPES, self.dump_types);

        CompilerOptions {
            input_file: self.input.clone(),
            output_file: self.output.clone(),
            arch: self.arch.clone(),
            opt_level: self.opt_level.into(),
            log_level: self.log_level.into(),
            flags,
            max_jobs: self.max_jobs,
            max_error_count: self.max_errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse_from_just_an_input_file() {
        let args = CliArgs::parse_from(["tak", "main.tak"]);
        assert_eq!(args.input, "main.tak");
        assert_eq!(args.output, "a.out");
        assert_eq!(args.opt_level, OptLevelArg::O0);
        assert!(!args.warn_is_error);
    }

    #[test]
    fn flags_map_onto_compiler_options() {
        let args = CliArgs::parse_from(["tak", "main.tak", "--warn-is-error", "--dump-ast", "-O", "o2"]);
        let options = args.to_compiler_options();
        assert!(options.warn_is_error());
        assert!(options.flags.contains(ConfigFlags::DUMP_AST));
        assert_eq!(options.opt_level, OptLevel::O2);
    }
}
