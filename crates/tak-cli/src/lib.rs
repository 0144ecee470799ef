//! CLI support for the `tak` front-end driver binary: argument parsing,
//! the compile-and-report pipeline, and diagnostic/entity-table dumping.

pub mod args;
pub mod driver;
pub mod dump;
pub mod logging;
