//! Installs the global `tracing` subscriber once at startup, keyed off
//! `--log-level`. Grounded in `tsz_cli::tracing_config::init_tracing`
//! for the "always stderr, never interferes with the tool's real
//! output" shape.

use tak_common::LogLevel;
use tracing_subscriber::EnvFilter;

pub fn init(level: LogLevel) {
    let directive = match level {
        LogLevel::Disabled => "off",
        LogLevel::Enabled => "info",
        LogLevel::Trace => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}
