//! The `tak` binary: parses CLI flags, runs the front-end pipeline over
//! one compilation unit, prints any diagnostics, and sets the process
//! exit code. Grounded in `tsz-server`'s `main` (`fn main() -> Result<()>`,
//! `clap::Parser::parse()`, tracing initialized first) for the overall
//! shape, simplified to this front end's single-file, no-protocol
//! surface.

use clap::Parser;

use tak_cli::args::CliArgs;
use tak_cli::{driver, logging};

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let options = args.to_compiler_options();
    logging::init(options.log_level);

    if args.dump_ir {
        eprintln!("error: --dump-ir is not supported; no code-generation back end is wired up.");
        std::process::exit(1);
    }

    let outcome = driver::compile(&options)?;
    for rendered in &outcome.rendered_diagnostics {
        eprintln!("{rendered}");
    }

    std::process::exit(if outcome.ok { 0 } else { 1 });
}
