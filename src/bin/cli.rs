//! navix CLI - query a precomputed code-structure index.
//!
//! Usage:
//!   navix blast-radius <fn>        # What breaks if this changes
//!   navix callers <fn>             # Direct callers
//!   navix cycles                   # Circular call chains
//!   navix trace <file> <line>      # Paths from entry points to file:line
//!   navix query "who calls `x`"    # Free-text query
//!   navix capabilities             # Machine-readable query catalog

use clap::Parser;
use tracing_subscriber::EnvFilter;

use navix::cli::{run, Cli};

fn main() {
    // Diagnostics on stderr; stdout carries only JSON envelopes.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
