//! # fs-merger CLI
//!
//! Binary entry point for the `fs-merger` command-line tool. It parses
//! arguments with `clap` and dispatches to a subcommand; all overlay logic
//! lives in the library crate.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
