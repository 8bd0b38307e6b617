//! # Cat Command Implementation
//!
//! Writes the bytes of the highest-priority match to stdout, unmodified.

use anyhow::Result;
use clap::Args;
use std::io::Write;

use super::ViewArgs;
use fs_merger::suggestions;

/// Write a merged file to stdout
#[derive(Args, Debug)]
pub struct CatArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// File path relative to the merged view
    pub path: String,
}

pub fn execute(args: CatArgs) -> Result<()> {
    let merger = args.view.open()?;
    let contents = merger
        .fs()
        .read_file(&args.path)
        .map_err(|e| suggestions::explain(e, &args.path))?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&contents)?;
    stdout.flush()?;
    Ok(())
}
