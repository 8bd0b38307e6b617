//! # Ls Command Implementation
//!
//! Lists the immediate children of a merged directory: the union of that
//! directory's names across every root that has it, each name once.
//!
//! - **Sorting**: by name (default) or in merge order, i.e. the order the
//!   roots first produced each name
//! - **Detailed Output**: optional long format with permissions and sizes of
//!   the highest-priority match for each name
//! - **Asynchronous Listing**: `--async` reads the roots in parallel

use anyhow::Result;
use clap::{Args, ValueEnum};
use std::sync::mpsc;

use super::{format_permissions, format_size, ViewArgs};
use fs_merger::output::OutputConfig;
use fs_merger::path::join_posix;
use fs_merger::{suggestions, Gate};

/// List a merged directory
#[derive(Args, Debug)]
pub struct LsArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Directory relative to the merged view (defaults to the top level)
    #[arg(default_value = "")]
    pub dir: String,

    /// Use long listing format showing size and permissions.
    #[arg(short, long)]
    pub long: bool,

    /// Sort order for the listing.
    #[arg(short, long, value_enum, default_value = "name")]
    pub sort: SortOrder,

    /// Reverse the sort order.
    #[arg(short, long)]
    pub reverse: bool,

    /// Show only the number of names.
    #[arg(long)]
    pub count: bool,

    /// Read the roots in parallel.
    #[arg(long = "async")]
    pub parallel: bool,
}

/// Sort order options for the listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum SortOrder {
    /// Sort by name, byte-wise
    #[default]
    Name,
    /// Keep the order in which roots first produced each name
    Merge,
}

pub fn execute(args: LsArgs, output: OutputConfig) -> Result<()> {
    let merger = args.view.open()?;
    let gate = merger.fs();

    let mut names = if args.parallel {
        list_parallel(&gate, &args.dir)?
    } else {
        gate.read_dir(&args.dir)
            .map_err(|e| suggestions::explain(e, &args.dir))?
    };

    if args.sort == SortOrder::Name {
        names.sort();
    }
    if args.reverse {
        names.reverse();
    }

    if args.count {
        println!("{}", names.len());
        return Ok(());
    }

    for name in &names {
        let merged_path = join_posix(&args.dir, name);
        // a name can vanish between listing and stat; print it unstyled then
        let meta = if args.long || output.use_color {
            gate.stat(&merged_path).ok()
        } else {
            None
        };
        let is_directory = meta.as_ref().is_some_and(|m| m.is_dir());

        if args.long {
            let (mode, size) = meta
                .as_ref()
                .map(|m| (format_permissions(m.mode), format_size(m.len)))
                .unwrap_or_else(|| ("?????????".to_string(), "-".to_string()));
            println!("{} {:>8} {}", mode, size, output.path(name, is_directory));
        } else {
            println!("{}", output.path(name, is_directory));
        }
    }

    Ok(())
}

fn list_parallel(gate: &Gate<'_>, dir: &str) -> Result<Vec<String>> {
    let (tx, rx) = mpsc::channel();
    gate.read_dir_async(dir, move |result| {
        let _ = tx.send(result);
    });
    let names = rx
        .recv()
        .map_err(|_| anyhow::anyhow!("Directory listing of '{}' produced no result", dir))?;
    names.map_err(|e| suggestions::explain(e, dir))
}
