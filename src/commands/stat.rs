//! # Stat Command Implementation
//!
//! Shows the metadata of the highest-priority match for a merged path.

use anyhow::Result;
use clap::Args;
use std::time::UNIX_EPOCH;

use super::{format_permissions, format_size, ViewArgs};
use fs_merger::{suggestions, FileMeta};

/// Show type, size and permissions of a merged path
#[derive(Args, Debug)]
pub struct StatArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Path relative to the merged view
    pub path: String,

    /// Do not follow a final symlink
    #[arg(long)]
    pub no_follow: bool,
}

pub fn execute(args: StatArgs) -> Result<()> {
    let merger = args.view.open()?;
    let gate = merger.fs();
    let meta = if args.no_follow {
        gate.lstat(&args.path)
    } else {
        gate.stat(&args.path)
    }
    .map_err(|e| suggestions::explain(e, &args.path))?;

    print!("{}", render(&args.path, &meta));
    Ok(())
}

fn render(path: &str, meta: &FileMeta) -> String {
    let modified = meta
        .modified
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|| "-".to_string());

    format!(
        "path: {}\nkind: {}\nsize: {} ({})\nmode: {} ({:o})\nreadonly: {}\nmodified: {}\n",
        path,
        meta.kind.as_str(),
        meta.len,
        format_size(meta.len),
        format_permissions(meta.mode),
        meta.mode,
        meta.readonly,
        modified
    )
}
