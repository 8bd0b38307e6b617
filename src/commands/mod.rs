//! # CLI Command Implementations
//!
//! Each subcommand lives in its own file with an `Args` struct derived with
//! `clap` and an `execute` function. Every command reads through a merged
//! view described by [`ViewArgs`], which is flattened into its arguments.

pub mod call;
pub mod cat;
pub mod entries;
pub mod ls;
pub mod resolve;
pub mod stat;
pub mod tree;

use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fs_merger::config::{self, DEFAULT_CONFIG_FILENAME};
use fs_merger::{suggestions, FsMerger, RootSpec};

/// Where the roots of the merged view come from
#[derive(Args, Debug, Clone, Default)]
pub struct ViewArgs {
    /// Roots file to read.
    ///
    /// When neither this nor `--root` is given, `fs-merger.yaml` in the
    /// current directory is used if present.
    #[arg(short, long, value_name = "FILE", env = "FS_MERGER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Additional root, optionally published under a prefix.
    ///
    /// May be repeated; later roots take precedence. These come after any
    /// roots from the roots file.
    #[arg(long = "root", value_name = "DIR[=PREFIX]")]
    pub roots: Vec<String>,

    /// Read through the nested view at this root position instead.
    #[arg(long, value_name = "N")]
    pub at: Option<usize>,
}

impl ViewArgs {
    /// Root specifications, roots file first.
    pub fn specs(&self) -> Result<Vec<RootSpec>> {
        let config_path = match &self.config {
            Some(path) => Some(path.clone()),
            None if self.roots.is_empty() => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILENAME);
                default.exists().then_some(default)
            }
            None => None,
        };

        let mut specs = match config_path {
            Some(path) => load_roots_file(&path)?,
            None => Vec::new(),
        };
        specs.extend(self.roots.iter().map(|arg| parse_root_arg(arg)));

        if specs.is_empty() {
            return Err(suggestions::no_roots());
        }
        Ok(specs)
    }

    /// Build the merged view, descending into `--at` when given.
    pub fn open(&self) -> Result<Arc<FsMerger>> {
        let merger = Arc::new(FsMerger::new(self.specs()?));
        match self.at {
            Some(position) => Ok(merger.at(position)?),
            None => Ok(merger),
        }
    }
}

fn load_roots_file(path: &Path) -> Result<Vec<RootSpec>> {
    if !path.exists() {
        return Err(suggestions::config_not_found(path));
    }
    config::from_file(path)
        .map_err(|e| anyhow::anyhow!("Failed to load roots from {}: {}", path.display(), e))
}

/// Parse `DIR` or `DIR=PREFIX`
pub fn parse_root_arg(arg: &str) -> RootSpec {
    match arg.split_once('=') {
        Some((dir, prefix)) if !prefix.is_empty() => RootSpec::path(dir).with_prefix(prefix),
        Some((dir, _)) => RootSpec::path(dir),
        None => RootSpec::path(arg),
    }
}

/// Format file permissions in Unix-style (e.g., "rw-r--r--")
pub fn format_permissions(mode: u32) -> String {
    const BITS: [(u32, char); 9] = [
        (0o400, 'r'),
        (0o200, 'w'),
        (0o100, 'x'),
        (0o040, 'r'),
        (0o020, 'w'),
        (0o010, 'x'),
        (0o004, 'r'),
        (0o002, 'w'),
        (0o001, 'x'),
    ];

    BITS.iter()
        .map(|&(bit, c)| if mode & bit != 0 { c } else { '-' })
        .collect()
}

/// Format file size in human-readable format
pub fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    match size {
        s if s >= GB => format!("{:.1}G", s as f64 / GB as f64),
        s if s >= MB => format!("{:.1}M", s as f64 / MB as f64),
        s if s >= KB => format!("{:.1}K", s as f64 / KB as f64),
        s => format!("{}B", s),
    }
}
