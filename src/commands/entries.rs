//! # Entries Command Implementation
//!
//! Lists every entry below a merged directory, with each root's paths moved
//! under its prefix and destination mapper, and later roots shadowing
//! earlier ones. Output is sorted by merged path.

use anyhow::Result;
use clap::Args;

use super::{format_permissions, format_size, ViewArgs};
use fs_merger::output::OutputConfig;
use fs_merger::{suggestions, Entry, WalkOptions};

/// List every merged entry below a directory
#[derive(Args, Debug)]
pub struct EntriesArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Directory relative to the merged view (defaults to the top level)
    #[arg(default_value = "")]
    pub dir: String,

    /// Only keep entries whose root-relative path matches this glob (repeatable)
    #[arg(short, long, value_name = "PATTERN")]
    pub glob: Vec<String>,

    /// Skip entries matching this glob, and do not descend into them (repeatable)
    #[arg(short, long, value_name = "PATTERN")]
    pub ignore: Vec<String>,

    /// Leave directories out of the result.
    #[arg(long)]
    pub files_only: bool,

    /// Use long listing format showing permissions, size and origin root.
    #[arg(short, long)]
    pub long: bool,

    /// Print the entries as JSON.
    #[arg(long, conflicts_with_all = ["long", "count"])]
    pub json: bool,

    /// Show only the number of entries.
    #[arg(long)]
    pub count: bool,
}

impl EntriesArgs {
    fn walk_options(&self) -> Result<WalkOptions> {
        for pattern in self.glob.iter().chain(&self.ignore) {
            if let Err(e) = glob::Pattern::new(pattern) {
                return Err(suggestions::invalid_glob(pattern, &e));
            }
        }

        let mut options = WalkOptions::new();
        options.globs = self.glob.clone();
        options.ignore = self.ignore.clone();
        if self.files_only {
            options = options.files_only();
        }
        Ok(options)
    }
}

pub fn execute(args: EntriesArgs, output: OutputConfig) -> Result<()> {
    let options = args.walk_options()?;
    let merger = args.view.open()?;
    let entries = merger
        .fs()
        .entries(&args.dir, &options)
        .map_err(|e| suggestions::explain(e, &args.dir))?;

    if args.count {
        println!("{}", entries.len());
        return Ok(());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for entry in &entries {
        println!("{}", render(entry, args.long, output));
    }

    let total: u64 = entries
        .iter()
        .filter(|e| !e.is_directory)
        .map(|e| e.metadata.len)
        .sum();
    println!();
    println!(
        "{}",
        output.summary(&format!(
            "{} entr{}, {} total",
            entries.len(),
            if entries.len() == 1 { "y" } else { "ies" },
            format_size(total)
        ))
    );

    Ok(())
}

fn render(entry: &Entry, long: bool, output: OutputConfig) -> String {
    let path = output.path(&entry.relative_path, entry.is_directory);
    if !long {
        return path;
    }
    format!(
        "{} {:>8} {} {}",
        format_permissions(entry.metadata.mode),
        format_size(entry.metadata.len),
        output.origin(entry.origin),
        path
    )
}
