//! # Call Command Implementation
//!
//! Runs one read operation, selected by name, through the operation gate.
//! Names outside the allow-list are refused with the list of allowed ones.

use anyhow::Result;
use clap::Args;
use std::io::Write;

use super::ViewArgs;
use fs_merger::{suggestions, OperationOutput};

/// Run a named read operation through the operation gate
#[derive(Args, Debug)]
pub struct CallArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Operation name, e.g. read_file, exists, read_dir, entries
    pub operation: String,

    /// Path relative to the merged view
    #[arg(default_value = "")]
    pub path: String,
}

pub fn execute(args: CallArgs) -> Result<()> {
    let merger = args.view.open()?;
    let result = merger
        .fs()
        .call(&args.operation, &args.path)
        .map_err(|e| suggestions::explain(e, &args.path))?;

    match result {
        OperationOutput::Exists(exists) => println!("{}", exists),
        OperationOutput::Metadata(meta) => println!("{}", serde_json::to_string_pretty(&meta)?),
        OperationOutput::Contents(bytes) => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
        }
        OperationOutput::Names(names) => {
            for name in names {
                println!("{}", name);
            }
        }
        OperationOutput::FileMeta(meta) => {
            println!("{} [{}]", meta.path.display(), meta.origin);
        }
        OperationOutput::Entries(entries) => {
            for entry in entries {
                println!("{}", entry.relative_path);
            }
        }
    }

    Ok(())
}
