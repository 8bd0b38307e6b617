//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;
use fs_merger::output::OutputConfig;

/// fs-merger - Read-only overlay of ordered directory roots
#[derive(Parser, Debug)]
#[command(name = "fs-merger")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace); RUST_LOG overrides it
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the absolute path a merged path resolves to
    Resolve(commands::resolve::ResolveArgs),

    /// Write the contents of a merged file to stdout
    Cat(commands::cat::CatArgs),

    /// Show type, size and permissions of a merged path
    Stat(commands::stat::StatArgs),

    /// List a merged directory
    Ls(commands::ls::LsArgs),

    /// List every merged entry below a directory
    Entries(commands::entries::EntriesArgs),

    /// Display merged entries as a tree
    Tree(commands::tree::TreeArgs),

    /// Run a named read operation through the operation gate
    Call(commands::call::CallArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);
        let output = OutputConfig::from_env_and_flag(&self.color);
        console::set_colors_enabled(output.use_color);

        match self.command {
            Commands::Resolve(args) => commands::resolve::execute(args),
            Commands::Cat(args) => commands::cat::execute(args),
            Commands::Stat(args) => commands::stat::execute(args),
            Commands::Ls(args) => commands::ls::execute(args, output),
            Commands::Entries(args) => commands::entries::execute(args, output),
            Commands::Tree(args) => commands::tree::execute(args, output),
            Commands::Call(args) => commands::call::execute(args),
        }
    }
}

/// Install the env_logger backend. `RUST_LOG`, when set, takes precedence
/// over `--log-level`.
fn init_logging(level: &str) {
    let mut builder = env_logger::Builder::new();
    builder.parse_filters(level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.format_timestamp(None);
    // a logger may already be installed when running under a test harness
    let _ = builder.try_init();
}
