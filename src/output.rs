//! # Output Configuration
//!
//! Controls how the command-line tool renders merged paths: whether colors
//! are used, and how directories and origin roots are marked.
//!
//! ## Respecting User Preferences
//!
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals

use console::style;
use std::env;

/// Output configuration for the command-line tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether styled output should be used.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and the `--color` flag.
    ///
    /// `always` and `never` win over the environment. Anything else means
    /// auto-detection, where colors are disabled by `NO_COLOR`, `CLICOLOR=0`,
    /// `TERM=dumb` or a non-terminal stdout (unless `CLICOLOR_FORCE=1`).
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // presence alone disables, even when empty
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    pub fn without_color() -> Self {
        Self { use_color: false }
    }

    /// Render a merged path, highlighting directories.
    pub fn path(&self, path: &str, is_directory: bool) -> String {
        if !self.use_color {
            return path.to_string();
        }
        if is_directory {
            style(path).blue().bold().to_string()
        } else {
            path.to_string()
        }
    }

    /// Render the "which root did this come from" marker.
    pub fn origin(&self, origin: usize) -> String {
        let label = format!("[{}]", origin);
        if self.use_color {
            style(label).dim().to_string()
        } else {
            label
        }
    }

    /// Render a summary line such as "3 entries".
    pub fn summary(&self, text: &str) -> String {
        if self.use_color {
            style(text).green().to_string()
        } else {
            text.to_string()
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}
