//! # Error Handling
//!
//! This module defines the centralized error type for `fs-merger`. It uses
//! the `thiserror` library to build a single `Error` enum covering every
//! failure the overlay can report.
//!
//! ## Taxonomy
//!
//! - **`InvalidArgument`**: an absolute path was given where a relative one is
//!   required, or a root specification has no resolvable root.
//! - **`PermissionDenied`**: an operation name outside the allow-list was
//!   requested through the operation gate. This is a caller bug.
//! - **`NotFound`**: no root contains the requested relative path.
//! - **`Io`** / **`Walk`**: failures from the underlying filesystem. These are
//!   carried as-is so callers can inspect the original `std::io::ErrorKind`.
//!
//! Roots-file parsing adds `ConfigParse`, `Yaml`, `Regex` and `Glob`.
//!
//! `NotFound` and `InvalidArgument` are expected, handleable outcomes. Use
//! [`Error::is_not_found`] to test for "missing" regardless of whether the
//! overlay or the host filesystem reported it.

use thiserror::Error;

/// Main error type for fs-merger operations
#[derive(Error, Debug)]
pub enum Error {
    /// A caller-supplied argument was rejected.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// An operation outside the allow-list was requested.
    ///
    /// `allowed` lists the operation names that are accepted.
    #[error("Operation {operation} is not allowed. Allowed operations are {allowed}")]
    PermissionDenied { operation: String, allowed: String },

    /// No root contains the requested relative path.
    #[error("Not found in any root: {path}")]
    NotFound { path: String },

    /// An error occurred while parsing a roots file.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// An I/O error from the underlying filesystem, kept intact.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A failure while recursively walking a root.
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    /// A mutex guarding shared view state has been poisoned.
    #[error("Lock poisoned: {context}")]
    LockPoisoned { context: String },
}

impl Error {
    /// Shorthand for building an [`Error::InvalidArgument`].
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            message: message.into(),
        }
    }

    /// Returns true when the error means "this path does not exist".
    ///
    /// Covers overlay-level [`Error::NotFound`] as well as host I/O and walk
    /// errors whose kind is `NotFound`.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound { .. } => true,
            Error::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            Error::Walk(e) => e
                .io_error()
                .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound),
            _ => false,
        }
    }

    /// The underlying `std::io::Error`, if this error came from the host.
    pub fn io_error(&self) -> Option<&std::io::Error> {
        match self {
            Error::Io(e) => Some(e),
            Error::Walk(e) => e.io_error(),
            _ => None,
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
