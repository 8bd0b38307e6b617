//! The operation gate
//!
//! [`Gate`] is the boundary callers use to read through an overlay. It
//! exposes a fixed allow-list of read operations, modeled by [`Operation`].
//! Every path argument must be relative to the merged namespace; absolute
//! paths are rejected before any root is consulted. Host paths are only
//! reachable through the filesystem capability itself, never through the
//! gate.
//!
//! Callers that select operations by name (for example from a command line
//! or a script) go through [`Gate::call`], which turns unknown names into
//! [`Error::PermissionDenied`].

use crate::entries::Entry;
use crate::error::{Error, Result};
use crate::filesystem::{FileMeta, WalkOptions};
use crate::merger::FsMerger;
use crate::path::ensure_relative;
use crate::resolve::ResolvedMeta;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::mpsc;

/// The allowed read operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Exists,
    Lstat,
    Stat,
    ReadFile,
    ReadDir,
    ReadDirAsync,
    ReadFileMeta,
    Entries,
}

impl Operation {
    /// Every allowed operation, in documentation order
    pub const ALL: [Operation; 8] = [
        Operation::ReadFile,
        Operation::Exists,
        Operation::Lstat,
        Operation::Stat,
        Operation::ReadDir,
        Operation::ReadDirAsync,
        Operation::ReadFileMeta,
        Operation::Entries,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Operation::Exists => "exists",
            Operation::Lstat => "lstat",
            Operation::Stat => "stat",
            Operation::ReadFile => "read_file",
            Operation::ReadDir => "read_dir",
            Operation::ReadDirAsync => "read_dir_async",
            Operation::ReadFileMeta => "read_file_meta",
            Operation::Entries => "entries",
        }
    }

    /// Comma-separated list of allowed operation names
    pub fn allowed_names() -> String {
        Self::ALL
            .iter()
            .map(|op| op.name())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.name() == name)
            .ok_or_else(|| Error::PermissionDenied {
                operation: name.to_string(),
                allowed: Self::allowed_names(),
            })
    }
}

/// Result of a dispatched operation
#[derive(Debug, Clone)]
pub enum OperationOutput {
    Exists(bool),
    Metadata(FileMeta),
    Contents(Vec<u8>),
    Names(Vec<String>),
    FileMeta(ResolvedMeta),
    Entries(Vec<Entry>),
}

/// Gated handle over a [`FsMerger`], obtained from [`FsMerger::fs`]
#[derive(Debug, Clone, Copy)]
pub struct Gate<'a> {
    view: &'a FsMerger,
}

impl<'a> Gate<'a> {
    pub(crate) fn new(view: &'a FsMerger) -> Self {
        Self { view }
    }

    fn resolved(&self, relative_path: &str) -> Result<PathBuf> {
        ensure_relative(relative_path)?;
        self.view.resolve(relative_path)
    }

    /// Whether any root contains `relative_path`
    pub fn exists(&self, relative_path: &str) -> Result<bool> {
        match self.resolved(relative_path) {
            Ok(_) => Ok(true),
            Err(Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Stat the winning match, following symlinks
    pub fn stat(&self, relative_path: &str) -> Result<FileMeta> {
        let path = self.resolved(relative_path)?;
        self.view.filesystem().stat(&path)
    }

    /// Stat the winning match without following a final symlink
    pub fn lstat(&self, relative_path: &str) -> Result<FileMeta> {
        let path = self.resolved(relative_path)?;
        self.view.filesystem().lstat(&path)
    }

    pub fn read_file(&self, relative_path: &str) -> Result<Vec<u8>> {
        let path = self.resolved(relative_path)?;
        self.view.filesystem().read_file(&path)
    }

    pub fn read_dir(&self, relative_path: &str) -> Result<Vec<String>> {
        ensure_relative(relative_path)?;
        self.view.list_directory(relative_path)
    }

    /// See [`FsMerger::list_directory_async`]. Argument errors are delivered
    /// through `on_complete`.
    pub fn read_dir_async<F>(&self, relative_path: &str, on_complete: F)
    where
        F: FnOnce(Result<Vec<String>>) + Send + 'static,
    {
        if let Err(e) = ensure_relative(relative_path) {
            on_complete(Err(e));
            return;
        }
        self.view.list_directory_async(relative_path, on_complete);
    }

    pub fn read_file_meta(
        &self,
        relative_path: &str,
        base_path: Option<&Path>,
    ) -> Result<ResolvedMeta> {
        ensure_relative(relative_path)?;
        self.view.read_file_meta(relative_path, base_path)
    }

    pub fn entries(&self, relative_path: &str, options: &WalkOptions) -> Result<Vec<Entry>> {
        ensure_relative(relative_path)?;
        self.view.collect_entries(relative_path, options)
    }

    /// Run the operation named `operation` on `relative_path`.
    ///
    /// Unknown names fail with [`Error::PermissionDenied`].
    pub fn call(&self, operation: &str, relative_path: &str) -> Result<OperationOutput> {
        let operation: Operation = operation.parse()?;
        self.invoke(operation, relative_path)
    }

    /// Run `operation` on `relative_path` with default options, blocking
    /// until the result is available.
    ///
    /// Inside a rayon worker `read_dir_async` lists synchronously, since
    /// waiting on a pool task from a busy pool can starve.
    pub fn invoke(&self, operation: Operation, relative_path: &str) -> Result<OperationOutput> {
        ensure_relative(relative_path)?;

        let output = match operation {
            Operation::Exists => OperationOutput::Exists(self.exists(relative_path)?),
            Operation::Lstat => OperationOutput::Metadata(self.lstat(relative_path)?),
            Operation::Stat => OperationOutput::Metadata(self.stat(relative_path)?),
            Operation::ReadFile => OperationOutput::Contents(self.read_file(relative_path)?),
            Operation::ReadDir => OperationOutput::Names(self.read_dir(relative_path)?),
            Operation::ReadDirAsync if rayon::current_thread_index().is_some() => {
                OperationOutput::Names(self.read_dir(relative_path)?)
            }
            Operation::ReadDirAsync => {
                let (tx, rx) = mpsc::channel();
                self.read_dir_async(relative_path, move |result| {
                    // the receiver only goes away if the caller stopped waiting
                    let _ = tx.send(result);
                });
                let names = rx.recv().map_err(|_| {
                    Error::Io(std::io::Error::other(
                        "asynchronous directory listing finished without a result",
                    ))
                })??;
                OperationOutput::Names(names)
            }
            Operation::ReadFileMeta => {
                OperationOutput::FileMeta(self.read_file_meta(relative_path, None)?)
            }
            Operation::Entries => {
                OperationOutput::Entries(self.entries(relative_path, &WalkOptions::default())?)
            }
        };
        Ok(output)
    }
}
