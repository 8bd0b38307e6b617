//! # fs-merger
//!
//! A read-only overlay view over an ordered list of directory roots. Later
//! roots take precedence over earlier ones. The overlay can:
//!
//! - resolve a relative path to the highest-priority root containing it,
//! - list a directory across all roots without duplicate names,
//! - enumerate every entry below a directory across all roots, with each
//!   root's paths optionally relocated by a prefix and a destination mapper,
//!   and later roots shadowing earlier ones.
//!
//! ## Quick Example
//!
//! ```
//! use std::sync::Arc;
//! use fs_merger::filesystem::{FileSystem, MemoryFS, WalkOptions};
//! use fs_merger::{FsMerger, RootSpec};
//!
//! let mut fs = MemoryFS::new();
//! fs.add_file_string("/vendor/lib.js", "vendored").unwrap();
//! fs.add_file_string("/app/lib.js", "app").unwrap();
//! fs.add_file_string("/app/app.js", "main").unwrap();
//! let fs: Arc<dyn FileSystem> = Arc::new(fs);
//!
//! let merger = FsMerger::with_filesystem(
//!     vec![RootSpec::path("/vendor").with_prefix("vendor"), RootSpec::path("/app")],
//!     fs,
//! );
//!
//! assert_eq!(merger.fs().read_file("lib.js").unwrap(), b"app");
//!
//! let paths: Vec<String> = merger
//!     .fs()
//!     .entries("", &WalkOptions::default())
//!     .unwrap()
//!     .into_iter()
//!     .map(|e| e.relative_path)
//!     .collect();
//! assert_eq!(paths, vec!["app.js", "lib.js", "vendor/lib.js"]);
//! ```
//!
//! ## Core Concepts
//!
//! - **Roots (`root`)**: [`RootSpec`] is what callers hand in: a plain path,
//!   an explicit descriptor with prefix and destination mapper, an opaque
//!   build node, or a nested group. Each resolves to a [`RootDescriptor`].
//! - **Index (`index`)**: the resolved roots in priority order, built lazily
//!   once per view.
//! - **Resolution (`resolve`)**, **listing (`listing`)** and **entries
//!   (`entries`)**: the three read algorithms over the index.
//! - **Gate (`gate`)**: the allow-listed operations callers use, rejecting
//!   absolute paths and unknown operation names.
//! - **Filesystem (`filesystem`)**: the host calls everything bottoms out in,
//!   with disk and in-memory implementations.
//! - **Config (`config`)**: YAML roots files for the command-line tool.

pub mod config;
pub mod entries;
pub mod error;
pub mod filesystem;
pub mod gate;
pub mod index;
pub mod listing;
pub mod merger;
pub mod output;
pub mod path;
pub mod resolve;
pub mod root;
pub mod suggestions;

#[cfg(test)]
mod path_proptest;

pub use entries::Entry;
pub use error::{Error, Result};
pub use filesystem::{FileMeta, FileSystem, HostFs, MemoryFS, WalkOptions};
pub use gate::{Gate, Operation, OperationOutput};
pub use index::OverlayIndex;
pub use merger::FsMerger;
pub use resolve::ResolvedMeta;
pub use root::{BuildNode, DestinationMapper, NodeInfo, RootDescriptor, RootSpec};
