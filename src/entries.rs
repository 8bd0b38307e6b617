//! Recursive, merged enumeration of every root
//!
//! Each root's entries are re-keyed by their published path (destination
//! mapper, then prefix). Roots are visited lowest priority first so that a
//! later root's entry replaces an earlier one under the same key, whatever
//! the type of either entry.

use crate::error::Result;
use crate::filesystem::{FileMeta, FileSystem, WalkOptions};
use crate::index::OverlayIndex;
use crate::path::{compose, ensure_relative};
use log::debug;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// One item in the merged namespace
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    /// Posix-style published path
    pub relative_path: String,
    /// Absolute host path of the item in its origin root
    pub full_path: PathBuf,
    pub is_directory: bool,
    pub metadata: FileMeta,
    /// Priority position of the root that produced this entry
    pub origin: usize,
}

/// Collect the merged entries below `dir_path`, sorted by published path.
///
/// Roots without the directory are skipped. If no root has it, the result is
/// empty rather than an error.
pub fn collect_entries(
    index: &OverlayIndex,
    fs: &dyn FileSystem,
    dir_path: &str,
    options: &WalkOptions,
) -> Result<Vec<Entry>> {
    ensure_relative(dir_path)?;
    let mut merged: HashMap<String, Entry> = HashMap::new();

    for (origin, descriptor) in index.ascending() {
        let full_dir = compose(descriptor.root(), dir_path);
        if !fs.exists(&full_dir) {
            debug!("Skipping root {}: {} does not exist", origin, full_dir.display());
            continue;
        }

        for walked in fs.walk(&full_dir, options)? {
            let key = descriptor.publish(&walked.relative_path);
            merged.insert(
                key.clone(),
                Entry {
                    relative_path: key,
                    full_path: walked.full_path,
                    is_directory: walked.metadata.is_dir(),
                    metadata: walked.metadata,
                    origin,
                },
            );
        }
    }

    let mut entries: Vec<Entry> = merged.into_values().collect();
    entries.sort_by(|a, b| a.relative_path.as_bytes().cmp(b.relative_path.as_bytes()));
    Ok(entries)
}
