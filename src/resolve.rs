//! Relative path resolution against the overlay
//!
//! Resolution scans roots from highest to lowest priority and stops at the
//! first root that contains the path.

use crate::error::{Error, Result};
use crate::filesystem::FileSystem;
use crate::index::OverlayIndex;
use crate::path::{absolutize, compose, ensure_relative};
use crate::root::{publish_path, DestinationMapper};
use log::trace;
use std::path::{Path, PathBuf};

/// Where a relative path lives, and how its root publishes it.
#[derive(Debug, Clone)]
pub struct ResolvedMeta {
    /// Absolute host path
    pub path: PathBuf,
    pub prefix: Option<String>,
    pub destination_mapper: Option<DestinationMapper>,
    /// Priority position of the root that matched
    pub origin: usize,
}

impl ResolvedMeta {
    /// The merged-namespace path `relative_path` is published under.
    pub fn published_path(&self, relative_path: &str) -> String {
        publish_path(
            relative_path,
            self.prefix.as_deref(),
            self.destination_mapper.as_ref(),
        )
    }
}

/// Highest-priority root position and absolute path containing `relative_path`.
fn locate(
    index: &OverlayIndex,
    fs: &dyn FileSystem,
    relative_path: &str,
) -> Result<(usize, PathBuf)> {
    ensure_relative(relative_path)?;

    for (position, descriptor) in index.descending() {
        let candidate = compose(descriptor.root(), relative_path);
        if fs.exists(&candidate) {
            trace!("Resolved {} to {}", relative_path, candidate.display());
            return Ok((position, candidate));
        }
    }

    trace!("{} is not present in any root", relative_path);
    Err(Error::NotFound {
        path: relative_path.to_string(),
    })
}

/// Resolve `relative_path` to an absolute path in the highest-priority root
/// that contains it.
pub fn resolve(index: &OverlayIndex, fs: &dyn FileSystem, relative_path: &str) -> Result<PathBuf> {
    locate(index, fs, relative_path).map(|(_, path)| path)
}

/// Read the bytes of the highest-priority match for `relative_path`.
pub fn read_file(index: &OverlayIndex, fs: &dyn FileSystem, relative_path: &str) -> Result<Vec<u8>> {
    let path = resolve(index, fs, relative_path)?;
    fs.read_file(&path)
}

/// Locate `relative_path` together with its root's publishing rules.
///
/// When `base_path` names a known root exactly, that root is used without
/// probing the filesystem. A relative `base_path` is taken against the
/// current directory, the same way roots are. Otherwise roots are scanned
/// like [`resolve`].
pub fn read_file_meta(
    index: &OverlayIndex,
    fs: &dyn FileSystem,
    relative_path: &str,
    base_path: Option<&Path>,
) -> Result<ResolvedMeta> {
    ensure_relative(relative_path)?;

    let base = base_path.map(absolutize).transpose()?;
    let short_circuit = base
        .and_then(|base| index.position_of(&base))
        .and_then(|position| {
            index
                .get(position)
                .map(|d| (position, compose(d.root(), relative_path)))
        });
    let (origin, path) = match short_circuit {
        Some(found) => found,
        None => locate(index, fs, relative_path)?,
    };

    let descriptor = index.get(origin);
    Ok(ResolvedMeta {
        path,
        prefix: descriptor.and_then(|d| d.prefix().map(str::to_string)),
        destination_mapper: descriptor.and_then(|d| d.destination_mapper().cloned()),
        origin,
    })
}
