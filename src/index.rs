//! Ordered index of resolved roots

use crate::error::Result;
use crate::root::{resolve_root, RootDescriptor, RootSpec};
use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Resolved roots in priority order.
///
/// Position equals input order equals priority: the last descriptor wins on
/// any collision. A root-path lookup supports exact-match short circuits.
#[derive(Debug, Clone)]
pub struct OverlayIndex {
    descriptors: Vec<RootDescriptor>,
    by_root: HashMap<PathBuf, usize>,
}

impl OverlayIndex {
    /// Resolve every specification, in order.
    pub fn build(specs: &[RootSpec]) -> Result<Self> {
        let mut descriptors = Vec::with_capacity(specs.len());
        let mut by_root = HashMap::with_capacity(specs.len());

        for (position, spec) in specs.iter().enumerate() {
            let descriptor = resolve_root(spec)?;
            by_root.insert(descriptor.root().to_path_buf(), position);
            descriptors.push(descriptor);
        }

        debug!("Built overlay index over {} root(s)", descriptors.len());
        Ok(Self {
            descriptors,
            by_root,
        })
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&RootDescriptor> {
        self.descriptors.get(position)
    }

    /// Position of the descriptor whose root is exactly `root`.
    ///
    /// `root` must already be normalized.
    pub fn position_of(&self, root: &Path) -> Option<usize> {
        self.by_root.get(root).copied()
    }

    /// Descriptors from lowest to highest priority
    pub fn ascending(&self) -> impl DoubleEndedIterator<Item = (usize, &RootDescriptor)> {
        self.descriptors.iter().enumerate()
    }

    /// Descriptors from highest to lowest priority
    pub fn descending(&self) -> impl Iterator<Item = (usize, &RootDescriptor)> {
        self.ascending().rev()
    }
}
