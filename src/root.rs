//! Root specifications and their resolution into descriptors
//!
//! A view is constructed from an ordered list of [`RootSpec`]s. Each one is
//! turned into a [`RootDescriptor`] by [`resolve_root`]: a normalized
//! absolute root path, plus an optional prefix and destination mapper that
//! relocate the root's contents inside the merged namespace.

use crate::error::{Error, Result};
use crate::path::{absolutize, join_posix, regex_rename};
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Pure function from a relative path to the relative path it is published
/// under.
#[derive(Clone)]
pub struct DestinationMapper(Arc<dyn Fn(&str) -> String + Send + Sync>);

impl DestinationMapper {
    /// Wrap an arbitrary mapping closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Build a mapper from a regex rename rule.
    ///
    /// `to` may reference capture groups of `from` as `$1`, `$2`, ...
    /// Paths that `from` does not match are published unchanged.
    pub fn regex(from: &str, to: &str) -> Result<Self> {
        let regex = Regex::new(from)?;
        let replacement = to.to_string();
        Ok(Self::new(move |path| {
            regex_rename(&regex, &replacement, path).unwrap_or_else(|| path.to_string())
        }))
    }

    pub fn apply(&self, relative_path: &str) -> String {
        (self.0)(relative_path)
    }
}

impl fmt::Debug for DestinationMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DestinationMapper(..)")
    }
}

/// What an external build node reports about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeInfo {
    /// A source node; its files live in `source_directory`.
    Source { source_directory: PathBuf },
    /// An output node; its files are produced into `output_path`.
    Output { output_path: PathBuf },
}

/// Introspection capability for opaque external nodes.
///
/// Implemented by whatever build system hands nodes to the overlay.
pub trait BuildNode: Send + Sync + fmt::Debug {
    /// Describe the node, or `None` when no root can be determined.
    fn info(&self) -> Option<NodeInfo>;

    fn prefix(&self) -> Option<String> {
        None
    }

    fn destination_mapper(&self) -> Option<DestinationMapper> {
        None
    }
}

/// One input root, as given by the caller.
#[derive(Debug, Clone)]
pub enum RootSpec {
    /// A plain filesystem path.
    Path(PathBuf),
    /// An explicit descriptor with optional prefix and mapper.
    Descriptor {
        root: PathBuf,
        prefix: Option<String>,
        destination_mapper: Option<DestinationMapper>,
    },
    /// An opaque external node, resolved through [`BuildNode::info`].
    Node(Arc<dyn BuildNode>),
    /// A further list of roots, reachable through `FsMerger::at`.
    Group(Vec<RootSpec>),
}

impl RootSpec {
    pub fn path(root: impl Into<PathBuf>) -> Self {
        RootSpec::Path(root.into())
    }

    /// An explicit descriptor with neither prefix nor mapper.
    pub fn descriptor(root: impl Into<PathBuf>) -> Self {
        RootSpec::Descriptor {
            root: root.into(),
            prefix: None,
            destination_mapper: None,
        }
    }

    pub fn node(node: Arc<dyn BuildNode>) -> Self {
        RootSpec::Node(node)
    }

    pub fn group(specs: Vec<RootSpec>) -> Self {
        RootSpec::Group(specs)
    }

    /// Set the prefix. Plain paths are promoted to descriptors; nodes and
    /// groups are returned unchanged.
    pub fn with_prefix(self, prefix: impl Into<String>) -> Self {
        match self {
            RootSpec::Path(root) => RootSpec::Descriptor {
                root,
                prefix: Some(prefix.into()),
                destination_mapper: None,
            },
            RootSpec::Descriptor {
                root,
                destination_mapper,
                ..
            } => RootSpec::Descriptor {
                root,
                prefix: Some(prefix.into()),
                destination_mapper,
            },
            other => other,
        }
    }

    /// Set the destination mapper. Plain paths are promoted to descriptors;
    /// nodes and groups are returned unchanged.
    pub fn with_destination_mapper(self, mapper: DestinationMapper) -> Self {
        match self {
            RootSpec::Path(root) => RootSpec::Descriptor {
                root,
                prefix: None,
                destination_mapper: Some(mapper),
            },
            RootSpec::Descriptor { root, prefix, .. } => RootSpec::Descriptor {
                root,
                prefix,
                destination_mapper: Some(mapper),
            },
            other => other,
        }
    }
}

impl From<PathBuf> for RootSpec {
    fn from(path: PathBuf) -> Self {
        RootSpec::Path(path)
    }
}

impl From<&Path> for RootSpec {
    fn from(path: &Path) -> Self {
        RootSpec::Path(path.to_path_buf())
    }
}

impl From<&str> for RootSpec {
    fn from(path: &str) -> Self {
        RootSpec::Path(PathBuf::from(path))
    }
}

impl From<String> for RootSpec {
    fn from(path: String) -> Self {
        RootSpec::Path(PathBuf::from(path))
    }
}

/// A resolved root: where it lives and how its paths are published.
#[derive(Debug, Clone)]
pub struct RootDescriptor {
    root: PathBuf,
    prefix: Option<String>,
    destination_mapper: Option<DestinationMapper>,
}

impl RootDescriptor {
    /// Normalized absolute root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn destination_mapper(&self) -> Option<&DestinationMapper> {
        self.destination_mapper.as_ref()
    }

    /// The merged-namespace path for a path relative to this root.
    ///
    /// Applies the destination mapper first, then joins under the prefix.
    pub fn publish(&self, relative_path: &str) -> String {
        publish_path(
            relative_path,
            self.prefix.as_deref(),
            self.destination_mapper.as_ref(),
        )
    }
}

/// Compute the published path of `relative_path` under a prefix and mapper.
pub fn publish_path(
    relative_path: &str,
    prefix: Option<&str>,
    destination_mapper: Option<&DestinationMapper>,
) -> String {
    let mapped = match destination_mapper {
        Some(mapper) => mapper.apply(relative_path),
        None => relative_path.to_string(),
    };
    match prefix {
        Some(prefix) if !prefix.is_empty() => join_posix(prefix, &mapped),
        _ => mapped,
    }
}

/// Resolve one root specification into a descriptor.
///
/// Fails with `InvalidArgument` when no root can be determined: an empty
/// root path, a node that reports no info, or a group.
pub fn resolve_root(spec: &RootSpec) -> Result<RootDescriptor> {
    let (root, prefix, destination_mapper) = match spec {
        RootSpec::Path(root) => (root.clone(), None, None),
        RootSpec::Descriptor {
            root,
            prefix,
            destination_mapper,
        } => (root.clone(), prefix.clone(), destination_mapper.clone()),
        RootSpec::Node(node) => {
            let root = match node.info() {
                Some(NodeInfo::Source { source_directory }) => source_directory,
                Some(NodeInfo::Output { output_path }) => output_path,
                None => {
                    return Err(Error::invalid_argument(format!(
                        "Could not determine a root for node {:?}",
                        node
                    )))
                }
            };
            (root, node.prefix(), node.destination_mapper())
        }
        RootSpec::Group(specs) => {
            return Err(Error::invalid_argument(format!(
                "A group of {} roots has no single root; select it with at(index)",
                specs.len()
            )))
        }
    };

    if root.as_os_str().is_empty() {
        return Err(Error::invalid_argument(
            "fs-merger must be instantiated with a path, a node, or a descriptor with a root",
        ));
    }

    Ok(RootDescriptor {
        root: absolutize(&root)?,
        prefix: prefix.filter(|p| !p.is_empty()),
        destination_mapper,
    })
}
