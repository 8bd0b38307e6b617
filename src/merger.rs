//! The owning overlay view
//!
//! [`FsMerger`] holds the caller's root specifications and the filesystem
//! capability. The index over the roots is built on first use and kept for
//! the life of the view; nested views handed out by [`FsMerger::at`] are
//! memoized per position.

use crate::entries::{self, Entry};
use crate::error::{Error, Result};
use crate::filesystem::{FileSystem, HostFs, WalkOptions};
use crate::gate::Gate;
use crate::index::OverlayIndex;
use crate::listing;
use crate::resolve::{self, ResolvedMeta};
use crate::root::RootSpec;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

/// Read-only overlay over an ordered list of roots.
///
/// Later roots take precedence over earlier ones. The view is `Send + Sync`;
/// first-use index construction may race between threads, in which case one
/// of the (identical) builds is kept.
///
/// # Example
///
/// ```no_run
/// use fs_merger::{FsMerger, RootSpec};
///
/// let merger = FsMerger::new(vec![
///     RootSpec::path("defaults"),
///     RootSpec::path("vendor/dist").with_prefix("vendor"),
///     RootSpec::path("overrides"),
/// ]);
///
/// let config = merger.fs().read_file("config.json")?;
/// for entry in merger.fs().entries("", &Default::default())? {
///     println!("{} (root {})", entry.relative_path, entry.origin);
/// }
/// # Ok::<(), fs_merger::Error>(())
/// ```
#[derive(Debug)]
pub struct FsMerger {
    specs: Vec<RootSpec>,
    fs: Arc<dyn FileSystem>,
    index: OnceLock<OverlayIndex>,
    nested: Mutex<HashMap<usize, Arc<FsMerger>>>,
}

impl FsMerger {
    /// Create a view over `roots` on the host filesystem.
    pub fn new<I, S>(roots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<RootSpec>,
    {
        Self::with_filesystem(roots, Arc::new(HostFs))
    }

    /// Create a view over `roots` on a custom filesystem capability.
    pub fn with_filesystem<I, S>(roots: I, fs: Arc<dyn FileSystem>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<RootSpec>,
    {
        Self {
            specs: roots.into_iter().map(Into::into).collect(),
            fs,
            index: OnceLock::new(),
            nested: Mutex::new(HashMap::new()),
        }
    }

    /// The root specifications, in priority order.
    pub fn specs(&self) -> &[RootSpec] {
        &self.specs
    }

    pub fn filesystem(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    /// The resolved roots, built on first call.
    pub fn index(&self) -> Result<&OverlayIndex> {
        if let Some(index) = self.index.get() {
            return Ok(index);
        }
        let built = OverlayIndex::build(&self.specs)?;
        Ok(self.index.get_or_init(|| built))
    }

    /// The gated handle exposing the allowed read operations.
    pub fn fs(&self) -> Gate<'_> {
        Gate::new(self)
    }

    /// The nested view for the root at `position`.
    ///
    /// A [`RootSpec::Group`] yields a view over its members; any other spec
    /// yields a single-root view. The same `Arc` is returned on every call.
    pub fn at(&self, position: usize) -> Result<Arc<FsMerger>> {
        let spec = self.specs.get(position).ok_or_else(|| {
            Error::invalid_argument(format!(
                "No root at index {} (view has {} roots)",
                position,
                self.specs.len()
            ))
        })?;

        let mut nested = self.nested.lock().map_err(|_| Error::LockPoisoned {
            context: "nested view cache".to_string(),
        })?;
        let view = nested.entry(position).or_insert_with(|| {
            let specs = match spec {
                RootSpec::Group(members) => members.clone(),
                other => vec![other.clone()],
            };
            Arc::new(FsMerger::with_filesystem(specs, Arc::clone(&self.fs)))
        });
        Ok(Arc::clone(view))
    }

    /// Absolute path of `relative_path` in the highest-priority root holding it.
    pub fn resolve(&self, relative_path: &str) -> Result<PathBuf> {
        resolve::resolve(self.index()?, self.fs.as_ref(), relative_path)
    }

    /// Bytes of the highest-priority match for `relative_path`.
    pub fn read_file(&self, relative_path: &str) -> Result<Vec<u8>> {
        resolve::read_file(self.index()?, self.fs.as_ref(), relative_path)
    }

    /// Location and publishing rules for `relative_path`.
    pub fn read_file_meta(
        &self,
        relative_path: &str,
        base_path: Option<&Path>,
    ) -> Result<ResolvedMeta> {
        resolve::read_file_meta(self.index()?, self.fs.as_ref(), relative_path, base_path)
    }

    /// Merged, de-duplicated names in `dir_path`.
    pub fn list_directory(&self, dir_path: &str) -> Result<Vec<String>> {
        listing::list_directory(self.index()?, self.fs.as_ref(), dir_path)
    }

    /// Merged names in `dir_path`, delivered to `on_complete` from the rayon
    /// pool.
    pub fn list_directory_async<F>(&self, dir_path: &str, on_complete: F)
    where
        F: FnOnce(Result<Vec<String>>) + Send + 'static,
    {
        match self.index() {
            Ok(index) => {
                listing::list_directory_async(index, Arc::clone(&self.fs), dir_path, on_complete)
            }
            Err(e) => on_complete(Err(e)),
        }
    }

    /// Every entry below `dir_path` across all roots, shadowed and sorted.
    pub fn collect_entries(&self, dir_path: &str, options: &WalkOptions) -> Result<Vec<Entry>> {
        entries::collect_entries(self.index()?, self.fs.as_ref(), dir_path, options)
    }
}
