//! Directory listings merged across roots
//!
//! Unlike resolution, listings scan roots from lowest to highest priority.
//! Names are de-duplicated in first-seen order and are not sorted.

use crate::error::{Error, Result};
use crate::filesystem::FileSystem;
use crate::index::OverlayIndex;
use crate::path::{compose, ensure_relative};
use log::debug;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Union of name lists, keeping the first occurrence of each name.
fn union<I>(lists: I) -> Vec<String>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for name in lists.into_iter().flatten() {
        if seen.insert(name.clone()) {
            names.push(name);
        }
    }
    names
}

/// The composed directory path in every root, ascending, split into those
/// that exist and the last one probed.
fn candidate_dirs(
    index: &OverlayIndex,
    fs: &dyn FileSystem,
    dir_path: &str,
) -> (Vec<PathBuf>, Option<PathBuf>) {
    let mut existing = Vec::new();
    let mut last = None;

    for (position, descriptor) in index.ascending() {
        let full_dir = compose(descriptor.root(), dir_path);
        if fs.exists(&full_dir) {
            existing.push(full_dir.clone());
        } else {
            debug!("Root {} has no directory {:?}", position, dir_path);
        }
        last = Some(full_dir);
    }

    (existing, last)
}

fn absent_everywhere(dir_path: &str) -> Error {
    Error::NotFound {
        path: dir_path.to_string(),
    }
}

/// List `dir_path` across all roots, blocking.
///
/// When the directory is absent from every root the filesystem's own
/// not-found error is returned.
pub fn list_directory(
    index: &OverlayIndex,
    fs: &dyn FileSystem,
    dir_path: &str,
) -> Result<Vec<String>> {
    ensure_relative(dir_path)?;
    let (existing, last) = candidate_dirs(index, fs, dir_path);

    if existing.is_empty() {
        return match last {
            Some(path) => fs.read_dir(&path),
            None => Err(absent_everywhere(dir_path)),
        };
    }

    let mut lists = Vec::with_capacity(existing.len());
    for dir in &existing {
        lists.push(fs.read_dir(dir)?);
    }
    Ok(union(lists))
}

/// Shared completion state for one asynchronous listing
struct PendingListing<F> {
    slots: Vec<Option<Vec<String>>>,
    remaining: usize,
    on_complete: Option<F>,
}

impl<F> PendingListing<F>
where
    F: FnOnce(Result<Vec<String>>),
{
    /// Record one finished read. Returns the callback and its outcome once
    /// the listing is decided; afterwards every further read is ignored.
    fn record(
        &mut self,
        slot: usize,
        result: Result<Vec<String>>,
    ) -> Option<(F, Result<Vec<String>>)> {
        if self.on_complete.is_none() {
            return None;
        }

        match result {
            Err(e) => self.on_complete.take().map(|f| (f, Err(e))),
            Ok(names) => {
                self.slots[slot] = Some(names);
                self.remaining -= 1;
                if self.remaining > 0 {
                    return None;
                }
                let merged = union(self.slots.iter_mut().filter_map(Option::take));
                self.on_complete.take().map(|f| (f, Ok(merged)))
            }
        }
    }
}

/// List `dir_path` across all roots without blocking the caller.
///
/// One read per root containing the directory is started on the rayon
/// pool, all at once. `on_complete` runs exactly once, on a pool thread: with
/// the merged names after every read succeeded, or with the first error.
/// Reads still in flight after an error are left to finish and ignored.
///
/// Argument errors are reported through `on_complete` before returning.
pub fn list_directory_async<F>(
    index: &OverlayIndex,
    fs: Arc<dyn FileSystem>,
    dir_path: &str,
    on_complete: F,
) where
    F: FnOnce(Result<Vec<String>>) + Send + 'static,
{
    if let Err(e) = ensure_relative(dir_path) {
        on_complete(Err(e));
        return;
    }

    let (existing, last) = candidate_dirs(index, fs.as_ref(), dir_path);

    if existing.is_empty() {
        match last {
            Some(path) => rayon::spawn(move || on_complete(fs.read_dir(&path))),
            None => on_complete(Err(absent_everywhere(dir_path))),
        }
        return;
    }

    let state = Arc::new(Mutex::new(PendingListing {
        slots: vec![None; existing.len()],
        remaining: existing.len(),
        on_complete: Some(on_complete),
    }));

    for (slot, dir) in existing.into_iter().enumerate() {
        let fs = Arc::clone(&fs);
        let state = Arc::clone(&state);
        rayon::spawn(move || {
            let result = fs.read_dir(&dir);
            let decided = {
                let mut pending = match state.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                pending.record(slot, result)
            };
            if let Some((callback, outcome)) = decided {
                callback(outcome);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::MemoryFS;
    use crate::root::RootSpec;
    use std::sync::mpsc;

    fn setup() -> (OverlayIndex, Arc<dyn FileSystem>) {
        let mut fs = MemoryFS::new();
        fs.add_file_string("/a/dir/one.txt", "").unwrap();
        fs.add_file_string("/a/dir/shared.txt", "").unwrap();
        fs.add_file_string("/b/dir/shared.txt", "").unwrap();
        fs.add_file_string("/b/dir/two.txt", "").unwrap();
        fs.add_file_string("/b/conflict", "a file here").unwrap();
        fs.add_file_string("/a/conflict/inner.txt", "").unwrap();

        let index = OverlayIndex::build(&[
            RootSpec::path("/a"),
            RootSpec::path("/missing"),
            RootSpec::path("/b"),
        ])
        .unwrap();
        (index, Arc::new(fs))
    }

    #[test]
    fn test_union_keeps_first_occurrence() {
        let merged = union(vec![
            vec!["b".to_string(), "a".to_string()],
            vec!["a".to_string(), "c".to_string(), "b".to_string()],
        ]);
        assert_eq!(merged, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_list_directory_merges_without_duplicates() {
        let (index, fs) = setup();
        let names = list_directory(&index, fs.as_ref(), "dir").unwrap();
        // ascending priority: /a first, then /b
        assert_eq!(names, vec!["one.txt", "shared.txt", "two.txt"]);
    }

    #[test]
    fn test_list_directory_trailing_slash() {
        let (index, fs) = setup();
        let names = list_directory(&index, fs.as_ref(), "dir/").unwrap();
        assert_eq!(names.len(), 3);
    }

    #[test]
    fn test_list_directory_absent_everywhere_propagates_io_error() {
        let (index, fs) = setup();
        let err = list_directory(&index, fs.as_ref(), "nowhere").unwrap_err();
        assert!(matches!(err, Error::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound));
    }

    #[test]
    fn test_list_directory_empty_index_is_not_found() {
        let index = OverlayIndex::build(&[]).unwrap();
        let fs = MemoryFS::new();
        let err = list_directory(&index, &fs, "").unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn test_list_directory_read_failure_propagates() {
        let (index, fs) = setup();
        // "conflict" is a directory under /a and a file under /b
        let err = list_directory(&index, fs.as_ref(), "conflict").unwrap_err();
        assert_eq!(
            err.io_error().map(|e| e.kind()),
            Some(std::io::ErrorKind::NotADirectory)
        );
    }

    #[test]
    fn test_list_directory_async_delivers_merged_names() {
        let (index, fs) = setup();
        let (tx, rx) = mpsc::channel();
        list_directory_async(&index, fs, "dir", move |result| {
            tx.send(result).unwrap();
        });

        let names = rx.recv().unwrap().unwrap();
        assert_eq!(names, vec!["one.txt", "shared.txt", "two.txt"]);
        // the callback is gone after its single invocation
        assert!(rx.recv().is_err());
    }

    #[test]
    fn test_list_directory_async_delivers_first_error_once() {
        let (index, fs) = setup();
        let (tx, rx) = mpsc::channel();
        list_directory_async(&index, fs, "conflict", move |result| {
            tx.send(result).unwrap();
        });

        let err = rx.recv().unwrap().unwrap_err();
        assert_eq!(
            err.io_error().map(|e| e.kind()),
            Some(std::io::ErrorKind::NotADirectory)
        );
        assert!(rx.recv().is_err());
    }

    #[test]
    fn test_list_directory_async_absent_everywhere() {
        let (index, fs) = setup();
        let (tx, rx) = mpsc::channel();
        list_directory_async(&index, fs, "nowhere", move |result| {
            tx.send(result).unwrap();
        });
        assert!(rx.recv().unwrap().unwrap_err().is_not_found());
    }

    #[test]
    fn test_list_directory_async_rejects_absolute_path() {
        let (index, fs) = setup();
        let (tx, rx) = mpsc::channel();
        list_directory_async(&index, fs, "/dir", move |result| {
            tx.send(result).unwrap();
        });
        let err = rx.recv().unwrap().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }
}
