//! Property-based tests for path manipulation functions.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::path::{compose, ensure_relative, join_posix, normalize, regex_rename};
    use proptest::prelude::*;
    use regex::Regex;
    use std::path::{Path, PathBuf};

    fn segment() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9_][a-zA-Z0-9_.-]{0,8}".prop_filter("dot segments are not plain names", |s| {
            s != "." && s != ".."
        })
    }

    fn relative_path() -> impl Strategy<Value = String> {
        prop::collection::vec(segment(), 1..6).prop_map(|segments| segments.join("/"))
    }

    // ============================================================================
    // normalize property tests
    // ============================================================================

    proptest! {
        /// Property: normalizing twice changes nothing
        #[test]
        fn normalize_is_idempotent(path in "(/)?([a-z]{1,3}|\\.|\\.\\.)(/([a-z]{1,3}|\\.|\\.\\.)){0,6}") {
            let once = normalize(Path::new(&path));
            let twice = normalize(&once);
            prop_assert_eq!(once, twice);
        }

        /// Property: absolute inputs never normalize to a path containing ".."
        #[test]
        fn normalize_absolute_has_no_parent_components(
            path in "/([a-z]{1,3}|\\.\\.)(/([a-z]{1,3}|\\.\\.)){0,6}"
        ) {
            let normalized = normalize(Path::new(&path));
            prop_assert!(normalized.is_absolute());
            prop_assert!(!normalized.components().any(|c| c.as_os_str() == ".."));
        }
    }

    // ============================================================================
    // ensure_relative property tests
    // ============================================================================

    proptest! {
        /// Property: plain segment paths are accepted
        #[test]
        fn plain_relative_paths_are_accepted(path in relative_path()) {
            prop_assert!(ensure_relative(&path).is_ok());
        }

        /// Property: any path with a leading slash is rejected
        #[test]
        fn absolute_paths_are_rejected(path in relative_path()) {
            let absolute = format!("/{}", path);
            prop_assert!(ensure_relative(&absolute).is_err());
        }

        /// Property: parent components never make a relative path invalid
        #[test]
        fn parent_components_stay_relative(segments in prop::collection::vec(segment(), 0..5)) {
            let mut parts: Vec<String> = segments.clone();
            parts.extend(std::iter::repeat("..".to_string()).take(segments.len() + 1));
            let path = parts.join("/");
            prop_assert!(ensure_relative(&path).is_ok());
        }
    }

    // ============================================================================
    // join_posix / compose property tests
    // ============================================================================

    proptest! {
        /// Property: joining onto an empty base is the identity for plain paths
        #[test]
        fn join_posix_empty_base_is_identity(path in relative_path()) {
            prop_assert_eq!(join_posix("", &path), path);
        }

        /// Property: the joined path starts with the base and ends with the relative path
        #[test]
        fn join_posix_concatenates_plain_paths(base in relative_path(), path in relative_path()) {
            let joined = join_posix(&base, &path);
            prop_assert_eq!(joined, format!("{}/{}", base, path));
        }

        /// Property: join_posix never yields empty segments
        #[test]
        fn join_posix_has_no_empty_segments(base in "[a-z/]{0,12}", path in "[a-z/.]{0,12}") {
            let joined = join_posix(&base, &path);
            prop_assert!(!joined.is_empty());
            prop_assert!(!joined.split('/').any(|s| s.is_empty()));
        }

        /// Property: compose ignores trailing slashes on the relative path
        #[test]
        fn compose_ignores_trailing_slashes(path in relative_path(), slashes in "/{0,3}") {
            let root = PathBuf::from("/root");
            let with_slashes = format!("{}{}", path, slashes);
            prop_assert_eq!(compose(&root, &with_slashes), compose(&root, &path));
            prop_assert!(compose(&root, &path).starts_with(&root));
        }
    }

    // ============================================================================
    // regex_rename property tests
    // ============================================================================

    proptest! {
        /// Property: non-matching paths are left to the caller
        #[test]
        fn regex_rename_non_match_returns_none(path in "[a-z]+") {
            let regex = Regex::new(r"^\d+$").unwrap();
            prop_assert!(regex_rename(&regex, "$0", &path).is_none());
        }

        /// Property: extension swaps keep the stem
        #[test]
        fn regex_rename_swaps_extension(stem in relative_path()) {
            let regex = Regex::new(r"^(.*)\.mjs$").unwrap();
            let renamed = regex_rename(&regex, "$1.js", &format!("{}.mjs", stem));
            prop_assert_eq!(renamed, Some(format!("{}.js", stem)));
        }
    }
}
