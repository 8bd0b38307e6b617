//! # Roots File Schema and Parsing
//!
//! The `fs-merger` command line reads its roots from a YAML file. The file
//! lists roots from lowest to highest priority:
//!
//! ```yaml
//! roots:
//!   - lib                       # plain path
//!   - path: vendor/dist         # explicit descriptor
//!     prefix: vendor
//!     rename:                   # optional destination mapper
//!       from: '^(.*)\.mjs$'
//!       to: '$1.js'
//!   - [a, b]                    # nested group, selected with --at
//! ```
//!
//! A bare top-level list (without the `roots:` key) is accepted as well.
//! Relative root paths are resolved against the directory holding the file.

use crate::error::{Error, Result};
use crate::root::{DestinationMapper, RootSpec};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default roots file name looked up in the current directory
pub const DEFAULT_CONFIG_FILENAME: &str = "fs-merger.yaml";

/// Regex rename rule used as a destination mapper
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenameRule {
    /// Regex matched against each relative path
    pub from: String,
    /// Replacement; `$1`, `$2`, ... reference capture groups
    pub to: String,
}

/// An explicit root descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DescriptorEntry {
    pub path: String,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub rename: Option<RenameRule>,
}

/// One entry of the `roots` list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RootEntry {
    Path(String),
    Group(Vec<RootEntry>),
    Descriptor(DescriptorEntry),
}

/// A parsed roots file
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RootsFile {
    #[serde(default)]
    pub roots: Vec<RootEntry>,
}

impl RootsFile {
    /// Convert every entry into a [`RootSpec`], resolving relative paths
    /// against `base_dir`.
    pub fn into_specs(self, base_dir: &Path) -> Result<Vec<RootSpec>> {
        self.roots
            .into_iter()
            .map(|entry| entry.into_spec(base_dir))
            .collect()
    }
}

impl RootEntry {
    pub fn into_spec(self, base_dir: &Path) -> Result<RootSpec> {
        match self {
            RootEntry::Path(path) => Ok(RootSpec::Path(root_path(base_dir, &path)?)),
            RootEntry::Group(members) => Ok(RootSpec::Group(
                members
                    .into_iter()
                    .map(|m| m.into_spec(base_dir))
                    .collect::<Result<Vec<_>>>()?,
            )),
            RootEntry::Descriptor(descriptor) => {
                let destination_mapper = descriptor
                    .rename
                    .map(|rule| DestinationMapper::regex(&rule.from, &rule.to))
                    .transpose()?;
                Ok(RootSpec::Descriptor {
                    root: root_path(base_dir, &descriptor.path)?,
                    prefix: descriptor.prefix,
                    destination_mapper,
                })
            }
        }
    }
}

fn root_path(base_dir: &Path, path: &str) -> Result<PathBuf> {
    if path.trim().is_empty() {
        return Err(Error::ConfigParse {
            message: "Root entry has an empty path".to_string(),
            hint: Some("Every root needs a directory, e.g. '- path: vendor/dist'".to_string()),
        });
    }
    Ok(base_dir.join(path))
}

/// Parse a roots file.
///
/// Accepts the `roots:` mapping form and, failing that, a bare list.
/// Malformed YAML is reported as [`Error::Yaml`]; well-formed YAML of the
/// wrong shape as [`Error::ConfigParse`].
pub fn parse(yaml_content: &str) -> Result<RootsFile> {
    if yaml_content.trim().is_empty() {
        return Ok(RootsFile::default());
    }
    let value: serde_yaml::Value = serde_yaml::from_str(yaml_content)?;
    if value.is_null() {
        return Ok(RootsFile::default());
    }

    match serde_yaml::from_value::<RootsFile>(value.clone()) {
        Ok(file) => Ok(file),
        Err(mapping_error) => match serde_yaml::from_value::<Vec<RootEntry>>(value) {
            Ok(roots) => Ok(RootsFile { roots }),
            Err(_) => Err(Error::ConfigParse {
                message: mapping_error.to_string(),
                hint: Some(
                    "Expected a 'roots:' list of paths or {path, prefix, rename} entries"
                        .to_string(),
                ),
            }),
        },
    }
}

/// Load a roots file and convert it into root specifications.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Vec<RootSpec>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    let base_dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    parse(&content)?.into_specs(&base_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_mixed_roots() {
        let yaml = r#"
roots:
  - lib
  - path: vendor/dist
    prefix: vendor
    rename:
      from: '^(.*)\.mjs$'
      to: '$1.js'
  - [a, b]
"#;
        let file = parse(yaml).unwrap();
        assert_eq!(file.roots.len(), 3);
        assert_eq!(file.roots[0], RootEntry::Path("lib".to_string()));
        match &file.roots[1] {
            RootEntry::Descriptor(d) => {
                assert_eq!(d.path, "vendor/dist");
                assert_eq!(d.prefix.as_deref(), Some("vendor"));
                assert_eq!(d.rename.as_ref().unwrap().to, "$1.js");
            }
            other => panic!("Expected descriptor, got {:?}", other),
        }
        assert!(matches!(&file.roots[2], RootEntry::Group(members) if members.len() == 2));
    }

    #[test]
    fn test_parse_bare_list() {
        let file = parse("- one\n- two\n").unwrap();
        assert_eq!(file.roots.len(), 2);
    }

    #[test]
    fn test_parse_rejects_unknown_fields() {
        let err = parse("roots:\n  - path: a\n    prefx: oops\n").unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
        assert!(err.to_string().contains("hint:"));
    }

    #[test]
    fn test_parse_malformed_yaml() {
        let err = parse("roots: [unclosed").unwrap_err();
        assert!(matches!(err, Error::Yaml(_)));
    }

    #[test]
    fn test_parse_empty_document() {
        assert!(parse("").unwrap().roots.is_empty());
    }

    #[test]
    fn test_into_specs_resolves_against_base_dir() {
        let file = parse("roots:\n  - lib\n  - path: dist\n    prefix: p\n").unwrap();
        let specs = file.into_specs(Path::new("/project")).unwrap();
        match &specs[0] {
            RootSpec::Path(p) => assert_eq!(p, Path::new("/project/lib")),
            other => panic!("Expected plain path, got {:?}", other),
        }
        match &specs[1] {
            RootSpec::Descriptor { root, prefix, .. } => {
                assert_eq!(root, Path::new("/project/dist"));
                assert_eq!(prefix.as_deref(), Some("p"));
            }
            other => panic!("Expected descriptor, got {:?}", other),
        }
    }

    #[test]
    fn test_into_specs_invalid_regex() {
        let file = parse("roots:\n  - path: a\n    rename: {from: '(', to: x}\n").unwrap();
        let err = file.into_specs(Path::new("/")).unwrap_err();
        assert!(matches!(err, Error::Regex(_)));
    }

    #[test]
    fn test_empty_path_is_rejected() {
        let file = parse("roots:\n  - ''\n").unwrap();
        assert!(file.into_specs(Path::new("/")).is_err());
    }

    #[test]
    fn test_from_file() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("fs-merger.yaml");
        std::fs::write(&config, "roots:\n  - base\n  - [x, y]\n").unwrap();

        let specs = from_file(&config).unwrap();
        assert_eq!(specs.len(), 2);
        match &specs[0] {
            RootSpec::Path(p) => assert_eq!(p, &temp.path().join("base")),
            other => panic!("Expected plain path, got {:?}", other),
        }
        assert!(matches!(&specs[1], RootSpec::Group(m) if m.len() == 2));
    }

    #[test]
    fn test_from_file_missing() {
        let err = from_file("/nonexistent/fs-merger.yaml").unwrap_err();
        assert!(err.is_not_found());
    }
}
