//! Shared test utilities for integration and E2E tests.
//!
//! Add `mod common;` to a test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! let fixture = TestFixture::new()
//!     .with_file("dirA/lib.js", "vendored")
//!     .with_file("dirB/lib.js", "app");
//! fixture.command().arg("ls").arg("--root").arg(fixture.root("dirA"));
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
#[allow(unused_imports)]
pub mod prelude {
    pub use assert_fs::prelude::*;
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    pub use super::configs;
    pub use super::TestFixture;
}

/// Roots files used across tests.
#[allow(dead_code)]
pub mod configs {
    /// dirA published under `vendor`, dirB on top.
    pub const VENDOR_OVERLAY: &str = r#"
roots:
  - path: dirA
    prefix: vendor
  - dirB
"#;

    /// Two groups, selectable with `--at`.
    pub const GROUPS: &str = r#"
roots:
  - [dirA, dirB]
  - [dirB, dirA]
"#;

    /// Invalid YAML for error testing.
    pub const INVALID_YAML: &str = "roots: [unclosed";
}

/// A temporary directory holding one or more root directories.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// The vendor overlay scenario: `dirA/lib.js`, `dirB/lib.js`, `dirB/app.js`.
    pub fn vendor_overlay() -> Self {
        Self::new()
            .with_file("dirA/lib.js", "vendored lib")
            .with_file("dirB/lib.js", "app lib")
            .with_file("dirB/app.js", "app main")
    }

    /// Add a `fs-merger.yaml` roots file with the given content.
    pub fn with_config(self, content: &str) -> Self {
        self.temp_dir
            .child("fs-merger.yaml")
            .write_str(content)
            .expect("Failed to write roots file");
        self
    }

    /// Add a file with the given path and content, creating parents.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Add an empty directory.
    pub fn with_dir(self, path: &str) -> Self {
        self.temp_dir
            .child(path)
            .create_dir_all()
            .expect("Failed to create directory");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of a root directory inside the fixture.
    pub fn root(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Get the path to the roots file.
    pub fn config_path(&self) -> PathBuf {
        self.temp_dir.path().join("fs-merger.yaml")
    }

    /// Create a command configured to run in this fixture's directory.
    pub fn command(&self) -> assert_cmd::Command {
        #[allow(deprecated)]
        let mut cmd = assert_cmd::Command::cargo_bin("fs-merger").expect("binary is built");
        cmd.current_dir(self.path())
            .env_remove("FS_MERGER_CONFIG")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_vendor_overlay_layout() {
        let fixture = TestFixture::vendor_overlay();
        assert!(fixture.root("dirA").join("lib.js").exists());
        assert!(fixture.root("dirB").join("app.js").exists());
    }

    #[test]
    fn test_configs_parse() {
        for config in [configs::VENDOR_OVERLAY, configs::GROUPS] {
            fs_merger::config::parse(config).expect("roots file should parse");
        }
        assert!(fs_merger::config::parse(configs::INVALID_YAML).is_err());
    }
}
