use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory holding a sterne configuration for CLI tests.
pub struct TestProject {
    pub dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the project root, creating parent dirs as needed.
    pub fn write_file(&self, relative_path: &str, content: &str) {
        let full = self.dir.path().join(relative_path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).expect("failed to create parent dirs");
        }
        std::fs::write(&full, content).expect("failed to write file");
    }

    /// Initialize sterne in this directory.
    pub fn sterne_init(&self) {
        std::process::Command::new(Self::sterne_bin())
            .arg("init")
            .arg(self.path())
            .output()
            .expect("sterne init failed");
    }

    /// Return the path to the sterne binary (built via cargo).
    pub fn sterne_bin() -> PathBuf {
        // assert_cmd finds the binary automatically via cargo
        PathBuf::from(env!("CARGO_BIN_EXE_sterne"))
    }
}
