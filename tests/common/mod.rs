#![allow(dead_code)]

pub use taskprint_test_utils::builders;
pub use taskprint_test_utils::fake_snapshot::FakeSnapshotProvider;
pub use taskprint_test_utils::{init_tracing, with_timeout};

use std::error::Error;
use std::fs;
use std::path::Path;

pub type TestResult = Result<(), Box<dyn Error>>;

/// Write `(relative path, content)` files below `root`, creating parents.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) -> std::io::Result<()> {
    for (path, content) in files {
        let full = root.join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(full, content)?;
    }
    Ok(())
}
