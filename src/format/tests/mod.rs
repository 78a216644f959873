//! Unit tests for mask file persistence.
//!
//! These tests verify loading, validation, saving and the batch tools.

mod tools_tests;

use std::path::PathBuf;

/// Fresh scratch directory for one test.
fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("polymask-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
