//! Locating sample documents and writing temporary ones.

use std::path::{Path, PathBuf};

use covjson_protocol::CoverageJson;
use tempfile::TempDir;

/// Directory holding the decoder's sample `.covjson` documents.
pub fn testdata_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("coverage-decoder")
        .join("testdata")
}

/// Find a sample document by file name.
///
/// `TEST_DATA_DIR` is searched first, then [`testdata_dir`].
pub fn find_test_file(name: &str) -> Option<PathBuf> {
    let override_dir = std::env::var_os("TEST_DATA_DIR").map(PathBuf::from);

    override_dir
        .into_iter()
        .chain(std::iter::once(testdata_dir()))
        .map(|dir| dir.join(name))
        .find(|path| path.is_file())
}

/// Serialize `document` into a fresh temporary directory.
///
/// The directory is removed when the returned [`TempDir`] is dropped, so
/// keep it alive for as long as the path is used.
pub fn write_temp_document(name: &str, document: &CoverageJson) -> (TempDir, PathBuf) {
    let dir = tempfile::Builder::new()
        .prefix("covjson_")
        .tempdir()
        .expect("Failed to create temporary test directory");
    let path = dir.path().join(name);
    let json = serde_json::to_vec_pretty(document).expect("fixture documents serialize");
    std::fs::write(&path, json).expect("Failed to write temporary document");
    (dir, path)
}
