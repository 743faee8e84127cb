use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::models::IndexFailure;

/// Enumerate every regular file under `root`, recursively.
///
/// Traversal errors (unreadable directory, vanished entry, missing
/// root) are collected as failures rather than aborting the walk, so
/// one bad subtree never hides the rest of the folder.
pub fn collect_files(root: &Path) -> (Vec<PathBuf>, Vec<IndexFailure>) {
    let mut files = Vec::new();
    let mut failures = Vec::new();

    for entry in WalkDir::new(root) {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() {
                    files.push(entry.into_path());
                }
            }
            Err(err) => {
                let path = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf());
                failures.push(IndexFailure::new(path, err.to_string()));
            }
        }
    }

    (files, failures)
}
