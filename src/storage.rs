// SPDX-License-Identifier: GPL-3.0-only

//! Filesystem helpers for recording locations
//!
//! Listings are sorted by file name so take and frame order is stable across
//! platforms; frame filenames are zero-padded, so name order is capture order.

use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Create a directory and any missing parents (no-op if it exists)
pub fn ensure_directory(path: &Path) -> io::Result<()> {
    if !path.is_dir() {
        debug!(path = %path.display(), "Creating directory");
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Immediate subdirectories of `path`, sorted by name
pub fn list_subdirectories(path: &Path) -> io::Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Files in `path` with the given extension (case-insensitive), sorted by name
pub fn list_files_with_extension(path: &Path, extension: &str) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        let file_path = entry.path();
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some(ext) = file_path.extension()
            && ext.to_string_lossy().eq_ignore_ascii_case(extension)
        {
            files.push(file_path);
        }
    }
    files.sort();
    Ok(files)
}

/// Check whether a directory holds any entries at all
pub fn has_entries(path: &Path) -> bool {
    std::fs::read_dir(path)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

pub fn remove_file(path: &Path) -> io::Result<()> {
    std::fs::remove_file(path)
}

/// Last path component as a string (empty for paths like `/`)
pub fn file_name_string(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.raw", "a.raw", "c.png", "d.RAW"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("e.raw")).unwrap();

        let files = list_files_with_extension(dir.path(), "raw").unwrap();
        let names: Vec<String> = files.iter().map(|p| file_name_string(p)).collect();
        assert_eq!(names, vec!["a.raw", "b.raw", "d.RAW"]);
    }

    #[test]
    fn test_list_subdirectories_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("TAKE_2")).unwrap();
        std::fs::create_dir(dir.path().join("TAKE_1")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let dirs = list_subdirectories(dir.path()).unwrap();
        let names: Vec<String> = dirs.iter().map(|p| file_name_string(p)).collect();
        assert_eq!(names, vec!["TAKE_1", "TAKE_2"]);
    }

    #[test]
    fn test_ensure_directory_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_directory(&nested).unwrap();
        ensure_directory(&nested).unwrap();
        assert!(nested.is_dir());
        assert!(!has_entries(&nested));
    }

    #[test]
    fn test_list_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_files_with_extension(&dir.path().join("nope"), "raw").is_err());
    }
}
