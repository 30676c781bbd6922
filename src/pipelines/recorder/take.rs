// SPDX-License-Identifier: GPL-3.0-only

//! Takes: one folder per recording session
//!
//! The [`TakeList`] owns every [`Take`]. Anything else (the encode queue in
//! particular) refers to takes by [`TakeId`]; an id whose take was dropped
//! by a rescan simply stops resolving.

use super::frame::FrameName;
use crate::constants::layout;
use crate::storage;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Generate a take folder name from a wall-clock time
///
/// `TAKE_<MM>_<DD>_<HH>_<mm>_<SS>`: zero-padded so names sort by creation
/// order within a year.
pub fn take_folder_name(now: DateTime<Local>) -> String {
    format!("{}_{}", layout::TAKE_PREFIX, now.format("%m_%d_%H_%M_%S"))
}

/// A recording session scanned from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Take {
    /// Folder name, generated from the recording start time
    pub name: String,
    pub root: PathBuf,
    pub depth_folder: PathBuf,
    pub color_folder: PathBuf,
    /// Depth frames still stored raw
    pub uncompressed_frames: usize,
    /// Depth frames already compressed
    pub compressed_frames: usize,
    pub has_depth: bool,
    pub has_color: bool,
    /// Timestamp of the latest depth frame, from its filename
    pub duration_ms: Option<u64>,
}

impl Take {
    /// Scan a take folder
    ///
    /// `compressed_extension` is the extension the compressor writes. Never
    /// fails: missing subfolders just produce zero counts and
    /// `has_depth == false`.
    pub fn load_from_folder(root: &Path, compressed_extension: &str) -> Self {
        let depth_folder = root.join(layout::DEPTH_FOLDER);
        let color_folder = root.join(layout::COLOR_FOLDER);

        let raw = storage::list_files_with_extension(&depth_folder, layout::RAW_EXTENSION)
            .unwrap_or_default();
        let compressed =
            storage::list_files_with_extension(&depth_folder, compressed_extension)
                .unwrap_or_default();

        let duration_ms = raw
            .iter()
            .chain(compressed.iter())
            .filter_map(|path| FrameName::from_path(path))
            .map(|name| name.timestamp_ms)
            .max();

        let take = Self {
            name: storage::file_name_string(root),
            root: root.to_path_buf(),
            has_depth: !raw.is_empty() || !compressed.is_empty(),
            has_color: storage::has_entries(&color_folder),
            uncompressed_frames: raw.len(),
            compressed_frames: compressed.len(),
            depth_folder,
            color_folder,
            duration_ms,
        };

        debug!(
            take = %take.name,
            raw = take.uncompressed_frames,
            compressed = take.compressed_frames,
            "Scanned take"
        );

        take
    }

    pub fn total_frames(&self) -> usize {
        self.uncompressed_frames + self.compressed_frames
    }

    /// All depth frames are compressed
    pub fn is_fully_compressed(&self) -> bool {
        self.uncompressed_frames == 0
    }
}

/// Scan every take in a recording location
///
/// Reserved folders are skipped. Folders without depth frames are
/// discarded with a warning.
pub fn scan_takes(location: &Path, compressed_extension: &str) -> std::io::Result<Vec<Take>> {
    let mut takes = Vec::new();

    for dir in storage::list_subdirectories(location)? {
        let name = storage::file_name_string(&dir);
        if layout::is_reserved_folder(&name) {
            continue;
        }

        let take = Take::load_from_folder(&dir, compressed_extension);
        if take.has_depth {
            takes.push(take);
        } else {
            warn!(path = %dir.display(), "Take has no depth images, skipping");
        }
    }

    Ok(takes)
}

/// Handle to a take owned by a [`TakeList`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TakeId(u64);

/// Owner of all known takes
#[derive(Debug, Default)]
pub struct TakeList {
    takes: Vec<(TakeId, Take)>,
    next_id: u64,
}

impl TakeList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `take`, returning its handle
    pub fn insert(&mut self, take: Take) -> TakeId {
        let id = TakeId(self.next_id);
        self.next_id += 1;
        self.takes.push((id, take));
        id
    }

    /// Drop every take. Ids are never reused, so old handles stop resolving.
    pub fn clear(&mut self) {
        self.takes.clear();
    }

    pub fn get(&self, id: TakeId) -> Option<&Take> {
        self.takes.iter().find(|(i, _)| *i == id).map(|(_, t)| t)
    }

    pub fn get_mut(&mut self, id: TakeId) -> Option<&mut Take> {
        self.takes.iter_mut().find(|(i, _)| *i == id).map(|(_, t)| t)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Take> {
        self.takes.iter().map(|(_, t)| t)
    }

    pub fn len(&self) -> usize {
        self.takes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.takes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_take(root: &Path, raw: &[&str], png: &[&str]) {
        let depth = root.join(layout::DEPTH_FOLDER);
        std::fs::create_dir_all(&depth).unwrap();
        std::fs::create_dir_all(root.join(layout::COLOR_FOLDER)).unwrap();
        for name in raw.iter().chain(png.iter()) {
            std::fs::write(depth.join(name), b"").unwrap();
        }
    }

    #[test]
    fn test_take_folder_name_is_padded() {
        let time = Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 2).unwrap();
        assert_eq!(take_folder_name(time), "TAKE_03_07_09_05_02");
    }

    #[test]
    fn test_load_counts_frames() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("TAKE_01_01_00_00_00");
        make_take(
            &root,
            &["f_00002_millis_0000000066.raw"],
            &["f_00000_millis_0000000000.png", "f_00001_millis_0000000033.png"],
        );

        let take = Take::load_from_folder(&root, layout::COMPRESSED_EXTENSION);
        assert_eq!(take.name, "TAKE_01_01_00_00_00");
        assert_eq!(take.uncompressed_frames, 1);
        assert_eq!(take.compressed_frames, 2);
        assert_eq!(take.total_frames(), 3);
        assert!(take.has_depth);
        assert!(!take.has_color);
        assert_eq!(take.duration_ms, Some(66));
    }

    #[test]
    fn test_load_counts_custom_extension() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("TAKE_01_01_00_00_01");
        make_take(
            &root,
            &[],
            &["f_00000_millis_0000000000.jp2", "f_00001_millis_0000000033.png"],
        );

        let take = Take::load_from_folder(&root, "jp2");
        assert_eq!(take.compressed_frames, 1);
        assert!(take.has_depth);
        assert!(take.is_fully_compressed());

        // Files from another codec are not frames of this take
        let only_other = dir.path().join("TAKE_01_01_00_00_02");
        make_take(&only_other, &[], &["f_00000_millis_0000000000.png"]);
        assert!(!Take::load_from_folder(&only_other, "jp2").has_depth);
    }

    #[test]
    fn test_load_missing_folder() {
        let dir = tempfile::tempdir().unwrap();
        let take = Take::load_from_folder(&dir.path().join("gone"), layout::COMPRESSED_EXTENSION);
        assert!(!take.has_depth);
        assert_eq!(take.total_frames(), 0);
        assert_eq!(take.duration_ms, None);
    }

    #[test]
    fn test_scan_skips_reserved_and_empty() {
        let dir = tempfile::tempdir().unwrap();
        make_take(&dir.path().join("TAKE_A"), &["f_00000_millis_0000000000.raw"], &[]);
        make_take(&dir.path().join("TAKE_B"), &[], &[]);
        make_take(
            &dir.path().join(layout::CALIBRATION_FOLDER),
            &["f_00000_millis_0000000000.raw"],
            &[],
        );

        let takes = scan_takes(dir.path(), layout::COMPRESSED_EXTENSION).unwrap();
        assert_eq!(takes.len(), 1);
        assert_eq!(takes[0].name, "TAKE_A");
    }

    #[test]
    fn test_cleared_ids_stop_resolving() {
        let dir = tempfile::tempdir().unwrap();
        let mut list = TakeList::new();
        let first = list.insert(Take::load_from_folder(dir.path(), "png"));
        assert!(list.get(first).is_some());

        list.clear();
        let second = list.insert(Take::load_from_folder(dir.path(), "png"));
        assert!(list.get(first).is_none());
        assert_ne!(first, second);
        assert_eq!(list.len(), 1);
    }
}
