// SPDX-License-Identifier: GPL-3.0-only

//! Queued depth frames and their on-disk filenames

use crate::constants::layout;
use std::path::{Path, PathBuf};

/// A depth frame waiting to be written as a raw file
///
/// Owned by the save queue until the persistence worker pops it; moved back
/// into the queue if the write fails.
#[derive(Debug)]
pub struct QueuedFrame {
    /// Milliseconds since the take started
    pub timestamp_ms: u64,
    /// Deep copy of the submitted samples (always `width * height` long)
    pub pixels: Box<[u16]>,
    /// Take depth folder the frame belongs in
    pub directory: PathBuf,
    pub filename: String,
    /// Failed write attempts so far
    pub attempts: u32,
}

impl QueuedFrame {
    pub fn new(timestamp_ms: u64, pixels: Box<[u16]>, directory: PathBuf, filename: String) -> Self {
        Self {
            timestamp_ms,
            pixels,
            directory,
            filename,
            attempts: 0,
        }
    }

    /// Full destination path of the raw file
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.filename)
    }
}

/// Parsed form of `<prefix>_<sequence>_millis_<timestamp>.<ext>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameName {
    pub prefix: String,
    pub sequence: u32,
    pub timestamp_ms: u64,
}

impl FrameName {
    pub fn new(prefix: &str, sequence: u32, timestamp_ms: u64) -> Self {
        Self {
            prefix: prefix.to_string(),
            sequence,
            timestamp_ms,
        }
    }

    /// Raw filename, zero-padded so name order matches capture order
    pub fn raw_filename(&self) -> String {
        self.filename_with_extension(layout::RAW_EXTENSION)
    }

    pub fn filename_with_extension(&self, extension: &str) -> String {
        format!(
            "{}_{:05}_{}_{:010}.{}",
            self.prefix,
            self.sequence,
            layout::MILLIS_MARKER,
            self.timestamp_ms,
            extension
        )
    }

    /// Parse a frame filename (any extension)
    ///
    /// The prefix may itself contain underscores, so fields are taken from
    /// the right.
    pub fn parse(file_name: &str) -> Option<Self> {
        let (stem, _ext) = file_name.rsplit_once('.')?;
        let mut parts = stem.rsplitn(4, '_');

        let timestamp_ms = parts.next()?.parse().ok()?;
        if parts.next()? != layout::MILLIS_MARKER {
            return None;
        }
        let sequence = parts.next()?.parse().ok()?;
        let prefix = parts.next()?;
        if prefix.is_empty() {
            return None;
        }

        Some(Self {
            prefix: prefix.to_string(),
            sequence,
            timestamp_ms,
        })
    }

    /// Parse the file name component of a path
    pub fn from_path(path: &Path) -> Option<Self> {
        Self::parse(path.file_name()?.to_str()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_filename_padding() {
        let name = FrameName::new("frame", 7, 1234);
        assert_eq!(name.raw_filename(), "frame_00007_millis_0000001234.raw");
    }

    #[test]
    fn test_parse_prefix_with_underscores() {
        let parsed = FrameName::parse("my_kinect_00012_millis_0000045000.png").unwrap();
        assert_eq!(parsed, FrameName::new("my_kinect", 12, 45000));
    }

    #[test]
    fn test_parse_rejects_foreign_names() {
        assert!(FrameName::parse("frame_00001_0000000001.raw").is_none());
        assert!(FrameName::parse("notes.txt").is_none());
        assert!(FrameName::parse("_00001_millis_0000000001.raw").is_none());
        assert!(FrameName::parse("frame_00001_millis_abc.raw").is_none());
    }

    #[test]
    fn test_queued_frame_path() {
        let frame = QueuedFrame::new(
            0,
            vec![0u16; 4].into_boxed_slice(),
            PathBuf::from("/tmp/take/depth"),
            "frame_00000_millis_0000000000.raw".to_string(),
        );
        assert_eq!(
            frame.path(),
            PathBuf::from("/tmp/take/depth/frame_00000_millis_0000000000.raw")
        );
        assert_eq!(frame.attempts, 0);
    }
}
