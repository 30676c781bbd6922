// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Depth frame geometry
pub mod frame {
    /// Default depth frame width (Kinect-class sensors)
    pub const DEFAULT_WIDTH: u32 = 640;

    /// Default depth frame height
    pub const DEFAULT_HEIGHT: u32 = 480;

    /// Bytes per depth sample
    pub const BYTES_PER_SAMPLE: usize = std::mem::size_of::<u16>();
}

/// On-disk layout of a recording location
///
/// ```text
/// <location>/<take>/depth/<prefix>_00000_millis_0000000000.raw
/// <location>/<take>/color/
/// ```
pub mod layout {
    /// Subfolder of a take holding depth frames
    pub const DEPTH_FOLDER: &str = "depth";

    /// Subfolder of a take holding colour frames
    pub const COLOR_FOLDER: &str = "color";

    /// Calibration data shared by all takes
    pub const CALIBRATION_FOLDER: &str = "_calibration";

    /// Renderer output cache
    pub const RENDER_BIN_FOLDER: &str = "_RenderBin";

    /// Directories in a recording location that are never takes
    pub const RESERVED_FOLDERS: &[&str] = &[CALIBRATION_FOLDER, RENDER_BIN_FOLDER];

    /// Prefix of generated take folder names
    pub const TAKE_PREFIX: &str = "TAKE";

    /// Extension of uncompressed depth frames
    pub const RAW_EXTENSION: &str = "raw";

    /// Extension of compressed depth frames
    pub const COMPRESSED_EXTENSION: &str = "png";

    /// Marker between sequence number and timestamp in frame filenames
    pub const MILLIS_MARKER: &str = "millis";

    /// Default frame filename prefix
    pub const DEFAULT_FILE_PREFIX: &str = "frame";

    /// Check if a directory name is reserved (never scanned as a take)
    pub fn is_reserved_folder(name: &str) -> bool {
        RESERVED_FOLDERS.contains(&name)
    }
}

/// Worker loop timing
pub mod timing {
    use super::Duration;

    /// Sleep between persistence worker iterations
    pub const SAVE_POLL_INTERVAL: Duration = Duration::from_millis(1);

    /// Sleep between transcode worker iterations
    pub const ENCODE_POLL_INTERVAL: Duration = Duration::from_millis(1);

    /// Recheck interval while transcoding is paused for an active recording
    pub const RECORDING_PAUSE_INTERVAL: Duration = Duration::from_millis(25);
}

/// Application information utilities
pub mod app_info {
    /// Get the application version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_folders() {
        assert!(layout::is_reserved_folder("_calibration"));
        assert!(layout::is_reserved_folder("_RenderBin"));
        assert!(!layout::is_reserved_folder("TAKE_01_02_03_04_05"));
        assert!(!layout::is_reserved_folder("_renderbin"));
    }

    #[test]
    fn test_pause_is_longer_than_poll() {
        assert!(timing::RECORDING_PAUSE_INTERVAL > timing::ENCODE_POLL_INTERVAL);
    }
}
