// SPDX-License-Identifier: GPL-3.0-only

//! Recorder configuration
//!
//! Stored as JSON under the user config directory. Every field has a default,
//! so partial files written by older versions still load.

use crate::constants::{frame, layout, timing};
use crate::errors::{RecorderError, RecorderResult};
use crate::media::compressor::CompressionMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Config file name inside the application config directory
const CONFIG_FILE_NAME: &str = "config.json";

/// Application directory name used for config and default recordings
const APP_DIR_NAME: &str = "depth-recorder";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding one folder per take
    pub target_directory: PathBuf,
    /// Prefix for raw frame filenames
    pub file_prefix: String,
    /// Depth frame width in pixels
    pub frame_width: u32,
    /// Depth frame height in pixels
    pub frame_height: u32,
    /// How raw frames are compressed after recording
    pub compression: CompressionMode,
    /// Drop a frame after this many failed writes (None retries forever)
    pub max_save_attempts: Option<u32>,
    /// Persistence worker poll interval
    pub save_poll_interval_ms: u64,
    /// Transcode worker poll interval
    pub encode_poll_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_directory: default_target_directory(),
            file_prefix: layout::DEFAULT_FILE_PREFIX.to_string(),
            frame_width: frame::DEFAULT_WIDTH,
            frame_height: frame::DEFAULT_HEIGHT,
            compression: CompressionMode::default(),
            max_save_attempts: None, // Retry until the write succeeds
            save_poll_interval_ms: timing::SAVE_POLL_INTERVAL.as_millis() as u64,
            encode_poll_interval_ms: timing::ENCODE_POLL_INTERVAL.as_millis() as u64,
        }
    }
}

impl Config {
    /// Number of samples in one depth frame
    pub fn frame_len(&self) -> usize {
        self.frame_width as usize * self.frame_height as usize
    }

    pub fn save_poll_interval(&self) -> Duration {
        Duration::from_millis(self.save_poll_interval_ms)
    }

    pub fn encode_poll_interval(&self) -> Duration {
        Duration::from_millis(self.encode_poll_interval_ms)
    }

    /// Default config file location (`~/.config/depth-recorder/config.json`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load a config file
    pub fn load(path: &Path) -> RecorderResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        config.validate()?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Load a config file, falling back to defaults if it does not exist
    pub fn load_or_default(path: &Path) -> RecorderResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Write the config file, creating its parent directory
    pub fn save(&self, path: &Path) -> RecorderResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), "Saved config");
        Ok(())
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> RecorderResult<()> {
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(RecorderError::Config(format!(
                "Frame dimensions must be non-zero, got {}x{}",
                self.frame_width, self.frame_height
            )));
        }
        if self.file_prefix.is_empty() {
            return Err(RecorderError::Config(
                "File prefix must not be empty".to_string(),
            ));
        }
        if let CompressionMode::Quantized { drop_bits } = self.compression
            && drop_bits >= 16
        {
            return Err(RecorderError::Config(format!(
                "Quantization must keep at least one bit, got drop_bits={}",
                drop_bits
            )));
        }
        if self.max_save_attempts == Some(0) {
            return Err(RecorderError::Config(
                "max_save_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// `~/Videos/depth-recorder`, falling back to home or the working directory
fn default_target_directory() -> PathBuf {
    dirs::video_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{ "file_prefix": "kinect" }"#).unwrap();
        assert_eq!(config.file_prefix, "kinect");
        assert_eq!(config.frame_width, frame::DEFAULT_WIDTH);
        assert_eq!(config.max_save_attempts, None);
    }

    #[test]
    fn test_validate_rejects_zero_size() {
        let config = Config {
            frame_width: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(RecorderError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_full_quantization() {
        let config = Config {
            compression: CompressionMode::Quantized { drop_bits: 16 },
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_frame_len() {
        let config = Config {
            frame_width: 4,
            frame_height: 3,
            ..Config::default()
        };
        assert_eq!(config.frame_len(), 12);
    }
}
