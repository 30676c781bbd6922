// SPDX-License-Identifier: GPL-3.0-only

//! Depth frame codec
//!
//! Raw frames are the sensor buffer dumped as-is: `width * height`
//! native-endian `u16` samples with no header. Compressed frames are 16-bit
//! grayscale PNGs, optionally quantized before encoding.

use crate::config::Config;
use crate::constants::{frame, layout};
use crate::errors::CodecError;
use image::{ImageBuffer, ImageFormat, Luma};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// How depth samples are stored in the compressed image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CompressionMode {
    /// Exact 16-bit samples
    #[default]
    Lossless,
    /// Low `drop_bits` bits of every sample zeroed (lossy, smaller files)
    Quantized { drop_bits: u8 },
}

impl CompressionMode {
    /// Get display name for the mode
    pub fn display_name(&self) -> &'static str {
        match self {
            CompressionMode::Lossless => "Lossless",
            CompressionMode::Quantized { .. } => "Quantized",
        }
    }

    /// Bit mask applied to every sample before encoding
    fn sample_mask(&self) -> u16 {
        match self {
            CompressionMode::Lossless => u16::MAX,
            CompressionMode::Quantized { drop_bits } => {
                u16::MAX.checked_shl(u32::from(*drop_bits)).unwrap_or(0)
            }
        }
    }
}

/// Depth frame reader/writer used by the recorder's worker threads
///
/// Implementations must be shareable between the persistence and transcode
/// threads. All operations validate buffer lengths against the frame size
/// the compressor was built for.
pub trait FrameCompressor: Send + Sync {
    /// Write a raw frame buffer to `path`
    fn save_raw(&self, path: &Path, pixels: &[u16]) -> Result<(), CodecError>;

    /// Read a raw frame from `path` into `pixels`
    fn read_raw(&self, path: &Path, pixels: &mut [u16]) -> Result<(), CodecError>;

    /// Encode `pixels` as a compressed image at `path`
    fn save_compressed(&self, path: &Path, pixels: &[u16]) -> Result<(), CodecError>;

    /// Decode a compressed image at `path` into `pixels`
    fn read_compressed(&self, path: &Path, pixels: &mut [u16]) -> Result<(), CodecError>;

    /// Extension of files written by `save_compressed`
    fn compressed_extension(&self) -> &'static str {
        layout::COMPRESSED_EXTENSION
    }
}

/// PNG-backed compressor for fixed-size depth frames
#[derive(Debug, Clone)]
pub struct DepthImageCompressor {
    width: u32,
    height: u32,
    mode: CompressionMode,
}

impl DepthImageCompressor {
    pub fn new(width: u32, height: u32, mode: CompressionMode) -> Self {
        Self {
            width,
            height,
            mode,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.frame_width, config.frame_height, config.compression)
    }

    fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    fn check_len(&self, actual: usize) -> Result<(), CodecError> {
        let expected = self.frame_len();
        if actual != expected {
            return Err(CodecError::SizeMismatch {
                expected: expected * frame::BYTES_PER_SAMPLE,
                actual: actual * frame::BYTES_PER_SAMPLE,
            });
        }
        Ok(())
    }
}

impl Default for DepthImageCompressor {
    fn default() -> Self {
        Self::new(
            frame::DEFAULT_WIDTH,
            frame::DEFAULT_HEIGHT,
            CompressionMode::default(),
        )
    }
}

impl FrameCompressor for DepthImageCompressor {
    fn save_raw(&self, path: &Path, pixels: &[u16]) -> Result<(), CodecError> {
        self.check_len(pixels.len())?;
        std::fs::write(path, bytemuck::cast_slice::<u16, u8>(pixels))?;
        Ok(())
    }

    fn read_raw(&self, path: &Path, pixels: &mut [u16]) -> Result<(), CodecError> {
        self.check_len(pixels.len())?;

        let mut file = File::open(path)?;
        let expected = self.frame_len() * frame::BYTES_PER_SAMPLE;
        let actual = file.metadata()?.len() as usize;
        if actual != expected {
            return Err(CodecError::SizeMismatch { expected, actual });
        }

        file.read_exact(bytemuck::cast_slice_mut::<u16, u8>(pixels))?;
        Ok(())
    }

    fn save_compressed(&self, path: &Path, pixels: &[u16]) -> Result<(), CodecError> {
        self.check_len(pixels.len())?;

        let mask = self.mode.sample_mask();
        let samples: Vec<u16> = pixels.iter().map(|&p| p & mask).collect();
        let image: ImageBuffer<Luma<u16>, Vec<u16>> =
            ImageBuffer::from_raw(self.width, self.height, samples).ok_or_else(|| {
                CodecError::Encode("Buffer does not fit frame dimensions".to_string())
            })?;

        image.save_with_format(path, ImageFormat::Png)?;
        debug!(path = %path.display(), mode = self.mode.display_name(), "Wrote compressed frame");
        Ok(())
    }

    fn read_compressed(&self, path: &Path, pixels: &mut [u16]) -> Result<(), CodecError> {
        self.check_len(pixels.len())?;

        let decoded = image::open(path)?.into_luma16();
        if decoded.width() != self.width || decoded.height() != self.height {
            return Err(CodecError::Decode(format!(
                "Expected {}x{} image, got {}x{}",
                self.width,
                self.height,
                decoded.width(),
                decoded.height()
            )));
        }

        pixels.copy_from_slice(decoded.as_raw());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(len: usize) -> Vec<u16> {
        (0..len).map(|i| (i as u16).wrapping_mul(257)).collect()
    }

    #[test]
    fn test_raw_file_is_headerless() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.raw");
        let compressor = DepthImageCompressor::new(4, 2, CompressionMode::Lossless);

        compressor.save_raw(&path, &gradient(8)).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 16);

        let mut back = vec![0u16; 8];
        compressor.read_raw(&path, &mut back).unwrap();
        assert_eq!(back, gradient(8));
    }

    #[test]
    fn test_read_raw_rejects_truncated_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.raw");
        std::fs::write(&path, [0u8; 10]).unwrap();

        let compressor = DepthImageCompressor::new(4, 2, CompressionMode::Lossless);
        let mut buffer = vec![0u16; 8];
        let err = compressor.read_raw(&path, &mut buffer).unwrap_err();
        assert_eq!(
            err,
            CodecError::SizeMismatch {
                expected: 16,
                actual: 10
            }
        );
    }

    #[test]
    fn test_save_raw_rejects_wrong_length() {
        let dir = tempfile::tempdir().unwrap();
        let compressor = DepthImageCompressor::new(4, 2, CompressionMode::Lossless);
        let err = compressor
            .save_raw(&dir.path().join("x.raw"), &[1, 2, 3])
            .unwrap_err();
        assert!(matches!(err, CodecError::SizeMismatch { .. }));
        assert!(!dir.path().join("x.raw").exists());
    }

    #[test]
    fn test_lossless_png_preserves_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.png");
        let compressor = DepthImageCompressor::new(8, 4, CompressionMode::Lossless);
        let pixels = gradient(32);

        compressor.save_compressed(&path, &pixels).unwrap();
        let mut back = vec![0u16; 32];
        compressor.read_compressed(&path, &mut back).unwrap();
        assert_eq!(back, pixels);
    }

    #[test]
    fn test_quantized_png_drops_low_bits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q.png");
        let compressor = DepthImageCompressor::new(2, 2, CompressionMode::Quantized { drop_bits: 4 });

        compressor
            .save_compressed(&path, &[0x1234, 0x00ff, 0xffff, 0x000f])
            .unwrap();
        let mut back = vec![0u16; 4];
        compressor.read_compressed(&path, &mut back).unwrap();
        assert_eq!(back, vec![0x1230, 0x00f0, 0xfff0, 0x0000]);
    }

    #[test]
    fn test_read_compressed_rejects_other_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.png");
        DepthImageCompressor::new(4, 4, CompressionMode::Lossless)
            .save_compressed(&path, &gradient(16))
            .unwrap();

        let mut buffer = vec![0u16; 16];
        let err = DepthImageCompressor::new(8, 2, CompressionMode::Lossless)
            .read_compressed(&path, &mut buffer)
            .unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));
    }

    #[test]
    fn test_mode_serialization() {
        let json = serde_json::to_string(&CompressionMode::Quantized { drop_bits: 2 }).unwrap();
        assert_eq!(json, r#"{"mode":"quantized","drop_bits":2}"#);
    }
}
