// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the depth recorder

use std::fmt;

/// Result type alias using RecorderError
pub type RecorderResult<T> = Result<T, RecorderError>;

/// Main recorder error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecorderError {
    /// Frame codec errors
    Codec(CodecError),
    /// Storage/filesystem errors
    Storage(String),
    /// Configuration errors (missing record location, bad config file)
    Config(String),
    /// Record location cannot change while work is pending
    PipelineBusy {
        frames_waiting: usize,
        takes_waiting: usize,
    },
    /// Stop requested but no take was ever started
    NoActiveTake,
    /// Frame submitted while not recording
    NotRecording,
    /// Frame does not match the configured dimensions
    InvalidFrame { expected: usize, actual: usize },
}

/// Depth frame codec errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Buffer or file size does not match the frame dimensions
    SizeMismatch { expected: usize, actual: usize },
    /// Reading or writing the file failed
    Io(String),
    /// Compressing the frame failed
    Encode(String),
    /// Decoding a compressed frame failed
    Decode(String),
}

impl fmt::Display for RecorderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecorderError::Codec(e) => write!(f, "Codec error: {}", e),
            RecorderError::Storage(msg) => write!(f, "Storage error: {}", msg),
            RecorderError::Config(msg) => write!(f, "Configuration error: {}", msg),
            RecorderError::PipelineBusy {
                frames_waiting,
                takes_waiting,
            } => write!(
                f,
                "Pipeline busy: {} frames waiting to be saved, {} takes waiting for compression",
                frames_waiting, takes_waiting
            ),
            RecorderError::NoActiveTake => write!(f, "No take has been started"),
            RecorderError::NotRecording => write!(f, "Not recording"),
            RecorderError::InvalidFrame { expected, actual } => write!(
                f,
                "Invalid frame: expected {} samples, got {}",
                expected, actual
            ),
        }
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::SizeMismatch { expected, actual } => {
                write!(f, "Size mismatch: expected {} bytes, got {}", expected, actual)
            }
            CodecError::Io(msg) => write!(f, "I/O failed: {}", msg),
            CodecError::Encode(msg) => write!(f, "Encoding failed: {}", msg),
            CodecError::Decode(msg) => write!(f, "Decoding failed: {}", msg),
        }
    }
}

impl std::error::Error for RecorderError {}
impl std::error::Error for CodecError {}

impl From<CodecError> for RecorderError {
    fn from(err: CodecError) -> Self {
        RecorderError::Codec(err)
    }
}

impl From<std::io::Error> for RecorderError {
    fn from(err: std::io::Error) -> Self {
        RecorderError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for RecorderError {
    fn from(err: serde_json::Error) -> Self {
        RecorderError::Config(err.to_string())
    }
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        CodecError::Io(err.to_string())
    }
}

impl From<image::ImageError> for CodecError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Decoding(e) => CodecError::Decode(e.to_string()),
            image::ImageError::IoError(e) => CodecError::Io(e.to_string()),
            other => CodecError::Encode(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_message_mentions_counts() {
        let err = RecorderError::PipelineBusy {
            frames_waiting: 3,
            takes_waiting: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("3 frames"));
        assert!(msg.contains("1 takes"));
    }

    #[test]
    fn test_io_error_maps_to_storage() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(matches!(RecorderError::from(io), RecorderError::Storage(_)));
    }
}
