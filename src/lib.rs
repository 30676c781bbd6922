// SPDX-License-Identifier: GPL-3.0-only

//! Depth Recorder - records RGB-D depth streams to disk
//!
//! Depth frames are written as raw files while recording and transcoded to
//! 16-bit PNG once a take is finished, on two background worker threads.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`pipelines`]: The recorder, its queues, takes and worker threads
//! - [`media`]: Depth frame codec (raw and PNG)
//! - [`backends`]: Frame sources
//! - [`config`]: User configuration handling
//! - [`storage`]: Filesystem helpers for recording locations
//!
//! # Example
//!
//! ```no_run
//! use depth_recorder::{Config, Recorder};
//!
//! let config = Config::default();
//! let mut recorder = Recorder::new(config.clone())?;
//! recorder.set_record_location(&config.target_directory, &config.file_prefix)?;
//!
//! recorder.toggle_record()?;
//! let frame = vec![1000u16; config.frame_len()];
//! recorder.add_image(&frame);
//! recorder.toggle_record()?;
//! # Ok::<(), depth_recorder::RecorderError>(())
//! ```

pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod media;
pub mod pipelines;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use errors::{CodecError, RecorderError, RecorderResult};
pub use media::{CompressionMode, DepthImageCompressor, FrameCompressor};
pub use pipelines::recorder::{FrameName, Recorder, Take};
