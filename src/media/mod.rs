// SPDX-License-Identifier: GPL-3.0-only

//! Depth frame encoding and decoding
//!
//! The [`compressor`] module defines the [`FrameCompressor`] contract used by
//! the recorder's worker threads and its PNG-backed implementation.

pub mod compressor;

pub use compressor::{CompressionMode, DepthImageCompressor, FrameCompressor};
