// SPDX-License-Identifier: GPL-3.0-only

//! Processing pipelines for depth capture
//!
//! - [`recorder`]: raw frame persistence and background take compression

pub mod recorder;

pub use recorder::Recorder;
