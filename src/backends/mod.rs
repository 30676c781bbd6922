// SPDX-License-Identifier: GPL-3.0-only

//! Depth frame sources
//!
//! - [`synthetic`]: deterministic generated frames for testing without hardware

pub mod synthetic;

pub use synthetic::SyntheticDepthSource;
