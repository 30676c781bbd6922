// SPDX-License-Identifier: GPL-3.0-only

//! Synthetic depth source
//!
//! Produces a deterministic scene (a tilted back wall with a disc sweeping
//! across it) so the recorder can be exercised without sensor hardware.
//! Samples are depths in millimeters, 0 meaning "no reading".

use tracing::debug;

/// Back wall distance at the top row (mm)
const WALL_DEPTH_MM: u16 = 2500;

/// Disc distance (mm)
const DISC_DEPTH_MM: u16 = 1200;

/// Horizontal disc movement per frame (pixels)
const DISC_STEP_PX: u32 = 8;

#[derive(Debug, Clone)]
pub struct SyntheticDepthSource {
    width: u32,
    height: u32,
    frame_index: u32,
    /// Every n-th frame repeats the previous one, like a stalled sensor
    repeat_every: Option<u32>,
    last: Option<Vec<u16>>,
}

impl SyntheticDepthSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frame_index: 0,
            repeat_every: None,
            last: None,
        }
    }

    /// Repeat the previous frame every `n` frames (`0` disables)
    pub fn with_repeat_every(mut self, n: u32) -> Self {
        self.repeat_every = (n > 0).then_some(n);
        self
    }

    pub fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Render the next frame
    pub fn next_frame(&mut self) -> Vec<u16> {
        let index = self.frame_index;
        self.frame_index += 1;

        if let (Some(n), Some(last)) = (self.repeat_every, self.last.as_ref())
            && index % n == n - 1
        {
            debug!(frame = index, "Repeating previous synthetic frame");
            return last.clone();
        }

        let frame = self.render(index);
        self.last = Some(frame.clone());
        frame
    }

    fn render(&self, index: u32) -> Vec<u16> {
        let width = self.width.max(1);
        let radius = (self.height / 6).max(1) as i64;
        let cx = ((index * DISC_STEP_PX) % width) as i64;
        let cy = (self.height / 2) as i64;

        let mut frame = Vec::with_capacity(self.frame_len());
        for y in 0..self.height {
            // Wall tilts towards the camera at the bottom
            let wall = WALL_DEPTH_MM.saturating_sub((y * 2).min(u32::from(u16::MAX)) as u16);
            for x in 0..self.width {
                let dx = x as i64 - cx;
                let dy = y as i64 - cy;
                let depth = if dx * dx + dy * dy <= radius * radius {
                    DISC_DEPTH_MM
                } else {
                    wall
                };
                frame.push(depth);
            }
        }
        frame
    }
}

impl Iterator for SyntheticDepthSource {
    type Item = Vec<u16>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_frame())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_size() {
        let mut source = SyntheticDepthSource::new(16, 12);
        assert_eq!(source.next_frame().len(), 16 * 12);
    }

    #[test]
    fn test_consecutive_frames_differ() {
        let mut source = SyntheticDepthSource::new(64, 48);
        let a = source.next_frame();
        let b = source.next_frame();
        assert_ne!(a, b);
    }

    #[test]
    fn test_repeat_every() {
        let mut source = SyntheticDepthSource::new(64, 48).with_repeat_every(3);
        let frames: Vec<Vec<u16>> = source.by_ref().take(6).collect();
        assert_ne!(frames[0], frames[1]);
        assert_eq!(frames[1], frames[2]);
        assert_ne!(frames[2], frames[3]);
        assert_eq!(frames[4], frames[5]);
    }

    #[test]
    fn test_disc_is_closer_than_wall() {
        let mut source = SyntheticDepthSource::new(64, 48);
        let frame = source.next_frame();
        assert_eq!(frame.iter().copied().min(), Some(DISC_DEPTH_MM));
        assert!(frame.iter().all(|&d| d > 0));
    }
}
