// SPDX-License-Identifier: GPL-3.0-only

//! Persistence worker: drains the save queue into raw files

use super::Shared;
use super::worker::LoopAction;
use tracing::{debug, error};

/// Write the frame at the head of the save queue, if any
///
/// A failed write puts the frame back at the tail of the queue unless it has
/// used up `max_save_attempts`.
pub(crate) fn save_next_frame(shared: &Shared) -> LoopAction {
    let Some(mut frame) = shared.save_queue.pop() else {
        return LoopAction::Continue;
    };

    let path = frame.path();
    match shared.compressor.save_raw(&path, &frame.pixels) {
        Ok(()) => {
            debug!(path = %path.display(), timestamp_ms = frame.timestamp_ms, "Saved raw frame");
            shared.save_queue.finish();
        }
        Err(e) => {
            frame.attempts += 1;
            if let Some(max) = shared.max_save_attempts
                && frame.attempts >= max
            {
                error!(
                    path = %path.display(),
                    attempts = frame.attempts,
                    error = %e,
                    "Save failed, dropping frame"
                );
                shared.save_queue.finish();
            } else {
                error!(
                    path = %path.display(),
                    attempts = frame.attempts,
                    error = %e,
                    "Save failed, re-adding to queue"
                );
                shared.save_queue.requeue(frame);
            }
        }
    }

    LoopAction::Continue
}
