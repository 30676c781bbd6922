// SPDX-License-Identifier: GPL-3.0-only

//! Transcode worker: converts a finished take's raw frames to compressed images
//!
//! One take is processed to completion before the next is popped. A take's
//! raw files are listed only after the save queue has drained. Between files
//! the worker pauses for as long as a recording is active and bails out if
//! the recorder is shutting down.

use super::Shared;
use super::take::TakeId;
use super::worker::LoopAction;
use crate::constants::{layout, timing};
use crate::errors::RecorderResult;
use crate::media::FrameCompressor;
use crate::storage;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use tracing::{debug, error, info, warn};

/// Worker-owned state kept across takes
#[derive(Debug, Default)]
pub(crate) struct TranscodeState {
    /// Decode buffer, allocated on first use
    scratch: Option<Vec<u16>>,
}

/// Pop the next take from the encode queue and convert all of its raw frames
pub(crate) fn transcode_next_take(
    shared: &Shared,
    state: &mut TranscodeState,
    stop: &AtomicBool,
) -> LoopAction {
    let Some(id) = shared.encode_queue.pop() else {
        return LoopAction::Continue;
    };

    transcode_take(shared, state, stop, id);
    shared.encode_queue.finish();

    LoopAction::Continue
}

fn transcode_take(shared: &Shared, state: &mut TranscodeState, stop: &AtomicBool, id: TakeId) {
    let Some(depth_folder) = shared.lock_takes().get(id).map(|t| t.depth_folder.clone()) else {
        warn!(?id, "Take was released before it could be compressed");
        return;
    };

    if depth_folder.as_os_str().is_empty() {
        error!("Take has empty depth folder path");
        return;
    }
    if !depth_folder.is_dir() {
        error!(path = %depth_folder.display(), "Depth folder does not exist or is not a directory");
        return;
    }

    // Frames of a just-stopped take may still be in the save queue
    if !wait_for_saves(shared, stop) {
        warn!(path = %depth_folder.display(), "Recorder shut down before take could be listed");
        return;
    }

    let raw_files = match storage::list_files_with_extension(&depth_folder, layout::RAW_EXTENSION) {
        Ok(files) => files,
        Err(e) => {
            error!(path = %depth_folder.display(), error = %e, "Failed to list raw frames");
            return;
        }
    };

    let scratch = state
        .scratch
        .get_or_insert_with(|| vec![0u16; shared.frame_len]);

    if let Some(take) = shared.lock_takes().get_mut(id) {
        take.uncompressed_frames = raw_files.len();
    }
    shared
        .frames_to_compress
        .store(raw_files.len(), Ordering::SeqCst);

    info!(
        path = %depth_folder.display(),
        frames = raw_files.len(),
        "Starting to convert take"
    );

    let extension = shared.compressor.compressed_extension();
    let mut converted = 0usize;

    for (index, raw_path) in raw_files.iter().enumerate() {
        if !wait_while_recording(shared, stop) {
            warn!(
                path = %depth_folder.display(),
                remaining = raw_files.len() - index,
                "Breaking conversion because the recorder is shutting down"
            );
            break;
        }

        let compressed_path = raw_path.with_extension(extension);
        if let Err(e) = convert_frame(shared.compressor.as_ref(), raw_path, &compressed_path, scratch) {
            error!(path = %raw_path.display(), error = %e, "Failed to convert frame, keeping raw file");
            continue;
        }
        converted += 1;

        let remaining = match shared.lock_takes().get_mut(id) {
            Some(take) => {
                take.uncompressed_frames = take.uncompressed_frames.saturating_sub(1);
                take.compressed_frames += 1;
                take.uncompressed_frames
            }
            None => raw_files.len() - index - 1,
        };
        shared.frames_to_compress.store(remaining, Ordering::SeqCst);
    }

    info!(path = %depth_folder.display(), converted, "Finished converting take");
}

/// Block while a recording is active
///
/// Returns `false` if the worker was asked to stop instead.
fn wait_while_recording(shared: &Shared, stop: &AtomicBool) -> bool {
    let mut paused = false;
    loop {
        if stop.load(Ordering::SeqCst) {
            return false;
        }
        // Staleness of one poll is fine; the flag only gates the next file
        if !shared.recording.load(Ordering::Relaxed) {
            if paused {
                debug!("Recording stopped, resuming conversion");
            }
            return true;
        }
        if !paused {
            debug!("Paused converting while recording");
            paused = true;
        }
        thread::sleep(timing::RECORDING_PAUSE_INTERVAL);
    }
}

/// Block until the save queue is drained and no recording is active
///
/// Returns `false` if the worker was asked to stop instead.
fn wait_for_saves(shared: &Shared, stop: &AtomicBool) -> bool {
    let mut waiting = false;
    loop {
        if stop.load(Ordering::SeqCst) {
            return false;
        }
        let pending = shared.save_queue.pending();
        if pending == 0 && !shared.recording.load(Ordering::SeqCst) {
            return true;
        }
        if !waiting {
            debug!(pending, "Waiting for raw frames to be saved before listing take");
            waiting = true;
        }
        thread::sleep(timing::RECORDING_PAUSE_INTERVAL);
    }
}

/// Raw file -> compressed file, then delete the raw file
fn convert_frame(
    compressor: &dyn FrameCompressor,
    raw_path: &Path,
    compressed_path: &Path,
    scratch: &mut [u16],
) -> RecorderResult<()> {
    compressor.read_raw(raw_path, scratch)?;
    compressor.save_compressed(compressed_path, scratch)?;
    storage::remove_file(raw_path)?;
    Ok(())
}
