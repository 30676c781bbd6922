// SPDX-License-Identifier: GPL-3.0-only

//! Depth image recorder
//!
//! The recorder owns two polling workers:
//!
//! ```text
//! add_image ──▶ save queue ──▶ [depth-save]   ──▶ <take>/depth/*.raw
//!
//! toggle_record (stop) ──▶ encode queue ──▶ [depth-encode] ──▶ *.raw → *.png
//! ```
//!
//! The caller thread is the only producer. Each queue's lock is held only
//! around push/pop; all disk and codec work happens outside it. The encode
//! worker never converts a file while a recording is active.

pub mod frame;
mod persistence;
pub mod queue;
pub mod take;
mod transcode;
pub mod worker;

pub use frame::{FrameName, QueuedFrame};
pub use queue::WorkQueue;
pub use take::{Take, TakeId, TakeList, scan_takes, take_folder_name};
pub use worker::{LoopAction, WorkerLoop};

use crate::config::Config;
use crate::constants::layout;
use crate::errors::{RecorderError, RecorderResult};
use crate::media::{DepthImageCompressor, FrameCompressor};
use crate::storage;
use chrono::Local;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use transcode::TranscodeState;

/// Worker thread names
const SAVE_WORKER_NAME: &str = "depth-save";
const ENCODE_WORKER_NAME: &str = "depth-encode";

/// State shared between the recorder and its worker threads
pub(crate) struct Shared {
    pub(crate) save_queue: WorkQueue<QueuedFrame>,
    pub(crate) encode_queue: WorkQueue<TakeId>,
    pub(crate) takes: Mutex<TakeList>,
    /// Set while a take is being recorded; read by the encode worker
    pub(crate) recording: AtomicBool,
    pub(crate) frames_to_compress: AtomicUsize,
    pub(crate) compressor: Arc<dyn FrameCompressor>,
    pub(crate) frame_len: usize,
    pub(crate) max_save_attempts: Option<u32>,
}

impl Shared {
    pub(crate) fn lock_takes(&self) -> MutexGuard<'_, TakeList> {
        self.takes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Records depth frames into takes and compresses finished takes
pub struct Recorder {
    shared: Arc<Shared>,
    location: Option<PathBuf>,
    file_prefix: String,
    /// Root folder of the take being (or last) recorded
    current_take: Option<PathBuf>,
    current_frame: u32,
    /// Last accepted frame, for duplicate suppression
    last_frame: Box<[u16]>,
    recording_started: Instant,
    save_worker: WorkerLoop,
    encode_worker: WorkerLoop,
}

impl Recorder {
    /// Create a recorder using the PNG depth compressor and start its workers
    pub fn new(config: Config) -> RecorderResult<Self> {
        let compressor = Arc::new(DepthImageCompressor::from_config(&config));
        Self::with_compressor(config, compressor)
    }

    /// Create a recorder with a custom frame codec and start its workers
    ///
    /// The compressor must accept frames of `config.frame_width` by
    /// `config.frame_height` samples.
    pub fn with_compressor(
        config: Config,
        compressor: Arc<dyn FrameCompressor>,
    ) -> RecorderResult<Self> {
        config.validate()?;

        let frame_len = config.frame_len();
        let shared = Arc::new(Shared {
            save_queue: WorkQueue::new(),
            encode_queue: WorkQueue::new(),
            takes: Mutex::new(TakeList::new()),
            recording: AtomicBool::new(false),
            frames_to_compress: AtomicUsize::new(0),
            compressor,
            frame_len,
            max_save_attempts: config.max_save_attempts,
        });

        let save_shared = Arc::clone(&shared);
        let save_worker = WorkerLoop::start(SAVE_WORKER_NAME, config.save_poll_interval(), move |_| {
            persistence::save_next_frame(&save_shared)
        });

        let encode_shared = Arc::clone(&shared);
        let encode_worker = WorkerLoop::start_with_state(
            ENCODE_WORKER_NAME,
            config.encode_poll_interval(),
            TranscodeState::default(),
            move |state, stop| transcode::transcode_next_take(&encode_shared, state, stop),
        );

        info!(
            width = config.frame_width,
            height = config.frame_height,
            compression = config.compression.display_name(),
            "Depth recorder started"
        );

        Ok(Self {
            shared,
            location: None,
            file_prefix: config.file_prefix,
            current_take: None,
            current_frame: 0,
            last_frame: vec![0u16; frame_len].into_boxed_slice(),
            recording_started: Instant::now(),
            save_worker,
            encode_worker,
        })
    }

    /// Point the recorder at a directory of takes
    ///
    /// Refused while frames are waiting to be saved or takes are waiting to
    /// be compressed. Creates the directory if needed, then rescans it and
    /// queues every take with depth frames for compression.
    pub fn set_record_location(
        &mut self,
        directory: impl AsRef<Path>,
        file_prefix: &str,
    ) -> RecorderResult<()> {
        self.ensure_pipeline_idle()?;

        if file_prefix.is_empty() {
            return Err(RecorderError::Config(
                "File prefix must not be empty".to_string(),
            ));
        }

        let directory = directory.as_ref().to_path_buf();
        storage::ensure_directory(&directory)?;

        info!(location = %directory.display(), prefix = %file_prefix, "Record location set");
        self.location = Some(directory);
        self.file_prefix = file_prefix.to_string();

        self.update_takes()
    }

    /// Rescan the current record location (same rules as `set_record_location`)
    pub fn rescan_takes(&mut self) -> RecorderResult<()> {
        self.ensure_pipeline_idle()?;
        self.update_takes()
    }

    fn ensure_pipeline_idle(&self) -> RecorderResult<()> {
        let frames_waiting = self.num_frames_waiting_save();
        let takes_waiting = self.num_takes_waiting_compression();
        if frames_waiting != 0 || takes_waiting != 0 {
            warn!(
                frames_waiting,
                takes_waiting, "Cannot change record location while the pipeline is busy"
            );
            return Err(RecorderError::PipelineBusy {
                frames_waiting,
                takes_waiting,
            });
        }
        Ok(())
    }

    /// Replace the take list with a fresh scan and queue every take for compression
    fn update_takes(&mut self) -> RecorderResult<()> {
        let location = self
            .location
            .clone()
            .ok_or_else(|| RecorderError::Config("Record location not set".to_string()))?;

        self.shared.lock_takes().clear();

        let scanned = scan_takes(&location, self.shared.compressor.compressed_extension())?;
        let ids: Vec<TakeId> = {
            let mut takes = self.shared.lock_takes();
            scanned.into_iter().map(|take| takes.insert(take)).collect()
        };

        info!(location = %location.display(), takes = ids.len(), "Updated takes");
        self.shared.encode_queue.extend(ids);
        Ok(())
    }

    /// Start or stop recording, returning the new recording state
    pub fn toggle_record(&mut self) -> RecorderResult<bool> {
        if self.is_recording() {
            self.shared.recording.store(false, Ordering::SeqCst);
            self.compress_current_take()?;
            Ok(false)
        } else {
            self.increment_take()?;
            self.shared.recording.store(true, Ordering::SeqCst);
            Ok(true)
        }
    }

    /// Create the folders for a new take and reset per-take state
    fn increment_take(&mut self) -> RecorderResult<()> {
        let Some(location) = self.location.as_ref() else {
            error!("Cannot start recording, record location not set");
            return Err(RecorderError::Config(
                "Record location not set".to_string(),
            ));
        };

        let root = location.join(take_folder_name(Local::now()));
        storage::ensure_directory(&root.join(layout::DEPTH_FOLDER))?;
        storage::ensure_directory(&root.join(layout::COLOR_FOLDER))?;

        info!(take = %root.display(), "Started take");
        self.current_take = Some(root);
        self.current_frame = 0;
        self.last_frame.fill(0);
        self.recording_started = Instant::now();
        Ok(())
    }

    /// Register the just-finished take and queue it for compression
    fn compress_current_take(&mut self) -> RecorderResult<()> {
        let Some(root) = self.current_take.as_ref() else {
            error!("Cannot compress current take, no take was started");
            return Err(RecorderError::NoActiveTake);
        };

        let take = Take::load_from_folder(root, self.shared.compressor.compressed_extension());
        info!(
            take = %take.name,
            frames = take.total_frames(),
            "Finished take, queueing for compression"
        );

        let id = self.shared.lock_takes().insert(take);
        self.shared.encode_queue.push(id);
        Ok(())
    }

    /// Submit a depth frame, returning whether it was queued
    ///
    /// Frames are rejected when not recording, when their length does not
    /// match the configured frame size, or when identical to the previously
    /// accepted frame.
    pub fn add_image(&mut self, pixels: &[u16]) -> bool {
        match self.submit_frame(pixels) {
            Ok(accepted) => accepted,
            Err(e) => {
                debug!(error = %e, "Frame rejected");
                false
            }
        }
    }

    /// Like [`Recorder::add_image`], but reports why a frame was refused
    ///
    /// `Ok(false)` means the frame duplicated the previous one.
    pub fn submit_frame(&mut self, pixels: &[u16]) -> RecorderResult<bool> {
        if !self.is_recording() {
            return Err(RecorderError::NotRecording);
        }
        let Some(root) = self.current_take.as_ref() else {
            return Err(RecorderError::NoActiveTake);
        };
        if pixels.len() != self.last_frame.len() {
            warn!(
                expected = self.last_frame.len(),
                actual = pixels.len(),
                "Frame size does not match recorder configuration"
            );
            return Err(RecorderError::InvalidFrame {
                expected: self.last_frame.len(),
                actual: pixels.len(),
            });
        }

        if pixels == &*self.last_frame {
            return Ok(false);
        }

        let directory = root.join(layout::DEPTH_FOLDER);
        let timestamp_ms = self.recording_started.elapsed().as_millis() as u64;
        let name = FrameName::new(&self.file_prefix, self.current_frame, timestamp_ms);

        self.last_frame.copy_from_slice(pixels);
        let frame = QueuedFrame::new(timestamp_ms, Box::from(pixels), directory, name.raw_filename());
        self.shared.save_queue.push(frame);

        self.current_frame += 1;
        Ok(true)
    }

    /// Frames queued or being written
    pub fn num_frames_waiting_save(&self) -> usize {
        self.shared.save_queue.pending()
    }

    /// Raw frames left in the take currently being compressed
    pub fn num_frames_waiting_compression(&self) -> usize {
        self.shared.frames_to_compress.load(Ordering::SeqCst)
    }

    /// Takes queued or being compressed
    pub fn num_takes_waiting_compression(&self) -> usize {
        self.shared.encode_queue.pending()
    }

    pub fn is_recording(&self) -> bool {
        self.shared.recording.load(Ordering::SeqCst)
    }

    /// No frames waiting to be saved and no takes waiting to be compressed
    pub fn is_idle(&self) -> bool {
        self.shared.save_queue.is_idle() && self.shared.encode_queue.is_idle()
    }

    /// Snapshot of all known takes
    pub fn takes(&self) -> Vec<Take> {
        self.shared.lock_takes().iter().cloned().collect()
    }

    /// Root folder of the current (or most recent) take
    pub fn current_take(&self) -> Option<&Path> {
        self.current_take.as_deref()
    }

    pub fn record_location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    pub fn file_prefix(&self) -> &str {
        &self.file_prefix
    }

    pub fn compressor(&self) -> &Arc<dyn FrameCompressor> {
        &self.shared.compressor
    }

    /// Stop both workers and wait for them to exit
    ///
    /// Frames still in the save queue are not written.
    pub fn shutdown(&mut self) {
        let unsaved = self.shared.save_queue.queued();
        if unsaved > 0 {
            warn!(frames = unsaved, "Shutting down with unsaved frames");
        }

        self.save_worker.request_stop();
        self.encode_worker.request_stop();
        self.save_worker.join();
        self.encode_worker.join();
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        self.shutdown();
    }
}
