// SPDX-License-Identifier: GPL-3.0-only

//! Thread lifecycle management for the recorder's polling workers
//!
//! Each worker runs a step function in a loop on its own named thread,
//! sleeping a fixed interval between steps. Steps that do long work receive
//! the stop flag so they can bail out between units of work.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Action returned by a worker step to control loop behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopAction {
    /// Continue running the loop
    Continue,
    /// Stop the loop gracefully
    Stop,
}

/// Controller for a polling loop running in a separate thread
///
/// # Example
///
/// ```ignore
/// let mut worker = WorkerLoop::start("depth-save", Duration::from_millis(1), |_stop| {
///     if let Some(frame) = queue.pop() {
///         write(frame);
///     }
///     LoopAction::Continue
/// });
///
/// worker.stop();
/// ```
pub struct WorkerLoop {
    thread_handle: Option<JoinHandle<()>>,
    stop_signal: Arc<AtomicBool>,
    name: String,
}

impl WorkerLoop {
    /// Start a new worker thread
    ///
    /// `step` is called repeatedly, with `poll_interval` sleeps in between,
    /// until it returns `LoopAction::Stop` or the worker is stopped.
    pub fn start<F>(name: &str, poll_interval: Duration, mut step: F) -> Self
    where
        F: FnMut(&AtomicBool) -> LoopAction + Send + 'static,
    {
        Self::start_with_state(name, poll_interval, (), move |_, stop| step(stop))
    }

    /// Start a worker thread that owns `state` for its whole lifetime
    pub fn start_with_state<S, F>(name: &str, poll_interval: Duration, mut state: S, mut step: F) -> Self
    where
        S: Send + 'static,
        F: FnMut(&mut S, &AtomicBool) -> LoopAction + Send + 'static,
    {
        let stop_signal = Arc::new(AtomicBool::new(false));
        let stop_signal_clone = Arc::clone(&stop_signal);
        let name_clone = name.to_string();

        info!(name = %name, "Starting worker");

        let spawned = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                debug!(name = %name_clone, "Worker thread started");

                loop {
                    if stop_signal_clone.load(Ordering::SeqCst) {
                        debug!(name = %name_clone, "Stop signal received");
                        break;
                    }

                    if step(&mut state, &stop_signal_clone) == LoopAction::Stop {
                        debug!(name = %name_clone, "Worker requested stop");
                        break;
                    }

                    thread::sleep(poll_interval);
                }

                info!(name = %name_clone, "Worker thread exiting");
            });

        let thread_handle = match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!(name = %name, error = %e, "Failed to spawn worker thread");
                None
            }
        };

        Self {
            thread_handle,
            stop_signal,
            name: name.to_string(),
        }
    }

    /// Check if the worker thread is still running
    pub fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Signal the worker to stop (non-blocking)
    pub fn request_stop(&self) {
        debug!(name = %self.name, "Requesting worker stop");
        self.stop_signal.store(true, Ordering::SeqCst);
    }

    /// Stop the worker and wait for the thread to finish
    pub fn stop(&mut self) {
        self.request_stop();
        self.join();
    }

    /// Wait for the thread to finish without sending the stop signal
    pub fn join(&mut self) {
        if let Some(handle) = self.thread_handle.take() {
            debug!(name = %self.name, "Waiting for worker thread to finish");
            if let Err(e) = handle.join() {
                warn!(name = %self.name, "Worker thread panicked: {:?}", e);
            } else {
                debug!(name = %self.name, "Worker thread finished");
            }
        }
    }
}

impl Drop for WorkerLoop {
    fn drop(&mut self) {
        if self.thread_handle.is_some() {
            debug!(name = %self.name, "WorkerLoop dropped, stopping thread");
            self.stop();
        }
    }
}
