// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for recording and compressing takes
//!
//! This module provides command-line functionality for:
//! - Recording a take from the synthetic depth source
//! - Listing takes in a recording directory
//! - Compressing pending takes

use depth_recorder::backends::SyntheticDepthSource;
use depth_recorder::constants::layout;
use depth_recorder::pipelines::recorder::scan_takes;
use depth_recorder::{Config, Recorder};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::warn;

/// How often queue progress is printed while waiting
const PROGRESS_INTERVAL: Duration = Duration::from_millis(250);

/// Load the config file, or defaults when none exists
pub fn load_config(path: Option<PathBuf>) -> Result<Config, Box<dyn std::error::Error>> {
    let Some(path) = path.or_else(Config::default_path) else {
        return Ok(Config::default());
    };
    Ok(Config::load_or_default(&path)?)
}

/// Record one take of synthetic frames, then wait for it to be saved and compressed
pub fn record(
    config: Config,
    duration: u64,
    fps: u32,
    repeat_every: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut recorder = Recorder::new(config.clone())?;
    recorder.set_record_location(&config.target_directory, &config.file_prefix)?;

    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupted_clone = Arc::clone(&interrupted);
    ctrlc::set_handler(move || interrupted_clone.store(true, Ordering::SeqCst))?;

    let mut source = SyntheticDepthSource::new(config.frame_width, config.frame_height)
        .with_repeat_every(repeat_every);

    recorder.toggle_record()?;
    if let Some(take) = recorder.current_take() {
        println!("Recording: {}", take.display());
    }

    let frame_interval = Duration::from_secs_f64(1.0 / f64::from(fps));
    let duration = Duration::from_secs(duration);
    let start = Instant::now();
    let mut accepted = 0usize;
    let mut duplicates = 0usize;
    let mut rejected = 0usize;

    while start.elapsed() < duration && !interrupted.load(Ordering::SeqCst) {
        let frame = source.next_frame();
        match recorder.submit_frame(&frame) {
            Ok(true) => accepted += 1,
            Ok(false) => duplicates += 1,
            Err(e) => {
                warn!(error = %e, "Frame rejected");
                rejected += 1;
            }
        }
        std::thread::sleep(frame_interval);
    }

    // The take is only complete once every queued frame is on disk
    wait_until_saved(&recorder);
    recorder.toggle_record()?;
    println!(
        "Stopped after {:.1}s: {} frames saved, {} duplicates skipped, {} rejected",
        start.elapsed().as_secs_f64(),
        accepted,
        duplicates,
        rejected
    );

    wait_until_idle(&recorder);
    recorder.shutdown();
    println!("Done.");
    Ok(())
}

/// Print every take in a recording directory
pub fn list_takes(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !dir.is_dir() {
        return Err(format!("Not a directory: {}", dir.display()).into());
    }

    let takes = scan_takes(dir, layout::COMPRESSED_EXTENSION)?;
    if takes.is_empty() {
        println!("No takes found in {}", dir.display());
        return Ok(());
    }

    println!("Takes in {}:", dir.display());
    println!();
    for take in &takes {
        let duration = take
            .duration_ms
            .map(|ms| format!("{:.1}s", ms as f64 / 1000.0))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<24} {:>6} raw {:>6} compressed {:>8}{}{}",
            take.name,
            take.uncompressed_frames,
            take.compressed_frames,
            duration,
            if take.is_fully_compressed() { "  done" } else { "" },
            if take.has_color { "  +color" } else { "" }
        );
    }

    Ok(())
}

/// Compress every pending take in the configured directory
pub fn compress(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut recorder = Recorder::new(config.clone())?;
    recorder.set_record_location(&config.target_directory, &config.file_prefix)?;

    let pending: usize = recorder
        .takes()
        .iter()
        .map(|take| take.uncompressed_frames)
        .sum();
    println!(
        "Compressing {} raw frames in {} takes",
        pending,
        recorder.num_takes_waiting_compression()
    );

    wait_until_idle(&recorder);
    recorder.shutdown();
    println!("Done.");
    Ok(())
}

/// Poll the save queue until every accepted frame is written
fn wait_until_saved(recorder: &Recorder) {
    loop {
        let waiting = recorder.num_frames_waiting_save();
        if waiting == 0 {
            break;
        }
        println!("  saving {} frames", waiting);
        std::thread::sleep(PROGRESS_INTERVAL);
    }
}

/// Poll the recorder's queues, printing progress until both are empty
fn wait_until_idle(recorder: &Recorder) {
    while !recorder.is_idle() {
        println!(
            "  saving {} frames, compressing {} frames ({} takes left)",
            recorder.num_frames_waiting_save(),
            recorder.num_frames_waiting_compression(),
            recorder.num_takes_waiting_compression()
        );
        std::thread::sleep(PROGRESS_INTERVAL);
    }
}
