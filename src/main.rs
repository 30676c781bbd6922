// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "depth-recorder")]
#[command(about = "Record depth frames to disk and compress finished takes")]
#[command(version = depth_recorder::constants::app_info::version())]
struct Cli {
    /// Config file (default: ~/.config/depth-recorder/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a take from the synthetic depth source
    Record {
        /// Directory holding the takes
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Frame filename prefix
        #[arg(short, long)]
        prefix: Option<String>,

        /// Recording duration in seconds (Ctrl-C stops early)
        #[arg(short, long, default_value = "5")]
        duration: u64,

        /// Frames per second to submit
        #[arg(short, long, default_value = "30", value_parser = clap::value_parser!(u32).range(1..=120))]
        fps: u32,

        /// Repeat every n-th frame to exercise duplicate suppression (0 disables)
        #[arg(long, default_value = "0")]
        repeat_every: u32,
    },

    /// List takes in a recording directory
    Takes {
        /// Directory holding the takes
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Compress every take in a recording directory
    Compress {
        /// Directory holding the takes
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=depth_recorder=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let mut config = cli::load_config(cli.config)?;

    match cli.command {
        Commands::Record {
            output,
            prefix,
            duration,
            fps,
            repeat_every,
        } => {
            if let Some(output) = output {
                config.target_directory = output;
            }
            if let Some(prefix) = prefix {
                config.file_prefix = prefix;
            }
            cli::record(config, duration, fps, repeat_every)
        }
        Commands::Takes { dir } => {
            cli::list_takes(&dir.unwrap_or(config.target_directory))
        }
        Commands::Compress { dir } => {
            if let Some(dir) = dir {
                config.target_directory = dir;
            }
            cli::compress(config)
        }
    }
}
