//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "drywatch", version, about = "Passive dryer display-bus monitor")]
pub struct Cli {
    /// Path to config TOML; defaults apply when the file does not exist
    #[arg(long, value_name = "FILE", default_value = "etc/drywatch.toml")]
    pub config: PathBuf,

    /// Emit publications as JSON lines on stdout instead of log records
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); overrides the config
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Attach to the configured GPIO pins and monitor the live bus
    Watch,
    /// Replay synthetic frames through the full pipeline
    Simulate {
        /// Number of frames to replay
        #[arg(long, default_value_t = 60)]
        frames: u32,
        /// Idle gap between frames in milliseconds
        #[arg(long = "interval-ms", value_name = "MS", default_value_t = 50)]
        interval_ms: u64,
        /// Show this error code (0-9) on the middle third of the replay
        #[arg(long, value_name = "DIGIT")]
        error: Option<u8>,
    },
}
