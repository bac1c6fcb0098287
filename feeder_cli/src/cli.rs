//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "feeder", version, about = "Automatic feeder controller")]
pub struct Args {
    /// Path to config TOML
    #[arg(long, value_name = "FILE", default_value = "etc/feeder.toml")]
    pub config: PathBuf,

    /// Bench preset: 3 s feed cooldown instead of 5 min
    #[arg(long, action = ArgAction::SetTrue)]
    pub debug: bool,

    /// Emit telemetry as JSON lines on stdout instead of status screens
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Exit after this many milliseconds (runs until interrupted by default)
    #[arg(long, value_name = "MS")]
    pub duration_ms: Option<u64>,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,
}
