use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod emit;
pub mod send_config;
pub mod version;
pub mod watch;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a scripted core session: READY, status reports, logs, STOPPED.
    Emit(EmitArgs),
    /// Read core packets from stdin, dispatch them, report the session outcome.
    Watch(WatchArgs),
    /// Build a CMD:UPDATE_CONFIG packet and write it framed to stdout.
    SendConfig(SendConfigArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Emit(args) => emit::run(args),
        Command::Watch(args) => watch::run(args, format),
        Command::SendConfig(args) => send_config::run(args),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct EmitArgs {
    /// Number of status reports to send.
    #[arg(long, default_value = "3")]
    pub count: usize,
    /// Emit a CORE:ERROR mid-session with this message.
    #[arg(long, value_name = "MESSAGE")]
    pub error: Option<String>,
    /// Device address reported in status payloads.
    #[arg(long, default_value = "192.168.1.100")]
    pub ip: String,
    /// Device port reported in status payloads.
    #[arg(long, default_value = "8080")]
    pub port: u16,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Exit after dispatching N packets.
    #[arg(long)]
    pub count: Option<usize>,
    /// Suppress per-packet output, print only the session summary.
    #[arg(long)]
    pub quiet: bool,
}

#[derive(Args, Debug)]
pub struct SendConfigArgs {
    /// Inline JSON config.
    #[arg(long, conflicts_with = "file")]
    pub config: Option<String>,
    /// Read the JSON config from a file.
    #[arg(long, conflicts_with = "config")]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
