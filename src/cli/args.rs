// file: src/cli/args.rs
// version: 1.0.0
// guid: 4e9b2d71-a6c3-4f05-8b1e-d7a0c5f3e286

//! Command line argument definitions

use crate::device::{Request, DEFAULT_AP_ADDRESS, DEFAULT_TCP_PORT, DEFAULT_UDP_PORT};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mpy-deploy")]
#[command(about = "Push a MicroPython payload to a serial-attached board and reset it")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Directory the payload paths are relative to
    #[arg(short = 'C', long, global = true, default_value = ".")]
    pub workdir: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Clean, copy the payload to the board, then reset it
    Deploy {
        /// Serial port (falls back to $PORT, the manifest, then /dev/ttyACM0)
        #[arg(short, long)]
        port: Option<String>,

        #[arg(short, long, help = "Manifest file (TOML or YAML)")]
        manifest: Option<PathBuf>,

        #[arg(long, help = "Show what would be done without actually doing it")]
        dry_run: bool,

        #[arg(short, long, help = "Run every step even after a failure")]
        keep_going: bool,

        #[arg(long, help = "Do not reset the board afterwards")]
        no_reset: bool,

        #[arg(long, help = "Print the run report as JSON")]
        json: bool,
    },

    /// Print the ordered steps a deploy would run
    Plan {
        #[arg(short, long)]
        manifest: Option<PathBuf>,

        #[arg(short, long)]
        port: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Check that the tool is installed and the payload is present
    CheckPrereqs {
        #[arg(short, long)]
        manifest: Option<PathBuf>,
    },

    /// Reset the board without copying anything
    Reset {
        #[arg(short, long)]
        port: Option<String>,

        #[arg(short, long)]
        manifest: Option<PathBuf>,

        #[arg(long)]
        dry_run: bool,
    },

    /// Ask a running board for its state over its access point
    Probe {
        #[arg(long, default_value = DEFAULT_AP_ADDRESS)]
        host: String,

        #[arg(short, long, default_value_t = DEFAULT_TCP_PORT)]
        port: u16,

        #[arg(short, long, value_enum, default_value = "get-animation")]
        request: Request,

        #[arg(long, default_value_t = 10, help = "Connect and read timeout in seconds")]
        timeout: u64,
    },

    /// Print state broadcasts from running boards
    Listen {
        #[arg(short, long, default_value_t = DEFAULT_UDP_PORT)]
        port: u16,

        #[arg(short = 'n', long, help = "Stop after this many messages")]
        count: Option<usize>,
    },
}
