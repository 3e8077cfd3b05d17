// file: src/main.rs
// version: 1.0.0
// guid: 5c0e9a47-b2d1-4f86-8a3c-e7f4d1b9a620

//! mpy-deploy - Main entry point

use clap::Parser;
use mpy_deploy::{
    cli::{commands::*, Cli, Commands},
    logging::logger,
    Result,
};
use tokio::signal;
use tracing::{error, warn};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let logging = if cli.log_json {
        logger::init_json_logger(cli.verbose, cli.quiet)
    } else {
        logger::init_logger(cli.verbose, cli.quiet)
    };
    if let Err(e) = logging {
        eprintln!("{}", e);
    }

    // Run command with signal handling
    let code = tokio::select! {
        result = run(cli) => match result {
            Ok(()) => 0,
            Err(e) => {
                error!("{}", e);
                1
            }
        },
        _ = signal::ctrl_c() => {
            warn!("Interrupted by user");
            130 // Standard exit code for Ctrl+C
        }
    };

    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<()> {
    let workdir = cli.workdir;
    match cli.command {
        Commands::Deploy {
            port,
            manifest,
            dry_run,
            keep_going,
            no_reset,
            json,
        } => deploy_command(&workdir, port, manifest, dry_run, keep_going, no_reset, json).await,
        Commands::Plan {
            manifest,
            port,
            json,
        } => plan_command(&workdir, port, manifest, json).await,
        Commands::CheckPrereqs { manifest } => {
            check_prerequisites_command(&workdir, manifest).await
        }
        Commands::Reset {
            port,
            manifest,
            dry_run,
        } => reset_command(&workdir, port, manifest, dry_run).await,
        Commands::Probe {
            host,
            port,
            request,
            timeout,
        } => probe_command(&host, port, request, timeout).await,
        Commands::Listen { port, count } => listen_command(port, count).await,
    }
}
