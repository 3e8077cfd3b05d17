// file: src/cli/commands.rs
// version: 1.0.0
// guid: a15d8f3c-2b97-4e60-9c4d-6f0e3b7a1d82

//! Command implementations for the CLI

use crate::{
    config::{loader::ConfigLoader, DeployManifest},
    deploy::{DeployOptions, DeployPlan, Deployer},
    device::{BroadcastListener, ProbeClient, Request, Response},
    error::DeployError,
    logging::logger::with_async_operation_span,
    tool::{CommandRunner, DeviceTool, ProcessRunner},
    Result,
};
use colored::Colorize;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};

fn load_manifest(manifest: Option<&Path>, workdir: &Path) -> Result<DeployManifest> {
    ConfigLoader::new().discover(manifest, workdir)
}

fn device_tool(manifest: &DeployManifest, port: Option<&str>) -> DeviceTool {
    let port = manifest.resolve_port(port);
    info!("Using serial port {}", port);
    DeviceTool::new(manifest.tool.clone(), port)
}

/// Clean, copy and reset
pub async fn deploy_command(
    workdir: &Path,
    port: Option<String>,
    manifest_path: Option<PathBuf>,
    dry_run: bool,
    keep_going: bool,
    no_reset: bool,
    json: bool,
) -> Result<()> {
    let manifest = load_manifest(manifest_path.as_deref(), workdir)?;
    let tool = device_tool(&manifest, port.as_deref());

    if !dry_run {
        tool.locate()?;
    }

    let mut plan = DeployPlan::build(&manifest, workdir)?;
    if no_reset {
        plan = plan.without_reset();
    }

    let options = DeployOptions {
        dry_run,
        keep_going,
        timeout: Duration::from_secs(manifest.timeout_seconds),
        show_progress: !json && !dry_run && std::io::stderr().is_terminal(),
    };
    let deployer = Deployer::new(ProcessRunner::with_working_directory(workdir), tool, options);

    let report = with_async_operation_span("deploy", || deployer.run(&plan)).await;

    if json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.render_summary());
    }

    if report.succeeded() {
        info!("Deployment completed successfully");
        Ok(())
    } else {
        let failed: Vec<String> = report.failures().map(|r| r.description.clone()).collect();
        Err(DeployError::deployment(format!(
            "{} step(s) failed: {}",
            failed.len(),
            failed.join(", ")
        )))
    }
}

/// Print the planned steps
pub async fn plan_command(
    workdir: &Path,
    port: Option<String>,
    manifest_path: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let manifest = load_manifest(manifest_path.as_deref(), workdir)?;
    let plan = DeployPlan::build(&manifest, workdir)?;
    let port = manifest.resolve_port(port.as_deref());

    if json {
        let document = serde_json::json!({
            "tool": manifest.tool,
            "port": port,
            "workdir": plan.workdir,
            "steps": plan.steps,
        });
        println!("{}", serde_json::to_string_pretty(&document)?);
        return Ok(());
    }

    println!("{} {} via {}", "Target:".bold(), port, manifest.tool);
    for (i, step) in plan.steps.iter().enumerate() {
        println!("{:>3}. {}", i + 1, step.describe());
    }
    println!(
        "{} steps, {} files to copy",
        plan.len(),
        plan.copy_count()
    );
    Ok(())
}

/// Check tool availability and payload presence
pub async fn check_prerequisites_command(
    workdir: &Path,
    manifest_path: Option<PathBuf>,
) -> Result<()> {
    info!("Checking system prerequisites...");

    let manifest = load_manifest(manifest_path.as_deref(), workdir)?;
    let mut problems = Vec::new();

    let tool = DeviceTool::new(manifest.tool.clone(), manifest.resolve_port(None));
    match tool.locate() {
        Ok(path) => println!("{} {} at {}", "✓".green(), manifest.tool, path.display()),
        Err(e) => {
            println!("{} {}", "✗".red(), e);
            problems.push(e.to_string());
        }
    }

    #[cfg(unix)]
    {
        let port = tool.port();
        if port.starts_with("/dev/") && !Path::new(port).exists() {
            warn!("Serial port {} does not exist (is the board plugged in?)", port);
        }
    }

    for target in &manifest.targets {
        let path = workdir.join(target.local_expanded());
        let present = if target.is_dir() { path.is_dir() } else { path.is_file() };
        if present {
            println!("{} {}", "✓".green(), path.display());
        } else {
            println!("{} {} missing", "✗".red(), path.display());
            problems.push(format!("{} missing", path.display()));
        }
    }

    if problems.is_empty() {
        info!("All prerequisites satisfied");
        Ok(())
    } else {
        error!("{} prerequisite(s) missing", problems.len());
        Err(DeployError::validation(problems.join("; ")))
    }
}

/// Reset only
pub async fn reset_command(
    workdir: &Path,
    port: Option<String>,
    manifest_path: Option<PathBuf>,
    dry_run: bool,
) -> Result<()> {
    let manifest = load_manifest(manifest_path.as_deref(), workdir)?;
    let tool = device_tool(&manifest, port.as_deref());
    let command = tool.reset();

    if dry_run {
        info!("DRY RUN: Would execute: {}", command);
        return Ok(());
    }

    tool.locate()?;
    let runner = ProcessRunner::with_working_directory(workdir);
    let output = runner
        .run(&command, Duration::from_secs(manifest.timeout_seconds))
        .await?;
    output.into_result(&command)?;
    info!("Board reset");
    Ok(())
}

/// One request against the firmware service
pub async fn probe_command(host: &str, port: u16, request: Request, timeout: u64) -> Result<()> {
    let client = ProbeClient::new(host, port).with_timeout(Duration::from_secs(timeout));
    match client.send(request).await? {
        Response::State(state) => println!("{}", serde_json::to_string_pretty(&state)?),
        Response::Locked => println!("LOCKED"),
    }
    Ok(())
}

/// Print broadcast states until `count` is reached
pub async fn listen_command(port: u16, count: Option<usize>) -> Result<()> {
    let listener = BroadcastListener::bind(port).await?;
    info!("Listening for state broadcasts on {}", listener.local_addr()?);

    let mut seen = 0usize;
    while count.map_or(true, |limit| seen < limit) {
        let (state, from) = listener.next_state().await?;
        println!("{} {}", from, serde_json::to_string(&state)?);
        seen += 1;
    }
    Ok(())
}
