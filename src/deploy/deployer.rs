// file: src/deploy/deployer.rs
// version: 1.0.0
// guid: 6a0c2f84-19d7-4e3b-a5c6-8f1e7d2b4c95

//! Sequential execution of a deploy plan

use super::plan::{DeployPlan, DeployStep};
use crate::error::DeployError;
use crate::reporter::{DeployReport, StepStatus};
use crate::tool::mpremote::is_already_exists;
use crate::tool::{CommandLine, CommandRunner, DeviceTool};
use crate::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Knobs for a deployment run
#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// Log commands instead of running them
    pub dry_run: bool,
    /// Continue after a failed step instead of stopping
    pub keep_going: bool,
    /// Per-command timeout
    pub timeout: Duration,
    /// Draw a progress bar on stderr
    pub show_progress: bool,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            keep_going: false,
            timeout: Duration::from_secs(60),
            show_progress: false,
        }
    }
}

/// Runs plan steps one at a time through a [`CommandRunner`]
pub struct Deployer<R: CommandRunner> {
    runner: R,
    tool: DeviceTool,
    options: DeployOptions,
}

impl<R: CommandRunner> Deployer<R> {
    pub fn new(runner: R, tool: DeviceTool, options: DeployOptions) -> Self {
        Self {
            runner,
            tool,
            options,
        }
    }

    /// Execute every step in order.
    ///
    /// Without `keep_going` the first failure marks all remaining steps,
    /// including the reset, as skipped.
    pub async fn run(&self, plan: &DeployPlan) -> DeployReport {
        let mut report = DeployReport::new(
            self.tool.program(),
            self.tool.port(),
            self.options.dry_run,
        );
        let progress = self.progress_bar(plan.len() as u64);
        let mut aborted = false;

        info!(
            "Deploying {} steps to {} via {}",
            plan.len(),
            self.tool.port(),
            self.tool.program()
        );

        for step in &plan.steps {
            progress.set_message(step.describe());

            if aborted {
                report.record(step, StepStatus::Skipped, Duration::ZERO, None);
                progress.inc(1);
                continue;
            }

            let started = Instant::now();
            match self.execute_step(step, &plan.workdir).await {
                Ok(note) => {
                    report.record(step, StepStatus::Completed, started.elapsed(), note);
                }
                Err(e) => {
                    error!("Step failed: {}: {}", step.describe(), e);
                    report.record(step, StepStatus::Failed, started.elapsed(), Some(e.to_string()));
                    if !self.options.keep_going {
                        warn!("Stopping after first failure; remaining steps skipped");
                        aborted = true;
                    }
                }
            }
            progress.inc(1);
        }

        progress.finish_and_clear();
        report.finish();
        report
    }

    /// Run a single step; `Ok(Some(note))` carries a remark for the report
    async fn execute_step(&self, step: &DeployStep, workdir: &Path) -> Result<Option<String>> {
        match step {
            DeployStep::CleanLocal { path } => {
                let target = workdir.join(path);
                if self.options.dry_run {
                    info!("DRY RUN: Would remove {}", target.display());
                    return Ok(None);
                }
                // Symlinks are removed, never followed
                let metadata = match tokio::fs::symlink_metadata(&target).await {
                    Ok(metadata) => metadata,
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                        debug!("Nothing to remove at {}", target.display());
                        return Ok(Some("not present".to_string()));
                    }
                    Err(e) => return Err(e.into()),
                };
                if metadata.file_type().is_dir() {
                    tokio::fs::remove_dir_all(&target).await?;
                } else {
                    tokio::fs::remove_file(&target).await?;
                }
                debug!("Removed {}", target.display());
                Ok(None)
            }
            DeployStep::MakeDir { remote } => {
                let command = self.tool.mkdir(remote);
                let Some(output) = self.invoke(&command).await? else {
                    return Ok(None);
                };
                if output.success() {
                    Ok(None)
                } else if is_already_exists(&output) {
                    debug!("Remote directory :{} already exists", remote);
                    Ok(Some("already exists".to_string()))
                } else {
                    output.into_result(&command).map(|_| None)
                }
            }
            DeployStep::CopyFile { local, remote } => {
                let source = workdir.join(local);
                if !source.is_file() {
                    return Err(DeployError::file_not_found(format!(
                        "{} disappeared before it could be copied",
                        source.display()
                    )));
                }
                let command = self.tool.copy(local, remote);
                match self.invoke(&command).await? {
                    Some(output) => output.into_result(&command).map(|_| None),
                    None => Ok(None),
                }
            }
            DeployStep::Reset => {
                let command = self.tool.reset();
                match self.invoke(&command).await? {
                    Some(output) => output.into_result(&command).map(|_| None),
                    None => Ok(None),
                }
            }
        }
    }

    /// Run a device command, or only log it in dry-run mode
    async fn invoke(&self, command: &CommandLine) -> Result<Option<crate::tool::CommandOutput>> {
        if self.options.dry_run {
            info!("DRY RUN: Would execute: {}", command);
            return Ok(None);
        }
        info!("Executing: {}", command);
        self.runner.run(command, self.options.timeout).await.map(Some)
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.options.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    }
}
