// file: src/deploy/plan.rs
// version: 1.0.0
// guid: e3a91b56-4d0c-4f27-bb18-6c5d2e9f0a73

//! Turning a manifest into an ordered list of deploy steps

use crate::config::manifest::to_remote_path;
use crate::config::{DeployManifest, Target};
use crate::error::DeployError;
use crate::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// One unit of work in a deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeployStep {
    /// Remove a local build-artifact directory
    CleanLocal { path: PathBuf },
    /// Ensure a directory exists on the board
    MakeDir { remote: String },
    /// Push a local file to the board
    CopyFile { local: PathBuf, remote: String },
    /// Soft-reset the board
    Reset,
}

impl DeployStep {
    pub fn describe(&self) -> String {
        match self {
            DeployStep::CleanLocal { path } => format!("remove local {}", path.display()),
            DeployStep::MakeDir { remote } => format!("mkdir :{}", remote),
            DeployStep::CopyFile { local, remote } => {
                format!("copy {} -> :{}", local.display(), remote)
            }
            DeployStep::Reset => "reset device".to_string(),
        }
    }
}

/// Ordered steps for a run, with local paths relative to `workdir`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployPlan {
    pub workdir: PathBuf,
    pub steps: Vec<DeployStep>,
}

impl DeployPlan {
    /// Build the plan, checking that every local source exists.
    ///
    /// Order: clean directories, then targets as listed, then reset.
    /// Clean paths stay relative to `workdir`.
    pub fn build(manifest: &DeployManifest, workdir: &Path) -> Result<Self> {
        manifest.validate()?;
        let mut steps = Vec::new();

        for dir in &manifest.clean {
            steps.push(DeployStep::CleanLocal { path: dir.clone() });
        }

        for target in &manifest.targets {
            let local = target.local_expanded();
            let on_disk = workdir.join(&local);

            match target {
                Target::Dir { .. } => {
                    if !on_disk.is_dir() {
                        return Err(DeployError::file_not_found(format!(
                            "payload directory {} does not exist",
                            on_disk.display()
                        )));
                    }
                    expand_dir(&local, &on_disk, &target.remote(), &mut steps)?;
                }
                Target::File { .. } => {
                    if !on_disk.is_file() {
                        return Err(DeployError::file_not_found(format!(
                            "payload file {} does not exist",
                            on_disk.display()
                        )));
                    }
                    steps.push(DeployStep::CopyFile {
                        local,
                        remote: target.remote(),
                    });
                }
            }
        }

        if manifest.reset {
            steps.push(DeployStep::Reset);
        }

        debug!("Planned {} steps", steps.len());
        Ok(Self {
            workdir: workdir.to_path_buf(),
            steps,
        })
    }

    /// Drop the trailing reset
    pub fn without_reset(mut self) -> Self {
        self.steps.retain(|s| *s != DeployStep::Reset);
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn copy_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, DeployStep::CopyFile { .. }))
            .count()
    }
}

/// Bytecode caches and dotfiles never go to the board
fn is_payload(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    !(name.starts_with('.') || name == "__pycache__" || name.ends_with(".pyc"))
}

fn expand_dir(local: &Path, on_disk: &Path, remote: &str, steps: &mut Vec<DeployStep>) -> Result<()> {
    if !remote.is_empty() {
        steps.push(DeployStep::MakeDir {
            remote: remote.to_string(),
        });
    }

    let walker = WalkDir::new(on_disk)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(is_payload);

    for entry in walker {
        let entry = entry.map_err(|e| {
            DeployError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("failed to walk {}: {}", on_disk.display(), e),
            ))
        })?;

        let relative = entry
            .path()
            .strip_prefix(on_disk)
            .map_err(|e| DeployError::validation(e.to_string()))?;
        let child_remote = join_remote(remote, &to_remote_path(relative));

        if entry.file_type().is_dir() {
            steps.push(DeployStep::MakeDir {
                remote: child_remote,
            });
        } else if entry.file_type().is_file() {
            steps.push(DeployStep::CopyFile {
                local: local.join(relative),
                remote: child_remote,
            });
        }
    }

    Ok(())
}

fn join_remote(base: &str, child: &str) -> String {
    if base.is_empty() {
        child.to_string()
    } else {
        format!("{}/{}", base, child)
    }
}
