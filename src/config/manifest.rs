// file: src/config/manifest.rs
// version: 1.0.0
// guid: 27aba698-f764-46e2-a5bc-a987e2724b4b

//! Deploy manifest structures

use super::expand_path;
use crate::error::DeployError;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Serial port used when neither flag, environment nor manifest name one
pub const DEFAULT_PORT: &str = "/dev/ttyACM0";

/// Environment variable consulted for the serial port
pub const DEFAULT_PORT_ENV: &str = "PORT";

/// Device-management tool invoked for every remote operation
pub const DEFAULT_TOOL: &str = "mpremote";

/// What to push to the board, and how
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployManifest {
    /// Device-management binary (looked up on PATH)
    pub tool: String,
    /// Serial port, overridden by the `port_env` variable when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    /// Name of the environment variable holding the port
    pub port_env: String,
    /// Local build-artifact directories removed before deploying
    pub clean: Vec<PathBuf>,
    /// Ordered payload entries
    pub targets: Vec<Target>,
    /// Reset the board after the last copy
    pub reset: bool,
    /// Per-invocation timeout for the external tool
    pub timeout_seconds: u64,
}

/// A single payload entry: a directory of files or one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Target {
    Dir {
        dir: PathBuf,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        remote: Option<String>,
    },
    File {
        file: PathBuf,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        remote: Option<String>,
    },
}

impl Target {
    /// Directory target with the same remote name
    pub fn dir(path: impl Into<PathBuf>) -> Self {
        Target::Dir {
            dir: path.into(),
            remote: None,
        }
    }

    /// File target with the same remote name
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Target::File {
            file: path.into(),
            remote: None,
        }
    }

    /// Local path as written in the manifest
    pub fn local(&self) -> &Path {
        match self {
            Target::Dir { dir, .. } => dir,
            Target::File { file, .. } => file,
        }
    }

    /// Local path after `~` expansion
    pub fn local_expanded(&self) -> PathBuf {
        expand_path(self.local())
    }

    /// Remote path on the board, without the leading `:`.
    ///
    /// Without an explicit `remote`, a relative local path is mirrored as is.
    /// Home-relative and absolute paths land in the board root under their
    /// last component.
    pub fn remote(&self) -> String {
        let explicit = match self {
            Target::Dir { remote, .. } | Target::File { remote, .. } => remote.as_deref(),
        };
        match explicit {
            Some(r) => r.trim_matches('/').to_string(),
            None if is_home_relative(self.local()) || self.local().is_absolute() => self
                .local_expanded()
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            None => to_remote_path(self.local()),
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, Target::Dir { .. })
    }
}

impl Default for DeployManifest {
    fn default() -> Self {
        Self {
            tool: DEFAULT_TOOL.to_string(),
            port: None,
            port_env: DEFAULT_PORT_ENV.to_string(),
            clean: vec![PathBuf::from("__pycache__")],
            targets: vec![
                Target::dir("lib"),
                Target::dir("animations"),
                Target::file("wifi_consts.py"),
                Target::file("utils.py"),
                Target::file("wifi_client.py"),
                Target::file("wlan_main.py"),
                Target::file("main.py"),
            ],
            reset: true,
            timeout_seconds: 60,
        }
    }
}

impl DeployManifest {
    /// Validate the manifest
    pub fn validate(&self) -> crate::Result<()> {
        if self.tool.trim().is_empty() {
            return Err(DeployError::validation("tool must not be empty"));
        }

        if self.port_env.trim().is_empty() {
            return Err(DeployError::validation("port_env must not be empty"));
        }

        if self.timeout_seconds == 0 {
            return Err(DeployError::validation(
                "timeout_seconds must be greater than zero",
            ));
        }

        if self.targets.is_empty() {
            return Err(DeployError::validation("manifest has no targets"));
        }

        for dir in &self.clean {
            if is_home_relative(dir) || !is_contained(dir) {
                return Err(DeployError::validation(format!(
                    "clean path must be a relative path below the working directory: {}",
                    dir.display()
                )));
            }
        }

        for target in &self.targets {
            let remote = target.remote();
            if remote.is_empty() && !target.is_dir() {
                return Err(DeployError::validation(format!(
                    "empty remote path for {}",
                    target.local().display()
                )));
            }
            if remote.split('/').any(|seg| seg == "..") || remote.starts_with(':') {
                return Err(DeployError::validation(format!(
                    "invalid remote path: {}",
                    remote
                )));
            }
        }

        Ok(())
    }

    /// Resolve the serial port from flag, environment, manifest, then default
    pub fn resolve_port(&self, flag: Option<&str>) -> String {
        self.resolve_port_with(flag, std::env::var(&self.port_env).ok())
    }

    /// Same as [`resolve_port`](Self::resolve_port) with an explicit environment value
    pub fn resolve_port_with(&self, flag: Option<&str>, env_value: Option<String>) -> String {
        // An empty variable counts as unset
        flag.map(str::to_string)
            .or_else(|| env_value.filter(|v| !v.is_empty()))
            .or_else(|| self.port.clone())
            .unwrap_or_else(|| DEFAULT_PORT.to_string())
    }
}

/// Convert a relative local path into a `/`-separated remote path
pub fn to_remote_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn is_home_relative(path: &Path) -> bool {
    path.to_string_lossy().starts_with('~')
}

fn is_contained(path: &Path) -> bool {
    !path.as_os_str().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}
