// file: src/config/loader.rs
// version: 1.0.0
// guid: 4d2b8e51-93c7-4f0a-b6e2-1f7a9c3d5e84

//! Manifest loading and environment variable substitution

use super::DeployManifest;
use crate::error::DeployError;
use crate::Result;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Project manifest names probed in the working directory, in order
pub const PROJECT_MANIFESTS: [&str; 3] = ["deploy.toml", "deploy.yaml", "deploy.yml"];

/// Manifest loader with environment variable substitution
pub struct ConfigLoader {
    env_vars: HashMap<String, String>,
}

impl ConfigLoader {
    /// Create a new config loader
    pub fn new() -> Self {
        Self {
            env_vars: std::env::vars().collect(),
        }
    }

    /// Load a manifest from a TOML or YAML file, chosen by extension
    pub fn load_manifest<P: AsRef<Path>>(&self, path: P) -> Result<DeployManifest> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            DeployError::config(format!(
                "Failed to read manifest {}: {}",
                path.display(),
                e
            ))
        })?;

        let expanded = self.expand_env_vars(&content)?;
        let manifest: DeployManifest = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&expanded)?,
            _ => toml::from_str(&expanded)?,
        };

        manifest.validate()?;

        Ok(manifest)
    }

    /// Pick the manifest for a run.
    ///
    /// An explicit path wins; otherwise the first project manifest found in
    /// `workdir`, then the user manifest, then the built-in default.
    pub fn discover(&self, explicit: Option<&Path>, workdir: &Path) -> Result<DeployManifest> {
        if let Some(path) = explicit {
            info!("Loading manifest from: {}", path.display());
            return self.load_manifest(path);
        }

        for name in PROJECT_MANIFESTS {
            let candidate = workdir.join(name);
            if candidate.exists() {
                info!("Loading project manifest from: {}", candidate.display());
                return self.load_manifest(candidate);
            }
        }

        if let Some(user) = Self::user_manifest_path() {
            if user.exists() {
                info!("Loading user manifest from: {}", user.display());
                return self.load_manifest(user);
            }
        }

        debug!("No manifest found, using built-in defaults");
        Ok(DeployManifest::default())
    }

    /// Location of the per-user manifest
    pub fn user_manifest_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("mpy-deploy").join("deploy.toml"))
    }

    /// Expand `${VAR}` references in manifest content
    fn expand_env_vars(&self, content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| DeployError::config(format!("Invalid regex pattern: {}", e)))?;

        let mut missing_vars = Vec::new();
        let result = re.replace_all(content, |cap: &regex::Captures<'_>| {
            match self.env_vars.get(&cap[1]) {
                Some(value) => value.clone(),
                None => {
                    missing_vars.push(cap[1].to_string());
                    cap[0].to_string()
                }
            }
        });

        if !missing_vars.is_empty() {
            missing_vars.dedup();
            return Err(DeployError::config(format!(
                "Missing environment variables: {}",
                missing_vars.join(", ")
            )));
        }

        Ok(result.into_owned())
    }

    /// Set environment variable for substitution
    pub fn set_env_var(&mut self, key: String, value: String) {
        self.env_vars.insert(key, value);
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
