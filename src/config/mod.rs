// file: src/config/mod.rs
// version: 1.0.0
// guid: 685cc9ac-6a16-4056-b014-c1db7ae11c18

//! Configuration module for mpy-deploy
//!
//! Handles loading and validation of deploy manifests.

pub mod loader;
pub mod manifest;

pub use manifest::{DeployManifest, Target, DEFAULT_PORT, DEFAULT_PORT_ENV, DEFAULT_TOOL};

use std::path::{Path, PathBuf};

/// Expand a leading `~` in a manifest path
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&raw).into_owned())
}
