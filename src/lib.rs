// file: src/lib.rs
// version: 1.0.0
// guid: d6b2f8e0-7a39-4c15-9e84-5f1a3c0d7b62

//! # mpy-deploy
//!
//! Pushes a MicroPython payload onto a serial-attached board through
//! `mpremote`, one step at a time, and resets the board afterwards.
//!
//! Unlike a plain shell script, a failing step stops the run (unless asked
//! to keep going) and every local source is checked before the board is
//! touched.

pub mod cli;
pub mod config;
pub mod deploy;
pub mod device;
pub mod error;
pub mod logging;
pub mod reporter;
pub mod tool;

pub use error::{DeployError, Result};

/// Version information for the utility
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
