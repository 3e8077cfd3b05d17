// file: src/cli/mod.rs
// version: 1.0.0
// guid: 91c4e7a2-3f08-4d6b-a5e9-0b2d8c6f1e37

//! Command line interface for mpy-deploy

pub mod args;
pub mod commands;

pub use args::{Cli, Commands};
pub use commands::*;
