// file: src/tool/mod.rs
// version: 1.0.0
// guid: 5f8a0c3d-7e21-4b96-9d4a-c6e1b2f8a057

//! External device-management tool invocation

pub mod mpremote;
pub mod runner;

pub use mpremote::DeviceTool;
pub use runner::{CommandLine, CommandOutput, CommandRunner, ProcessRunner};
