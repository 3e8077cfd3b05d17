// file: src/logging/mod.rs
// version: 1.0.0
// guid: f2a7c419-0d6e-4b83-95c1-7e3b8d2a6f04

//! Logging system for mpy-deploy

pub mod logger;

pub use logger::{init_json_logger, init_logger};
