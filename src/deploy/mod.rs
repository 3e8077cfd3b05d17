// file: src/deploy/mod.rs
// version: 1.0.0
// guid: 2d5e8b13-a7f6-4c90-9e31-4b0a6c7d8f25

//! Deployment planning and execution

pub mod deployer;
pub mod plan;

pub use deployer::{DeployOptions, Deployer};
pub use plan::{DeployPlan, DeployStep};
