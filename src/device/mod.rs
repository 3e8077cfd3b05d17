// file: src/device/mod.rs
// version: 1.0.0
// guid: 3a6c9e20-5b81-4d7f-8e42-c0f7a1b3d596

//! Host-side checks against a board running the deployed firmware

pub mod broadcast;
pub mod client;
pub mod protocol;

pub use broadcast::{BroadcastListener, DEFAULT_UDP_PORT};
pub use client::{ProbeClient, DEFAULT_AP_ADDRESS, DEFAULT_TCP_PORT};
pub use protocol::{AnimationState, Request, Response};
