// file: src/device/broadcast.rs
// version: 1.0.0
// guid: 7b4e0a95-d2c6-4f18-93e7-1a8c5f2d0b46

//! Listener for the firmware's UDP state broadcasts

use super::protocol::AnimationState;
use crate::Result;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::{debug, warn};

/// UDP port the firmware broadcasts on
pub const DEFAULT_UDP_PORT: u16 = 8081;

pub struct BroadcastListener {
    socket: UdpSocket,
}

impl BroadcastListener {
    /// Bind on all interfaces; port 0 picks a free one
    pub async fn bind(port: u16) -> Result<Self> {
        let socket = UdpSocket::bind(("0.0.0.0", port)).await?;
        debug!("Listening for broadcasts on {}", socket.local_addr()?);
        Ok(Self { socket })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Wait for the next well-formed state datagram; malformed ones are logged and dropped
    pub async fn next_state(&self) -> Result<(AnimationState, SocketAddr)> {
        let mut buf = [0u8; 1500];
        loop {
            let (len, from) = self.socket.recv_from(&mut buf).await?;
            match serde_json::from_slice::<AnimationState>(&buf[..len]) {
                Ok(state) => return Ok((state, from)),
                Err(e) => warn!("Ignoring malformed datagram from {}: {}", from, e),
            }
        }
    }
}
