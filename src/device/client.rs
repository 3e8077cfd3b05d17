// file: src/device/client.rs
// version: 1.0.0
// guid: 0f9d3b62-8a14-4e57-ac7b-5e2c1d9f6a08

//! TCP probe against the firmware's soft-AP service

use super::protocol::{read_frame, Request, Response, ACK};
use crate::error::DeployError;
use crate::Result;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info};

/// Address the firmware gives itself in access-point mode
pub const DEFAULT_AP_ADDRESS: &str = "192.168.4.1";

/// TCP port of the firmware's request service
pub const DEFAULT_TCP_PORT: u16 = 8080;

/// One request/response exchange with a running board
#[derive(Debug, Clone)]
pub struct ProbeClient {
    host: String,
    port: u16,
    timeout: Duration,
}

impl ProbeClient {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: Duration::from_secs(10),
        }
    }

    /// Applies to connect and to reading the response separately
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Send `request`, read the reply, acknowledge it
    pub async fn send(&self, request: Request) -> Result<Response> {
        let addr = format!("{}:{}", self.host, self.port);
        debug!("Connecting to {}", addr);

        let mut stream = timeout(self.timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| DeployError::timeout(format!("connecting to {}", addr)))??;

        stream.write_all(&request.frame()).await?;
        stream.flush().await?;

        let payload = timeout(self.timeout, read_frame(&mut stream))
            .await
            .map_err(|_| DeployError::timeout(format!("waiting for reply from {}", addr)))??;

        stream.write_all(ACK).await?;
        stream.flush().await?;
        // The firmware may have closed already
        let _ = stream.shutdown().await;

        let response = Response::decode(request, &payload)?;
        info!("Probe {} answered: {:?}", addr, response);
        Ok(response)
    }
}
