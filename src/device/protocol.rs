// file: src/device/protocol.rs
// version: 1.0.0
// guid: c82f5a19-3e7b-4d64-b0a2-9d1e6f4c7b38

//! NUL-terminated request/response framing spoken by the deployed firmware

use crate::error::DeployError;
use crate::Result;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Frame terminator
pub const TERMINATOR: u8 = 0;

/// Sent by the client once a response has been read
pub const ACK: &[u8] = b"ACK";

/// Upper bound on a single frame
pub const MAX_FRAME_LEN: usize = 4096;

/// Requests understood by the firmware
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Request {
    /// Ask for the current animation state
    GetAnimation,
    /// Hold the current animation for a while
    LockAnimation,
}

impl Request {
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            Request::GetAnimation => b"GET_ANIMATION",
            Request::LockAnimation => b"LOCK_ANIMATION",
        }
    }

    /// Request bytes followed by the terminator
    pub fn frame(&self) -> Vec<u8> {
        let mut frame = self.as_bytes().to_vec();
        frame.push(TERMINATOR);
        frame
    }
}

/// Animation state as served over TCP and broadcast over UDP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationState {
    pub animation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_locked_animation: Option<f64>,
}

/// Decoded reply to a [`Request`]
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    State(AnimationState),
    Locked,
}

impl Response {
    /// Decode a frame payload (terminator already stripped)
    pub fn decode(request: Request, payload: &[u8]) -> Result<Self> {
        if payload.is_empty() {
            return Err(DeployError::protocol("empty response"));
        }
        if payload == b"UNKNOWN_REQUEST" {
            return Err(DeployError::protocol(format!(
                "device rejected request {}",
                String::from_utf8_lossy(request.as_bytes())
            )));
        }

        match request {
            Request::GetAnimation => {
                let text = std::str::from_utf8(payload)
                    .map_err(|e| DeployError::protocol(format!("response is not UTF-8: {}", e)))?;
                Ok(Response::State(serde_json::from_str(text)?))
            }
            Request::LockAnimation if payload == b"LOCKED" => Ok(Response::Locked),
            Request::LockAnimation => Err(DeployError::protocol(format!(
                "unexpected lock response: {}",
                String::from_utf8_lossy(payload)
            ))),
        }
    }
}

/// Read bytes up to the terminator; EOF ends the frame early.
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<u8>> {
    let mut frame = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        if reader.read(&mut byte).await? == 0 || byte[0] == TERMINATOR {
            return Ok(frame);
        }
        if frame.len() == MAX_FRAME_LEN {
            return Err(DeployError::protocol(format!(
                "frame exceeds {} bytes",
                MAX_FRAME_LEN
            )));
        }
        frame.push(byte[0]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_frame_stops_at_terminator() {
        let mut input: &[u8] = b"LOCKED\0trailing";
        let frame = read_frame(&mut input).await.unwrap();
        assert_eq!(frame, b"LOCKED");
        assert_eq!(input, b"trailing");
    }

    #[tokio::test]
    async fn test_read_frame_eof() {
        let mut input: &[u8] = b"partial";
        assert_eq!(read_frame(&mut input).await.unwrap(), b"partial");
    }

    #[tokio::test]
    async fn test_read_frame_too_long() {
        let data = vec![b'x'; MAX_FRAME_LEN + 10];
        let mut input: &[u8] = &data;
        assert!(read_frame(&mut input).await.is_err());
    }

    #[test]
    fn test_request_frame() {
        assert_eq!(Request::GetAnimation.frame(), b"GET_ANIMATION\0");
    }

    #[test]
    fn test_decode_state() {
        let payload = br#"{"animation": "rainbow", "last_locked_animation": null}"#;
        let response = Response::decode(Request::GetAnimation, payload).unwrap();
        assert_eq!(
            response,
            Response::State(AnimationState {
                animation: Some("rainbow".to_string()),
                last_locked_animation: None,
            })
        );
    }

    #[test]
    fn test_decode_unknown_and_empty() {
        assert!(Response::decode(Request::GetAnimation, b"UNKNOWN_REQUEST").is_err());
        assert!(Response::decode(Request::LockAnimation, b"").is_err());
        assert!(Response::decode(Request::GetAnimation, b"not json").is_err());
    }

    #[test]
    fn test_decode_locked() {
        assert_eq!(
            Response::decode(Request::LockAnimation, b"LOCKED").unwrap(),
            Response::Locked
        );
        assert!(Response::decode(Request::LockAnimation, b"NOPE").is_err());
    }
}
