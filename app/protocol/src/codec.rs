//! Length-prefixed framing codec for the response body.
//!
//! Wire format: `[u32 BE length][JSON payload]`. The length is the byte
//! count of the JSON payload only (not including the 4-byte header).
//!
//! Decoding is incremental: the reader feeds whatever bytes it has into a
//! buffer and [`decode_frame`] consumes exactly one frame once enough bytes
//! have accumulated. A body that ends on a frame boundary is clean
//! exhaustion; a body that ends mid-frame is a framing defect the caller
//! detects by finding leftover bytes in the buffer.

use crate::Frame;
use bytes::{Bytes, BytesMut};

/// Maximum frame payload size: 16 MiB.
pub const MAX_FRAME_SIZE: u32 = 16 * 1024 * 1024;

/// Byte length of the frame header.
const LEN_PREFIX: usize = 4;

/// Errors that can occur while encoding or decoding a frame.
#[derive(Debug)]
pub enum FrameError {
    /// Frame exceeds the maximum allowed size.
    TooLarge {
        /// Claimed or actual payload size in bytes.
        size: usize,
    },
    /// JSON serialization/deserialization error.
    Json(serde_json::Error),
}

impl std::fmt::Display for FrameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooLarge { size } => {
                write!(f, "frame too large: {size} bytes (max {MAX_FRAME_SIZE})")
            }
            Self::Json(e) => write!(f, "json error: {e}"),
        }
    }
}

impl std::error::Error for FrameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            Self::TooLarge { .. } => None,
        }
    }
}

impl From<serde_json::Error> for FrameError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Encode a frame as a length-prefixed JSON byte block.
pub fn encode_frame(frame: &Frame) -> Result<Bytes, FrameError> {
    let data = serde_json::to_vec(frame)?;
    if data.len() > MAX_FRAME_SIZE as usize {
        return Err(FrameError::TooLarge { size: data.len() });
    }
    let mut buf = BytesMut::with_capacity(LEN_PREFIX + data.len());
    buf.extend_from_slice(&(data.len() as u32).to_be_bytes());
    buf.extend_from_slice(&data);
    Ok(buf.freeze())
}

/// Decode one frame from the front of `buf`, if a whole frame is present.
///
/// Returns `Ok(None)` when more bytes are needed; nothing is consumed in
/// that case. On success the frame's bytes (header included) are consumed
/// from the buffer.
pub fn decode_frame(buf: &mut BytesMut) -> Result<Option<Frame>, FrameError> {
    if buf.len() < LEN_PREFIX {
        return Ok(None);
    }
    let mut header = [0u8; LEN_PREFIX];
    header.copy_from_slice(&buf[..LEN_PREFIX]);
    let len = u32::from_be_bytes(header);
    if len > MAX_FRAME_SIZE {
        return Err(FrameError::TooLarge { size: len as usize });
    }
    let len = len as usize;
    if buf.len() < LEN_PREFIX + len {
        return Ok(None);
    }
    let _ = buf.split_to(LEN_PREFIX);
    let payload = buf.split_to(len);
    let frame = serde_json::from_slice(&payload)?;
    Ok(Some(frame))
}
