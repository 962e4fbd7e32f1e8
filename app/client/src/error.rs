//! Client-side error taxonomy.
//!
//! Three independent failure channels, kept distinguishable at the type
//! level: [`TransportError`] (the HTTP request never yielded a usable
//! response stream, or the connection broke mid-body), [`RemoteError`]
//! (the command itself failed and said so in-band), and [`DecodeError`]
//! (the protocol broke: a frame or payload that cannot be decoded).
//! Construction-time path failures reuse [`protocol::PathError`] directly.

use protocol::codec::FrameError;

/// Failure at the HTTP/connection layer.
///
/// Never co-occurs with a decoded value; when `send` returns this, no
/// response stream exists at all.
#[derive(Debug)]
pub enum TransportError {
    /// The request could not be issued or the connection failed.
    Http(reqwest::Error),
    /// The server answered with a non-success status.
    Status {
        /// HTTP status code.
        code: u16,
    },
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http(e) => write!(f, "request failed: {e}"),
            Self::Status { code } => write!(f, "server returned status {code}"),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            Self::Status { .. } => None,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

/// An application-level error decoded from the stream.
///
/// Displays as exactly the message the server encoded, so error text
/// observed here is byte-identical to what the command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    message: String,
}

impl RemoteError {
    pub(crate) fn new(message: String) -> Self {
        Self { message }
    }

    /// The server's error message, verbatim.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for RemoteError {}

/// The response body could not be decoded.
///
/// Distinct from [`RemoteError`] so callers can tell "the command failed"
/// from "the protocol broke". Fatal for the stream.
#[derive(Debug)]
pub enum DecodeError {
    /// Malformed frame envelope.
    Frame(FrameError),
    /// A value payload did not deserialize into the expected type.
    Payload(serde_json::Error),
    /// The body ended in the middle of a frame.
    Truncated {
        /// Bytes left undecoded when the body closed.
        remaining: usize,
    },
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Frame(e) => write!(f, "malformed frame: {e}"),
            Self::Payload(e) => write!(f, "unexpected payload: {e}"),
            Self::Truncated { remaining } => {
                write!(f, "response body ended mid-frame ({remaining} bytes pending)")
            }
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Frame(e) => Some(e),
            Self::Payload(e) => Some(e),
            Self::Truncated { .. } => None,
        }
    }
}

/// Everything `Response::next` can fail with.
#[derive(Debug)]
pub enum ResponseError {
    /// The command reported an error in-band.
    Remote(RemoteError),
    /// The protocol broke while decoding the body.
    Decode(DecodeError),
    /// The connection failed mid-body.
    Transport(reqwest::Error),
}

impl ResponseError {
    /// The in-band error, if that is what this is.
    pub fn as_remote(&self) -> Option<&RemoteError> {
        match self {
            Self::Remote(e) => Some(e),
            _ => None,
        }
    }
}

impl std::fmt::Display for ResponseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // Verbatim: callers compare this text against what the server
            // encoded.
            Self::Remote(e) => std::fmt::Display::fmt(e, f),
            Self::Decode(e) => write!(f, "decode error: {e}"),
            Self::Transport(e) => write!(f, "transport error: {e}"),
        }
    }
}

impl std::error::Error for ResponseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Remote(e) => Some(e),
            Self::Decode(e) => Some(e),
            Self::Transport(e) => Some(e),
        }
    }
}
