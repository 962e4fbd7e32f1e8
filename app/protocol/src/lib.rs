//! Manta wire protocol shared between server and client.
//!
//! A command invocation travels as one HTTP POST; the response body is a
//! sequence of length-prefixed [`Frame`]s (see [`codec`]). The types here
//! are the only vocabulary the two sides share: the frame tagged union,
//! the request-to-URL mapping, and the path-resolution seam used to
//! validate a request before it is sent.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod codec;

/// Current protocol version.
pub const PROTOCOL_VERSION: &str = "0.1";

/// Request header carrying [`PROTOCOL_VERSION`].
pub const VERSION_HEADER: &str = "x-manta-protocol";

/// URL prefix every command request is posted under.
pub const API_PREFIX: &str = "/api/v0";

/// Content type of a frame-stream response body.
pub const FRAME_CONTENT_TYPE: &str = "application/x-manta-frames";

/// Query key carrying positional arguments. Repeated once per argument;
/// every other query key is an option. The name is therefore reserved and
/// cannot be used as an option name.
pub const ARG_QUERY_KEY: &str = "arg";

/// Sole key of a boxed value payload (see [`unbox`]).
pub const BOXED_KEY: &str = "boxed";

/// One decoded unit of a response body.
///
/// A response is zero or more `Value` frames optionally terminated by a
/// single `Error` frame; nothing may legitimately follow an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Frame {
    /// One result value, in server emission order.
    Value {
        /// The encoded value. May be boxed (see [`unbox`]).
        payload: Value,
    },
    /// The in-band stream error. Terminal for the invocation.
    Error {
        /// Error message, transported verbatim.
        message: String,
    },
}

/// Dereference one level of payload boxing.
///
/// An emitter may indirect a value payload as the single-key object
/// `{"boxed": <value>}`. Decoders call this before surfacing the payload,
/// so callers only ever observe the inner value. Exactly one level is
/// unwrapped; any other shape passes through untouched.
pub fn unbox(payload: Value) -> Value {
    match payload {
        Value::Object(map) if map.len() == 1 && map.contains_key(BOXED_KEY) => map
            .into_iter()
            .next()
            .map(|(_, inner)| inner)
            .unwrap_or(Value::Null),
        other => other,
    }
}

/// Build the URL a request for `path` is posted to.
pub fn command_url(base: &str, path: &[CompactString]) -> String {
    let base = base.trim_end_matches('/');
    let mut url = String::with_capacity(base.len() + API_PREFIX.len() + 16);
    url.push_str(base);
    url.push_str(API_PREFIX);
    for segment in path {
        url.push('/');
        url.push_str(segment);
    }
    url
}

/// Resolves hierarchical command paths.
///
/// Implemented by the server's command table and handed to the client at
/// request-construction time so an unroutable request fails before a
/// connection is ever opened.
pub trait PathResolver {
    /// Check that `path` addresses a known command.
    fn resolve_path(&self, path: &[CompactString]) -> Result<(), PathError>;
}

/// Why a command path failed to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The path has no segments.
    Empty,
    /// A segment does not name a command at its level of the table.
    Unknown {
        /// The first segment that failed to resolve.
        segment: CompactString,
    },
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty command path"),
            Self::Unknown { segment } => write!(f, "unknown command: {segment}"),
        }
    }
}

impl std::error::Error for PathError {}
