//! Manta client — issues command requests against a manta server and
//! decodes the streamed results.
//!
//! A [`Request`] names a command by hierarchical path; [`Client::send`]
//! serializes it onto one HTTP POST and hands back a [`Response`], a lazy
//! cursor over the typed values the command emits. See the `manta-protocol`
//! crate for the wire format.

use compact_str::CompactString;
use protocol::{ARG_QUERY_KEY, FRAME_CONTENT_TYPE, PROTOCOL_VERSION, VERSION_HEADER, command_url};
use reqwest::header;
use std::time::Duration;

pub use error::{DecodeError, RemoteError, ResponseError, TransportError};
pub use protocol::{PathError, PathResolver};
pub use request::{Request, RequestBuilder};
pub use response::Response;

pub mod error;
pub mod request;
pub mod response;

/// Client configuration for connecting to a manta server.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL.
    pub base_url: CompactString,
    /// Optional overall timeout per request. `None` means no limit, which
    /// is the default: command streams may stay open indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: CompactString::from("http://127.0.0.1:5001"),
            timeout: None,
        }
    }
}

/// HTTP client for a manta server.
///
/// Cheap to clone; each [`Client::send`] opens exactly one request on the
/// shared connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    config: ClientConfig,
    http: reqwest::Client,
}

impl Client {
    /// Create a client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self { config, http })
    }

    /// Create a client for `base_url` with default configuration.
    pub fn for_url(base_url: impl Into<CompactString>) -> Result<Self, TransportError> {
        Self::new(ClientConfig {
            base_url: base_url.into(),
            ..ClientConfig::default()
        })
    }

    /// Access the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send a request and return the result stream.
    ///
    /// Consumes the request, opens one connection, and resolves as soon as
    /// response headers arrive — the body is decoded lazily by
    /// [`Response::next`]. A connection failure or non-success status is a
    /// [`TransportError`]; no partial stream is returned in that case.
    pub async fn send(&self, request: Request) -> Result<Response, TransportError> {
        let url = command_url(&self.config.base_url, &request.path);
        tracing::debug!("sending command to {url}");

        let mut query: Vec<(&str, &str)> = Vec::with_capacity(
            request.arguments.len() + request.options.len(),
        );
        for arg in &request.arguments {
            query.push((ARG_QUERY_KEY, arg.as_str()));
        }
        for (name, value) in &request.options {
            query.push((name.as_str(), value.as_str()));
        }

        let mut builder = self
            .http
            .post(&url)
            .query(&query)
            .header(header::ACCEPT, FRAME_CONTENT_TYPE)
            .header(VERSION_HEADER, PROTOCOL_VERSION);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!("command rejected with status {status}");
            return Err(TransportError::Status {
                code: status.as_u16(),
            });
        }

        Ok(Response::from_body(response.bytes_stream()))
    }
}
