//! Command request construction.

use bytes::Bytes;
use compact_str::CompactString;
use protocol::{PathError, PathResolver};
use std::collections::BTreeMap;

/// An immutable description of one command invocation.
///
/// Identifies exactly one command by hierarchical path, plus its positional
/// arguments, named options, and optional body payload. Built through
/// [`Request::builder`] and consumed exactly once by
/// [`Client::send`](crate::Client::send).
#[derive(Debug, Clone)]
pub struct Request {
    pub(crate) path: Vec<CompactString>,
    pub(crate) arguments: Vec<String>,
    pub(crate) options: BTreeMap<CompactString, String>,
    pub(crate) body: Option<Bytes>,
}

impl Request {
    /// Start building a request for the command at `path`.
    pub fn builder<I, S>(path: I) -> RequestBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<CompactString>,
    {
        RequestBuilder {
            path: path.into_iter().map(Into::into).collect(),
            arguments: Vec::new(),
            options: BTreeMap::new(),
            body: None,
        }
    }

    /// The command path.
    pub fn path(&self) -> &[CompactString] {
        &self.path
    }

    /// Positional arguments, in order.
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Named options.
    pub fn options(&self) -> &BTreeMap<CompactString, String> {
        &self.options
    }

    /// The body payload, if any.
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }
}

/// Builder for [`Request`].
#[derive(Debug)]
pub struct RequestBuilder {
    path: Vec<CompactString>,
    arguments: Vec<String>,
    options: BTreeMap<CompactString, String>,
    body: Option<Bytes>,
}

impl RequestBuilder {
    /// Append a positional argument.
    pub fn argument(mut self, value: impl Into<String>) -> Self {
        self.arguments.push(value.into());
        self
    }

    /// Set a named option. Last write wins for a repeated name.
    pub fn option(mut self, name: impl Into<CompactString>, value: impl Into<String>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    /// Attach a body payload.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Validate the path against `root` and finish the request.
    ///
    /// An empty path is rejected locally; anything else is the resolver's
    /// verdict, surfaced unchanged.
    pub fn build(self, root: &impl PathResolver) -> Result<Request, PathError> {
        if self.path.is_empty() {
            return Err(PathError::Empty);
        }
        root.resolve_path(&self.path)?;
        Ok(Request {
            path: self.path,
            arguments: self.arguments,
            options: self.options,
            body: self.body,
        })
    }
}
