//! Hierarchical command table.

use crate::exec::Context;
use compact_str::CompactString;
use protocol::{PathError, PathResolver};
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A type-erased async command handler.
pub type Handler =
    Arc<dyn Fn(Context) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>> + Send + Sync>;

/// One node of the command table: an optional handler plus named
/// subcommands.
///
/// A node without a handler is a pure group — addressable for resolution
/// but not invokable. The root node is what requests are validated and
/// dispatched against.
#[derive(Clone)]
pub struct Command {
    description: CompactString,
    run: Option<Handler>,
    subcommands: BTreeMap<CompactString, Command>,
}

impl Command {
    /// Create an invokable command from an async handler.
    ///
    /// The handler's `Err` becomes the invocation's single in-band error
    /// frame, written after every emitted value; its message is
    /// transported verbatim.
    pub fn new<F, Fut>(run: F) -> Self
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self {
            description: CompactString::default(),
            run: Some(Arc::new(move |ctx| Box::pin(run(ctx)))),
            subcommands: BTreeMap::new(),
        }
    }

    /// Create a pure group node.
    pub fn group() -> Self {
        Self {
            description: CompactString::default(),
            run: None,
            subcommands: BTreeMap::new(),
        }
    }

    /// Set the one-line description.
    pub fn describe(mut self, text: impl Into<CompactString>) -> Self {
        self.description = text.into();
        self
    }

    /// Attach a subcommand under `name`.
    pub fn subcommand(mut self, name: impl Into<CompactString>, command: Command) -> Self {
        self.subcommands.insert(name.into(), command);
        self
    }

    /// The one-line description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Walk `path` down the table and return the addressed command.
    pub fn resolve(&self, path: &[CompactString]) -> Result<&Command, PathError> {
        if path.is_empty() {
            return Err(PathError::Empty);
        }
        let mut current = self;
        for segment in path {
            current = current
                .subcommands
                .get(segment)
                .ok_or_else(|| PathError::Unknown {
                    segment: segment.clone(),
                })?;
        }
        Ok(current)
    }

    /// The handler, if this node is invokable.
    pub fn handler(&self) -> Option<Handler> {
        self.run.clone()
    }
}

impl PathResolver for Command {
    fn resolve_path(&self, path: &[CompactString]) -> Result<(), PathError> {
        self.resolve(path).map(|_| ())
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("description", &self.description)
            .field("invokable", &self.run.is_some())
            .field("subcommands", &self.subcommands)
            .finish()
    }
}
