//! Command execution.
//!
//! [`dispatch`] resolves an [`Invocation`] against the command table,
//! spawns the handler, and returns the invocation's encoded frame stream
//! plus its completion handle. Ordering contract: values are framed in
//! emission order; at most one error frame per invocation, always last;
//! the frame stream ends when the handler has returned and every emitter
//! clone is gone. Background tasks registered through
//! [`Context::background`] outlive the frame stream — completion is
//! signaled only after they finish.

use crate::command::Command;
use crate::completion::{Completion, CompletionHandle};
use anyhow::anyhow;
use bytes::Bytes;
use compact_str::CompactString;
use futures_core::Stream;
use protocol::{Frame, PathError, codec};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

/// Frames buffered between the handler and the HTTP writer.
const FRAME_BUFFER: usize = 16;

/// A decoded command invocation, as received off the wire.
#[derive(Debug, Default)]
pub struct Invocation {
    /// Command path segments.
    pub path: Vec<CompactString>,
    /// Positional arguments, in request order.
    pub arguments: Vec<String>,
    /// Named options.
    pub options: BTreeMap<CompactString, String>,
    /// Raw request body, if one was sent.
    pub body: Option<Bytes>,
}

/// Why an invocation could not be dispatched.
#[derive(Debug)]
pub enum DispatchError {
    /// No command at this path.
    Path(PathError),
    /// The path names a pure group, not an invokable command.
    NotInvokable,
}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(e) => std::fmt::Display::fmt(e, f),
            Self::NotInvokable => write!(f, "command is not invokable"),
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Path(e) => Some(e),
            Self::NotInvokable => None,
        }
    }
}

/// Writes a handler's values onto the invocation's frame stream.
#[derive(Clone)]
pub struct Emitter {
    tx: Arc<Mutex<Option<mpsc::Sender<Bytes>>>>,
}

impl Emitter {
    fn new(tx: mpsc::Sender<Bytes>) -> Self {
        Self {
            tx: Arc::new(Mutex::new(Some(tx))),
        }
    }

    /// Encode `value` as a frame and queue it for the response body.
    ///
    /// Fails once the emitter is closed or the peer has dropped the
    /// stream.
    pub async fn emit<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        let frame = Frame::Value {
            payload: serde_json::to_value(value)?,
        };
        let bytes = codec::encode_frame(&frame)?;
        let guard = self.tx.lock().await;
        let tx = guard.as_ref().ok_or_else(|| anyhow!("stream already closed"))?;
        tx.send(bytes)
            .await
            .map_err(|_| anyhow!("response stream dropped"))
    }

    /// End the value stream. Idempotent: closing twice is harmless.
    pub async fn close(&self) {
        self.tx.lock().await.take();
    }
}

/// Everything a handler gets to work with for one invocation.
///
/// Not `Clone`: one handler, one context. Dropped when the handler
/// returns, which is part of what ends the frame stream.
pub struct Context {
    invocation: Invocation,
    emitter: Emitter,
    completion: CompletionHandle,
    background: mpsc::UnboundedSender<JoinHandle<()>>,
}

impl Context {
    /// The decoded invocation.
    pub fn invocation(&self) -> &Invocation {
        &self.invocation
    }

    /// Positional argument by index.
    pub fn argument(&self, index: usize) -> Option<&str> {
        self.invocation.arguments.get(index).map(String::as_str)
    }

    /// Option value by name.
    pub fn option(&self, name: &str) -> Option<&str> {
        self.invocation.options.get(name).map(String::as_str)
    }

    /// The raw request body, if one was sent.
    pub fn body(&self) -> Option<&Bytes> {
        self.invocation.body.as_ref()
    }

    /// Emit one result value.
    pub async fn emit<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        self.emitter.emit(value).await
    }

    /// End the value stream early. Idempotent.
    pub async fn close(&self) {
        self.emitter.close().await;
    }

    /// This invocation's completion handle.
    ///
    /// Hand it to whoever needs to await full completion — including work
    /// registered via [`Context::background`] that outlives the response
    /// body.
    pub fn completion(&self) -> CompletionHandle {
        self.completion.clone()
    }

    /// Run `task` after the handler, without holding the frame stream
    /// open. Completion is signaled only once every registered task has
    /// finished.
    pub fn background<F>(&self, task: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let _ = self.background.send(tokio::spawn(task));
    }
}

/// A dispatched invocation: its frame stream and completion handle.
#[derive(Debug)]
pub struct Execution {
    completion: CompletionHandle,
    frames: mpsc::Receiver<Bytes>,
}

impl Execution {
    /// The invocation's completion handle.
    pub fn completion(&self) -> CompletionHandle {
        self.completion.clone()
    }

    /// The encoded frames, in emission order. Ends when the handler has
    /// returned and every emitter clone is gone.
    pub fn frames(self) -> impl Stream<Item = Bytes> + Send {
        let mut rx = self.frames;
        async_stream::stream! {
            while let Some(bytes) = rx.recv().await {
                yield bytes;
            }
        }
    }
}

/// Resolve `invocation` against `root` and start executing it.
///
/// Returns as soon as the handler is spawned; values arrive through the
/// execution's frame stream. A handler error is encoded as the single
/// trailing error frame, message verbatim.
pub fn dispatch(root: &Command, invocation: Invocation) -> Result<Execution, DispatchError> {
    let command = root.resolve(&invocation.path).map_err(DispatchError::Path)?;
    let run = command.handler().ok_or(DispatchError::NotInvokable)?;

    let (tx, rx) = mpsc::channel(FRAME_BUFFER);
    let (completion, handle) = Completion::new();
    let (bg_tx, mut bg_rx) = mpsc::unbounded_channel();

    let ctx = Context {
        invocation,
        emitter: Emitter::new(tx.clone()),
        completion: handle.clone(),
        background: bg_tx,
    };

    tokio::spawn(async move {
        if let Err(e) = run(ctx).await {
            tracing::debug!("command failed: {e}");
            match codec::encode_frame(&Frame::Error {
                message: e.to_string(),
            }) {
                Ok(bytes) => {
                    let _ = tx.send(bytes).await;
                }
                Err(enc) => tracing::error!("failed to encode error frame: {enc}"),
            }
        }
        // Close the frame stream before waiting on background work: the
        // body boundary and full completion are independent events.
        drop(tx);
        while let Some(task) = bg_rx.recv().await {
            if let Err(e) = task.await {
                tracing::warn!("background task failed: {e}");
            }
        }
        completion.signal();
    });

    Ok(Execution {
        completion: handle,
        frames: rx,
    })
}
