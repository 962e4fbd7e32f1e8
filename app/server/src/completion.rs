//! Per-invocation completion signal.
//!
//! Stream exhaustion tells a caller that no more values are coming; it
//! does not tell them the command is finished. A command may keep working
//! after the response body has closed (deferred writes, cleanup), so each
//! invocation gets its own one-shot [`Completion`] that the executor
//! signals only once everything — handler and registered background tasks
//! — is done.

use tokio::sync::watch;

/// Sender side of the one-shot completion event.
///
/// Minted once per invocation; consumed by [`Completion::signal`], so the
/// pending→signaled transition can only happen once.
#[derive(Debug)]
pub struct Completion {
    tx: watch::Sender<bool>,
}

impl Completion {
    /// Create the event and its first observer handle.
    pub fn new() -> (Self, CompletionHandle) {
        let (tx, rx) = watch::channel(false);
        (Self { tx }, CompletionHandle { rx })
    }

    /// Mint another observer handle.
    pub fn handle(&self) -> CompletionHandle {
        CompletionHandle {
            rx: self.tx.subscribe(),
        }
    }

    /// Mark the invocation as fully finished, waking every observer.
    pub fn signal(self) {
        let _ = self.tx.send(true);
    }
}

/// Observer handle for a [`Completion`].
///
/// Cheap to clone; any number of tasks may wait concurrently.
#[derive(Debug, Clone)]
pub struct CompletionHandle {
    rx: watch::Receiver<bool>,
}

impl CompletionHandle {
    /// Whether the invocation has fully finished.
    pub fn is_signaled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Suspend until the invocation has fully finished.
    ///
    /// Returns immediately if already signaled. A [`Completion`] dropped
    /// without signalling counts as finished — the invocation is gone
    /// either way.
    pub async fn wait(&self) {
        let mut rx = self.rx.clone();
        let _ = rx.wait_for(|done| *done).await;
    }
}
