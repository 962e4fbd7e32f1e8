//! HTTP surface — axum router and serve entrypoint.
//!
//! One route: `POST /api/v0/{*path}`. Path segments address the command,
//! repeated `arg` query pairs carry positional arguments, every other
//! query pair is an option, and the raw request body is passed through to
//! the handler. The response body is the invocation's frame stream.

use crate::command::Command;
use crate::exec::{self, Invocation};
use axum::{
    Router,
    body::{Body, Bytes},
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use compact_str::CompactString;
use futures_util::StreamExt;
use protocol::{ARG_QUERY_KEY, FRAME_CONTENT_TYPE};
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Shared router state.
#[derive(Clone)]
struct AppState {
    root: Arc<Command>,
}

/// Build the axum router serving the command table.
pub fn router(root: Arc<Command>) -> Router {
    Router::new()
        .route("/api/v0/{*path}", post(exec_command))
        .with_state(AppState { root })
}

/// Execute one command invocation and stream its frames back.
async fn exec_command(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
    body: Bytes,
) -> Response {
    let segments: Vec<CompactString> = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(Into::into)
        .collect();

    let mut arguments = Vec::new();
    let mut options = BTreeMap::new();
    for (name, value) in pairs {
        if name == ARG_QUERY_KEY {
            arguments.push(value);
        } else {
            options.insert(CompactString::from(name), value);
        }
    }

    let invocation = Invocation {
        path: segments,
        arguments,
        options,
        body: (!body.is_empty()).then_some(body),
    };
    tracing::debug!("executing command {}", invocation.path.join("/"));

    match exec::dispatch(&state.root, invocation) {
        Ok(execution) => {
            let frames = execution.frames().map(Ok::<_, Infallible>);
            (
                [(header::CONTENT_TYPE, FRAME_CONTENT_TYPE)],
                Body::from_stream(frames),
            )
                .into_response()
        }
        Err(e) => (StatusCode::NOT_FOUND, e.to_string()).into_response(),
    }
}

/// Handle returned by [`serve`] — holds the bound port and shutdown
/// trigger.
pub struct ServeHandle {
    /// The port the server is listening on.
    pub port: u16,
    shutdown_tx: Option<oneshot::Sender<()>>,
    join: Option<tokio::task::JoinHandle<Result<(), std::io::Error>>>,
}

impl ServeHandle {
    /// Trigger graceful shutdown and wait for the server to stop.
    pub async fn shutdown(mut self) -> anyhow::Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(join) = self.join.take() {
            join.await??;
        }
        Ok(())
    }
}

/// Bind `bind` and serve the command table until shut down.
///
/// Returns a [`ServeHandle`] with the bound port (bind to port 0 to get
/// an ephemeral one) and a shutdown trigger. The server runs in a spawned
/// task — call `handle.shutdown()` to stop it.
pub async fn serve(root: Arc<Command>, bind: &str) -> anyhow::Result<ServeHandle> {
    let app = router(root);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    let port = listener.local_addr()?.port();
    tracing::info!("server listening on {bind} (port {port})");

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let join = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                tracing::info!("received shutdown signal");
            })
            .await
    });

    Ok(ServeHandle {
        port,
        shutdown_tx: Some(shutdown_tx),
        join: Some(join),
    })
}
