//! Manta server — hierarchical command table, streaming executor, and the
//! HTTP surface that exposes them.
//!
//! Commands are async handlers arranged in a [`Command`] tree. An incoming
//! request is decoded into an [`exec::Invocation`], dispatched, and its
//! emitted values are framed onto the response body in emission order; a
//! handler error becomes the single trailing error frame. Each invocation
//! carries a [`Completion`] signaled only once the handler *and* any
//! background work it registered have finished — deliberately decoupled
//! from the response body closing.

pub use command::{Command, Handler};
pub use completion::{Completion, CompletionHandle};
pub use config::ServerConfig;
pub use exec::{Context, DispatchError, Execution, Invocation, dispatch};
pub use http::{ServeHandle, router, serve};

pub mod command;
pub mod commands;
pub mod completion;
pub mod config;
pub mod exec;
pub mod http;
