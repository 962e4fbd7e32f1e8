//! Result stream decoding.
//!
//! A [`Response`] is the single iteration cursor over one HTTP response
//! body. Each `next` call decodes exactly one frame: a value, the in-band
//! error, or exhaustion. Whatever terminal the stream reaches — clean
//! exhaustion, in-band error, decode fault, or transport fault — every call
//! after it returns exhaustion without touching the network again.

use crate::error::{DecodeError, RemoteError, ResponseError};
use bytes::{Bytes, BytesMut};
use futures_core::Stream;
use futures_util::StreamExt;
use protocol::{Frame, codec, unbox};
use serde::de::DeserializeOwned;
use std::pin::Pin;

type Body = Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>;

enum State {
    Open,
    Done,
}

/// Lazy cursor over the values of one command invocation.
///
/// Owned exclusively by the caller that issued the request; no concurrent
/// readers. Dropping it (or calling [`Response::close`]) releases the
/// underlying connection.
pub struct Response {
    body: Body,
    buf: BytesMut,
    state: State,
}

impl std::fmt::Debug for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Response")
            .field("buf_len", &self.buf.len())
            .field(
                "state",
                &match self.state {
                    State::Open => "Open",
                    State::Done => "Done",
                },
            )
            .finish_non_exhaustive()
    }
}

impl Response {
    /// Wrap a raw byte stream.
    ///
    /// `Client::send` does this for live HTTP bodies; it is public for
    /// tests and alternative transports.
    pub fn from_body<S>(body: S) -> Self
    where
        S: Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
    {
        Self {
            body: Box::pin(body),
            buf: BytesMut::new(),
            state: State::Open,
        }
    }

    /// Decode the next value of the stream.
    ///
    /// Returns `Ok(Some(value))` for each value in server emission order,
    /// then `Ok(None)` at exhaustion — idempotently, any number of times.
    /// An in-band command error surfaces once as
    /// [`ResponseError::Remote`]; the stream is exhausted afterwards.
    /// Decode and transport faults are likewise terminal.
    pub async fn next<T: DeserializeOwned>(&mut self) -> Result<Option<T>, ResponseError> {
        if matches!(self.state, State::Done) {
            return Ok(None);
        }
        loop {
            match codec::decode_frame(&mut self.buf) {
                Ok(Some(Frame::Value { payload })) => {
                    let payload = unbox(payload);
                    return match serde_json::from_value(payload) {
                        Ok(value) => Ok(Some(value)),
                        Err(e) => {
                            self.state = State::Done;
                            Err(ResponseError::Decode(DecodeError::Payload(e)))
                        }
                    };
                }
                Ok(Some(Frame::Error { message })) => {
                    self.state = State::Done;
                    return Err(ResponseError::Remote(RemoteError::new(message)));
                }
                Ok(None) => {}
                Err(e) => {
                    self.state = State::Done;
                    return Err(ResponseError::Decode(DecodeError::Frame(e)));
                }
            }

            // Not enough buffered for a frame; pull the next body chunk.
            match self.body.next().await {
                Some(Ok(chunk)) => self.buf.extend_from_slice(&chunk),
                Some(Err(e)) => {
                    self.state = State::Done;
                    return Err(ResponseError::Transport(e));
                }
                None => {
                    self.state = State::Done;
                    if self.buf.is_empty() {
                        return Ok(None);
                    }
                    return Err(ResponseError::Decode(DecodeError::Truncated {
                        remaining: self.buf.len(),
                    }));
                }
            }
        }
    }

    /// Abandon the stream and release the connection.
    ///
    /// Equivalent to dropping the response. The server is not guaranteed
    /// to observe the disconnect synchronously and may run the command to
    /// completion.
    pub fn close(self) {
        drop(self);
    }
}
