//! Streaming event contracts, in-memory streams, and the push-to-pull channel.
//!
//! ```rust
//! use mbackend::{BoxedEventStream, StreamEvent, VecEventStream};
//!
//! let stream = VecEventStream::new(vec![Ok(StreamEvent::Partial("hello".into()))]);
//! let _boxed: BoxedEventStream<'static> = Box::pin(stream);
//! ```

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::{BackendError, BackendResponse};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Partial(String),
    Complete(BackendResponse),
}

/// Backend stream contract.
///
/// Invariants for consumers:
/// - Events are emitted in source order.
/// - `Partial` may appear zero or more times.
/// - Exactly one `Complete` follows the partials; nothing is emitted after it.
/// - An `Err` item is terminal.
pub trait BackendEventStream: Stream<Item = Result<StreamEvent, BackendError>> + Send {}

impl<T> BackendEventStream for T where T: Stream<Item = Result<StreamEvent, BackendError>> + Send {}

pub type BoxedEventStream<'a> = Pin<Box<dyn BackendEventStream + 'a>>;

#[derive(Debug)]
pub struct VecEventStream {
    events: VecDeque<Result<StreamEvent, BackendError>>,
}

impl VecEventStream {
    pub fn new(events: Vec<Result<StreamEvent, BackendError>>) -> Self {
        Self {
            events: events.into(),
        }
    }
}

impl Stream for VecEventStream {
    type Item = Result<StreamEvent, BackendError>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<StreamEvent, BackendError>>> {
        Poll::Ready(self.events.pop_front())
    }
}

/// Write end handed to push-style clients.
///
/// `on_complete` and `on_error` consume the handler, so nothing can be pushed after a
/// terminal event. Dropping the handler without either ends the stream, which the
/// consumer sees as a missing completion.
#[derive(Debug, Clone)]
pub struct StreamHandler {
    sender: UnboundedSender<Result<StreamEvent, BackendError>>,
}

impl StreamHandler {
    /// Returns `false` once the consuming side has gone away.
    pub fn on_partial(&self, text: impl Into<String>) -> bool {
        self.sender
            .send(Ok(StreamEvent::Partial(text.into())))
            .is_ok()
    }

    pub fn on_complete(self, response: BackendResponse) {
        let _ = self.sender.send(Ok(StreamEvent::Complete(response)));
    }

    pub fn on_error(self, error: BackendError) {
        let _ = self.sender.send(Err(error));
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Read end of [`stream_channel`].
#[derive(Debug)]
pub struct ChannelEventStream {
    receiver: UnboundedReceiver<Result<StreamEvent, BackendError>>,
    finished: bool,
}

impl Stream for ChannelEventStream {
    type Item = Result<StreamEvent, BackendError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }

        match self.receiver.poll_recv(cx) {
            Poll::Ready(Some(item)) => {
                if matches!(item, Ok(StreamEvent::Complete(_)) | Err(_)) {
                    self.finished = true;
                    self.receiver.close();
                }
                Poll::Ready(Some(item))
            }
            Poll::Ready(None) => {
                self.finished = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Bridges callback-driven token delivery into an ordered pull stream.
pub fn stream_channel() -> (StreamHandler, ChannelEventStream) {
    let (sender, receiver) = unbounded_channel();
    (
        StreamHandler { sender },
        ChannelEventStream {
            receiver,
            finished: false,
        },
    )
}
