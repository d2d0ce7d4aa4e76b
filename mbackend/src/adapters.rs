//! Thin adapters that lift concrete model clients into [`ChatBackend`].
//!
//! Two client shapes are covered: synchronous request/response clients
//! ([`BlockingChatClient`]) and push-style streaming clients that report tokens
//! through callbacks ([`CallbackChatClient`]).
//!
//! ```rust
//! use mbackend::{BackendError, BackendRequest, BackendResponse, BlockingBackendAdapter,
//!     BlockingChatClient, ChatBackend};
//!
//! struct Canned;
//!
//! impl BlockingChatClient for Canned {
//!     fn name(&self) -> &str {
//!         "canned"
//!     }
//!
//!     fn call(&self, _request: BackendRequest) -> Result<BackendResponse, BackendError> {
//!         Ok(BackendResponse::text("hi"))
//!     }
//! }
//!
//! let backend = BlockingBackendAdapter::new(Canned);
//! assert_eq!(backend.name(), "canned");
//! ```

use std::sync::Arc;

use async_stream::try_stream;

use crate::{
    BackendError, BackendFuture, BackendRequest, BackendResponse, BoxedEventStream, ChatBackend,
    StreamEvent, StreamHandler, stream_channel,
};

pub trait BlockingChatClient: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn call(&self, request: BackendRequest) -> Result<BackendResponse, BackendError>;
}

/// Runs a blocking client on the tokio blocking pool.
///
/// Streaming is emulated: the full answer is delivered as one partial fragment
/// followed by the completion event.
pub struct BlockingBackendAdapter<C> {
    client: Arc<C>,
}

impl<C> BlockingBackendAdapter<C>
where
    C: BlockingChatClient,
{
    pub fn new(client: C) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

impl<C> ChatBackend for BlockingBackendAdapter<C>
where
    C: BlockingChatClient,
{
    fn name(&self) -> &str {
        self.client.name()
    }

    fn complete<'a>(
        &'a self,
        request: BackendRequest,
    ) -> BackendFuture<'a, Result<BackendResponse, BackendError>> {
        Box::pin(async move {
            request.validate()?;
            let client = Arc::clone(&self.client);
            tokio::task::spawn_blocking(move || client.call(request))
                .await
                .map_err(|err| BackendError::other(format!("blocking backend call failed: {err}")))?
        })
    }

    fn stream<'a>(
        &'a self,
        request: BackendRequest,
    ) -> BackendFuture<'a, Result<BoxedEventStream<'a>, BackendError>> {
        Box::pin(async move {
            request.validate()?;

            let stream = try_stream! {
                let response = self.complete(request).await?;
                if let Some(text) = response.non_empty_text() {
                    yield StreamEvent::Partial(text.to_string());
                }
                yield StreamEvent::Complete(response);
            };

            Ok(Box::pin(stream) as BoxedEventStream<'a>)
        })
    }
}

pub trait CallbackChatClient: Send + Sync {
    fn name(&self) -> &str;

    fn call<'a>(
        &'a self,
        request: BackendRequest,
    ) -> BackendFuture<'a, Result<BackendResponse, BackendError>>;

    /// Starts a streamed answer. The client pushes fragments into `handler` from any
    /// thread and finishes with exactly one `on_complete` or `on_error`.
    fn start_stream(&self, request: BackendRequest, handler: StreamHandler);
}

/// Writes callback events into a channel whose read end is the backend stream.
pub struct CallbackBackendAdapter<C> {
    client: C,
}

impl<C> CallbackBackendAdapter<C>
where
    C: CallbackChatClient,
{
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

impl<C> ChatBackend for CallbackBackendAdapter<C>
where
    C: CallbackChatClient,
{
    fn name(&self) -> &str {
        self.client.name()
    }

    fn complete<'a>(
        &'a self,
        request: BackendRequest,
    ) -> BackendFuture<'a, Result<BackendResponse, BackendError>> {
        Box::pin(async move {
            request.validate()?;
            self.client.call(request).await
        })
    }

    fn stream<'a>(
        &'a self,
        request: BackendRequest,
    ) -> BackendFuture<'a, Result<BoxedEventStream<'a>, BackendError>> {
        Box::pin(async move {
            request.validate()?;
            let (handler, events) = stream_channel();
            self.client.start_stream(request, handler);
            Ok(Box::pin(events) as BoxedEventStream<'a>)
        })
    }
}
