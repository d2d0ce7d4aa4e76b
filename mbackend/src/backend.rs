use mcommon::BoxFuture;

use crate::{BackendError, BackendRequest, BackendResponse, BoxedEventStream};

pub type BackendFuture<'a, T> = BoxFuture<'a, T>;

/// A language-model service the orchestrator converses with.
///
/// `complete` answers in one piece; `stream` yields partial text fragments followed
/// by a single completion event carrying the structured response.
pub trait ChatBackend: Send + Sync {
    fn name(&self) -> &str;

    fn complete<'a>(
        &'a self,
        request: BackendRequest,
    ) -> BackendFuture<'a, Result<BackendResponse, BackendError>>;

    fn stream<'a>(
        &'a self,
        request: BackendRequest,
    ) -> BackendFuture<'a, Result<BoxedEventStream<'a>, BackendError>>;
}
