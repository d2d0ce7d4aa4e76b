//! Turn orchestration: request assembly, the tool-call loop, and answer streaming.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use futures_util::StreamExt;
//! use mbackend::{
//!     BackendError, BackendFuture, BackendRequest, BackendResponse, BoxedEventStream,
//!     ChatBackend, StreamEvent, VecEventStream,
//! };
//! use mchat::{ChatOrchestrator, ChatRequest};
//!
//! struct Canned;
//!
//! impl ChatBackend for Canned {
//!     fn name(&self) -> &str {
//!         "canned"
//!     }
//!
//!     fn complete<'a>(
//!         &'a self,
//!         _request: BackendRequest,
//!     ) -> BackendFuture<'a, Result<BackendResponse, BackendError>> {
//!         Box::pin(async { Ok(BackendResponse::text("Hi there")) })
//!     }
//!
//!     fn stream<'a>(
//!         &'a self,
//!         _request: BackendRequest,
//!     ) -> BackendFuture<'a, Result<BoxedEventStream<'a>, BackendError>> {
//!         Box::pin(async {
//!             let events = VecEventStream::new(vec![
//!                 Ok(StreamEvent::Partial("Hi".to_string())),
//!                 Ok(StreamEvent::Partial(" there".to_string())),
//!                 Ok(StreamEvent::Complete(BackendResponse::text("Hi there"))),
//!             ]);
//!             Ok(Box::pin(events) as BoxedEventStream<'a>)
//!         })
//!     }
//! }
//!
//! let runtime = tokio::runtime::Runtime::new().expect("runtime");
//! runtime.block_on(async {
//!     let mut chat = ChatOrchestrator::builder(Arc::new(Canned))
//!         .build()
//!         .expect("default policy is valid");
//!
//!     let fragments = chat
//!         .send(ChatRequest::new("Hello"))
//!         .expect("request is valid")
//!         .map(|fragment| fragment.expect("turn succeeds"))
//!         .collect::<Vec<_>>()
//!         .await;
//!
//!     assert_eq!(fragments, vec!["Hi", " there"]);
//! });
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_stream::try_stream;
use futures_util::StreamExt;
use mattach::{AttachmentCategory, EncodedAttachment, encode_attachment};
use mbackend::{
    BackendRequest, BackendResponse, ChatBackend, ContentPart, MediaReference, Message, Role,
    StreamEvent, ToolCall, ToolDefinition, ToolResult,
};
use mcommon::SessionId;
use mmemory::{ConversationMemory, WindowedConversationMemory};
use mtooling::{ExecutionContext, ToolExecutionHooks, ToolExecutor, ToolTable};

use crate::{
    ChatError, ChatHooks, ChatPolicy, ChatRequest, ChatStream, NoopChatHooks, ResponseMode,
    TurnPhase,
};

pub const TOOL_NOT_FOUND_PREFIX: &str = "Tool not found: ";

/// Drives the turns of one conversation against one backend.
///
/// The orchestrator exclusively owns its memory; [`send`](Self::send) borrows it
/// mutably for as long as the returned stream lives, so turns cannot overlap.
pub struct ChatOrchestrator {
    backend: Arc<dyn ChatBackend>,
    memory: Box<dyn ConversationMemory>,
    executor: ToolExecutor,
    policy: ChatPolicy,
    session_id: SessionId,
    hooks: Arc<dyn ChatHooks>,
    execution_context: Option<Arc<dyn ExecutionContext>>,
    phase: TurnPhase,
}

pub struct ChatOrchestratorBuilder {
    backend: Arc<dyn ChatBackend>,
    memory: Option<Box<dyn ConversationMemory>>,
    policy: ChatPolicy,
    session_id: SessionId,
    hooks: Arc<dyn ChatHooks>,
    tool_hooks: Option<Arc<dyn ToolExecutionHooks>>,
    execution_context: Option<Arc<dyn ExecutionContext>>,
}

impl ChatOrchestratorBuilder {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            backend,
            memory: None,
            policy: ChatPolicy::default(),
            session_id: SessionId::default(),
            hooks: Arc::new(NoopChatHooks),
            tool_hooks: None,
            execution_context: None,
        }
    }

    pub fn session_id(mut self, session_id: impl Into<SessionId>) -> Self {
        self.session_id = session_id.into();
        self
    }

    pub fn policy(mut self, policy: ChatPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn tool_timeout(mut self, tool_timeout: Duration) -> Self {
        self.policy.tool_timeout = tool_timeout;
        self
    }

    pub fn response_mode(mut self, response_mode: ResponseMode) -> Self {
        self.policy.response_mode = response_mode;
        self
    }

    /// Replaces the windowed memory sized by `policy.memory_capacity`.
    pub fn memory(mut self, memory: Box<dyn ConversationMemory>) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn hooks(mut self, hooks: Arc<dyn ChatHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn tool_hooks(mut self, hooks: Arc<dyn ToolExecutionHooks>) -> Self {
        self.tool_hooks = Some(hooks);
        self
    }

    /// Context used for tool calls whose request does not name one.
    pub fn execution_context(mut self, context: Arc<dyn ExecutionContext>) -> Self {
        self.execution_context = Some(context);
        self
    }

    pub fn build(self) -> Result<ChatOrchestrator, ChatError> {
        self.policy.validate()?;

        let memory = match self.memory {
            Some(memory) => memory,
            None => Box::new(WindowedConversationMemory::new(self.policy.memory_capacity)?),
        };

        let executor = match self.tool_hooks {
            Some(hooks) => ToolExecutor::new().with_hooks(hooks),
            None => ToolExecutor::new(),
        };

        Ok(ChatOrchestrator {
            backend: self.backend,
            memory,
            executor,
            policy: self.policy,
            session_id: self.session_id,
            hooks: self.hooks,
            execution_context: self.execution_context,
            phase: TurnPhase::Idle,
        })
    }
}

/// Everything a turn needs, resolved before the first backend call.
struct PreparedTurn {
    system_message: Option<Message>,
    user_message: Message,
    tools: ToolTable,
    definitions: Vec<ToolDefinition>,
    execution_context: Option<Arc<dyn ExecutionContext>>,
}

impl ChatOrchestrator {
    pub fn builder(backend: Arc<dyn ChatBackend>) -> ChatOrchestratorBuilder {
        ChatOrchestratorBuilder::new(backend)
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn policy(&self) -> &ChatPolicy {
        &self.policy
    }

    /// Phase reached by the most recent turn.
    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn history(&self) -> Vec<Message> {
        self.memory.snapshot()
    }

    pub fn restore_history(&mut self, history: Vec<Message>) {
        self.memory.restore(history);
    }

    pub fn clear_history(&mut self) {
        self.memory.clear();
    }

    /// Starts a turn.
    ///
    /// Validation and attachment encoding happen here; nothing is sent and memory is
    /// untouched until the returned stream is first polled.
    pub fn send(&mut self, request: ChatRequest) -> Result<ChatStream<'_>, ChatError> {
        let started = Instant::now();
        self.hooks.on_turn_start(
            &self.session_id,
            request.attachments.len(),
            request.tools.len(),
        );
        self.transition(TurnPhase::Idle);

        match self.prepare(request) {
            Ok(turn) => Ok(self.run_turn(turn, started)),
            Err(error) => Err(self.fail(error, started)),
        }
    }

    fn prepare(&self, request: ChatRequest) -> Result<PreparedTurn, ChatError> {
        let text = request.user_message.trim();
        if text.is_empty() {
            return Err(ChatError::invalid_request("user message must not be blank"));
        }

        let mut text = text.to_string();
        let mut media_parts = Vec::new();
        for attachment in &request.attachments {
            match encode_attachment(attachment, self.policy.strict_text_decoding)? {
                EncodedAttachment::InlineText(formatted) => text.push_str(&formatted),
                EncodedAttachment::Media {
                    category,
                    content_type,
                    file_name,
                    data_url,
                } => {
                    let media = MediaReference::new(content_type, file_name, data_url);
                    media_parts.push(match category {
                        AttachmentCategory::Image => ContentPart::Image(media),
                        _ => ContentPart::File(media),
                    });
                }
                EncodedAttachment::Dropped {
                    file_name,
                    content_type,
                } => {
                    tracing::debug!(
                        session_id = %self.session_id,
                        file_name = %file_name,
                        content_type = %content_type,
                        "dropping unsupported attachment"
                    );
                }
            }
        }

        let mut parts = vec![ContentPart::text(text)];
        parts.extend(media_parts);

        let tools = ToolTable::build(&request.tools)?;
        let definitions = tools.definitions();

        let system_message = request
            .system_prompt
            .as_deref()
            .map(str::trim)
            .filter(|prompt| !prompt.is_empty())
            .map(Message::system);

        Ok(PreparedTurn {
            system_message,
            user_message: Message::new(Role::User, parts),
            tools,
            definitions,
            execution_context: request
                .execution_context
                .or_else(|| self.execution_context.clone()),
        })
    }

    fn run_turn(&mut self, turn: PreparedTurn, started: Instant) -> ChatStream<'_> {
        Box::pin(try_stream! {
            let backend = Arc::clone(&self.backend);
            let streaming = self.policy.response_mode == ResponseMode::Streaming;
            let PreparedTurn {
                system_message,
                user_message,
                tools,
                definitions,
                execution_context,
            } = turn;

            self.memory.append(user_message);
            let mut depth = 0_usize;

            loop {
                self.transition(TurnPhase::Sending);
                let request = self
                    .backend_request(system_message.as_ref(), &definitions, depth, streaming)
                    .map_err(|error| self.fail(error, started))?;
                self.hooks
                    .on_backend_call(&self.session_id, backend.name(), depth, streaming);

                let mut answer = String::new();
                let response = if streaming {
                    self.transition(TurnPhase::Streaming);
                    let mut events = backend
                        .stream(request)
                        .await
                        .map_err(|error| self.fail(error.into(), started))?;

                    let mut completion = None;
                    let mut partials = 0_usize;
                    while let Some(event) = events.next().await {
                        match event.map_err(|error| self.fail(error.into(), started))? {
                            StreamEvent::Partial(fragment) => {
                                partials += 1;
                                answer.push_str(&fragment);
                                yield fragment;
                            }
                            StreamEvent::Complete(response) => {
                                completion = Some(response);
                                break;
                            }
                        }
                    }

                    let response = completion.ok_or_else(|| {
                        self.fail(
                            ChatError::backend("stream ended without a completion event"),
                            started,
                        )
                    })?;

                    if partials == 0 {
                        if let Some(text) = response.non_empty_text() {
                            answer = text.to_string();
                            yield answer.clone();
                        }
                    }
                    response
                } else {
                    self.transition(TurnPhase::AwaitingFullResponse);
                    let response = backend
                        .complete(request)
                        .await
                        .map_err(|error| self.fail(error.into(), started))?;

                    if let Some(text) = response.non_empty_text() {
                        answer = text.to_string();
                        yield answer.clone();
                    }
                    response
                };

                if !response.has_tool_calls() {
                    if !answer.is_empty() {
                        self.memory.append(Message::assistant(answer));
                    }
                    self.transition(TurnPhase::Done);
                    self.hooks
                        .on_turn_complete(&self.session_id, depth + 1, started.elapsed());
                    break;
                }

                self.transition(TurnPhase::ToolCallsPending);
                let BackendResponse { tool_calls, .. } = response;
                self.memory.append(assistant_tool_message(answer, &tool_calls));

                self.transition(TurnPhase::ExecutingTools);
                let mut results = Vec::with_capacity(tool_calls.len());
                for call in &tool_calls {
                    let output = match tools.get(&call.name) {
                        Some(descriptor) => {
                            self.executor
                                .execute(
                                    descriptor,
                                    &call.arguments,
                                    execution_context.as_ref(),
                                    self.policy.tool_timeout,
                                )
                                .await
                        }
                        None => {
                            tracing::warn!(
                                session_id = %self.session_id,
                                tool = %call.name,
                                "backend requested an unknown tool"
                            );
                            format!("{TOOL_NOT_FOUND_PREFIX}{}", call.name)
                        }
                    };
                    results.push(ToolResult::for_call(call, output));
                }

                for result in results {
                    self.memory.append(Message::tool_result(result));
                }

                depth += 1;
                if depth >= self.policy.max_tool_depth {
                    Err(self.fail(ChatError::tool_depth_exceeded(), started))?;
                }
            }
        })
    }

    fn backend_request(
        &self,
        system_message: Option<&Message>,
        definitions: &[ToolDefinition],
        depth: usize,
        streaming: bool,
    ) -> Result<BackendRequest, ChatError> {
        let mut messages = Vec::with_capacity(self.memory.len() + 1);
        messages.extend(system_message.cloned());
        messages.extend(self.memory.snapshot());

        let request = BackendRequest::builder()
            .messages(messages)
            .tools(definitions.to_vec())
            .metadata("session_id", self.session_id.as_str())
            .metadata("tool_depth", depth.to_string())
            .streaming(streaming)
            .build()?;

        Ok(request)
    }

    fn transition(&mut self, to: TurnPhase) {
        let from = self.phase;
        self.phase = to;
        if from != to {
            self.hooks.on_phase_transition(&self.session_id, from, to);
        }
    }

    fn fail(&mut self, error: ChatError, started: Instant) -> ChatError {
        self.transition(TurnPhase::Failed);
        tracing::debug!(session_id = %self.session_id, error = %error, "chat turn failed");
        self.hooks
            .on_turn_failure(&self.session_id, &error, started.elapsed());
        error
    }
}

fn assistant_tool_message(text: String, tool_calls: &[ToolCall]) -> Message {
    let mut parts = Vec::with_capacity(tool_calls.len() + 1);
    if !text.is_empty() {
        parts.push(ContentPart::text(text));
    }
    parts.extend(tool_calls.iter().cloned().map(ContentPart::ToolCall));
    Message::new(Role::Assistant, parts)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use mbackend::{BackendError, BackendFuture, BoxedEventStream, VecEventStream};
    use mtooling::ToolRegistry;

    use super::*;
    use crate::ChatErrorKind;

    /// Asks for `lookup` once, then answers.
    struct OneToolBackend {
        calls: AtomicUsize,
    }

    impl OneToolBackend {
        fn respond(&self) -> BackendResponse {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                BackendResponse::tool_calls(vec![ToolCall::new("call_1", "lookup", "")])
            } else {
                BackendResponse::text("answer")
            }
        }
    }

    impl ChatBackend for OneToolBackend {
        fn name(&self) -> &str {
            "one-tool"
        }

        fn complete<'a>(
            &'a self,
            _request: BackendRequest,
        ) -> BackendFuture<'a, Result<BackendResponse, mbackend::BackendError>> {
            Box::pin(async move { Ok(self.respond()) })
        }

        fn stream<'a>(
            &'a self,
            _request: BackendRequest,
        ) -> BackendFuture<'a, Result<BoxedEventStream<'a>, BackendError>> {
            Box::pin(async move {
                let events = VecEventStream::new(vec![Ok(StreamEvent::Complete(self.respond()))]);
                Ok(Box::pin(events) as BoxedEventStream<'a>)
            })
        }
    }

    #[derive(Default)]
    struct RecordingHooks {
        events: Mutex<Vec<String>>,
    }

    impl RecordingHooks {
        fn push(&self, event: String) {
            self.events.lock().expect("events lock").push(event);
        }

        fn events(&self) -> Vec<String> {
            self.events.lock().expect("events lock").clone()
        }
    }

    impl ChatHooks for RecordingHooks {
        fn on_turn_start(&self, session_id: &SessionId, attachments: usize, tool_sources: usize) {
            self.push(format!("start:{session_id}:{attachments}:{tool_sources}"));
        }

        fn on_phase_transition(&self, _session_id: &SessionId, _from: TurnPhase, to: TurnPhase) {
            self.push(format!("{to:?}"));
        }

        fn on_backend_call(
            &self,
            _session_id: &SessionId,
            backend: &str,
            depth: usize,
            _streaming: bool,
        ) {
            self.push(format!("call:{backend}:{depth}"));
        }

        fn on_turn_complete(&self, _session_id: &SessionId, backend_calls: usize, _elapsed: Duration) {
            self.push(format!("complete:{backend_calls}"));
        }

        fn on_turn_failure(&self, _session_id: &SessionId, error: &ChatError, _elapsed: Duration) {
            self.push(format!("failure:{:?}", error.kind));
        }
    }

    fn lookup_registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register_blocking_fn(ToolDefinition::new("lookup", "Looks things up"), |args| {
            Ok(format!("looked up {args}"))
        });
        registry
    }

    #[tokio::test]
    async fn hooks_follow_the_turn_phases() {
        let hooks = Arc::new(RecordingHooks::default());
        let mut chat = ChatOrchestrator::builder(Arc::new(OneToolBackend {
            calls: AtomicUsize::new(0),
        }))
        .session_id("s-phases")
        .hooks(hooks.clone())
        .build()
        .expect("orchestrator builds");

        let fragments = chat
            .send(ChatRequest::new("look it up").with_tools(lookup_registry()))
            .expect("valid request")
            .collect::<Vec<_>>()
            .await;
        assert_eq!(fragments.len(), 1);

        assert_eq!(
            hooks.events(),
            vec![
                "start:s-phases:0:1",
                "Sending",
                "call:one-tool:0",
                "Streaming",
                "ToolCallsPending",
                "ExecutingTools",
                "Sending",
                "call:one-tool:1",
                "Streaming",
                "Done",
                "complete:2",
            ]
        );
        assert_eq!(chat.phase(), TurnPhase::Done);
    }

    #[tokio::test]
    async fn blank_tool_arguments_reach_the_tool_as_empty_object() {
        let mut chat = ChatOrchestrator::builder(Arc::new(OneToolBackend {
            calls: AtomicUsize::new(0),
        }))
        .response_mode(ResponseMode::FullResponse)
        .build()
        .expect("orchestrator builds");

        let _ = chat
            .send(ChatRequest::new("look it up").with_tools(lookup_registry()))
            .expect("valid request")
            .collect::<Vec<_>>()
            .await;

        let history = chat.history();
        let result = history
            .iter()
            .flat_map(|message| message.parts.iter())
            .find_map(|part| match part {
                ContentPart::ToolResult(result) => Some(result.clone()),
                _ => None,
            })
            .expect("tool result recorded");
        assert_eq!(result.output, "looked up {}");
        assert_eq!(result.tool_name, "lookup");
    }

    #[tokio::test]
    async fn eager_failures_are_reported_to_hooks() {
        let hooks = Arc::new(RecordingHooks::default());
        let mut chat = ChatOrchestrator::builder(Arc::new(OneToolBackend {
            calls: AtomicUsize::new(0),
        }))
        .hooks(hooks.clone())
        .build()
        .expect("orchestrator builds");

        let error = chat.send(ChatRequest::new("")).err().expect("blank message");

        assert_eq!(error.kind, ChatErrorKind::InvalidRequest);
        assert_eq!(chat.phase(), TurnPhase::Failed);
        assert_eq!(
            hooks.events(),
            vec!["start:default:0:0", "Failed", "failure:InvalidRequest"]
        );
    }

    #[test]
    fn builder_rejects_invalid_policy() {
        let error = ChatOrchestrator::builder(Arc::new(OneToolBackend {
            calls: AtomicUsize::new(0),
        }))
        .policy(ChatPolicy::default().with_max_tool_depth(0))
        .build()
        .err()
        .expect("zero depth is invalid");

        assert_eq!(error.kind, ChatErrorKind::InvalidRequest);
    }

    #[test]
    fn memory_restore_and_clear_are_exposed() {
        let mut chat = ChatOrchestrator::builder(Arc::new(OneToolBackend {
            calls: AtomicUsize::new(0),
        }))
        .build()
        .expect("orchestrator builds");

        chat.restore_history(vec![Message::user("earlier"), Message::assistant("reply")]);
        assert_eq!(chat.history().len(), 2);

        chat.clear_history();
        assert!(chat.history().is_empty());
    }
}
