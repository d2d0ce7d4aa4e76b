use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::StreamExt;
use mattach::Attachment;
use mbackend::{
    BackendError, BackendFuture, BackendRequest, BackendResponse, BoxedEventStream, ChatBackend,
    ContentPart, Message, Role, StreamEvent, ToolCall, ToolDefinition, VecEventStream,
};
use mchat::{
    ChatError, ChatErrorKind, ChatOrchestrator, ChatPolicy, ChatRequest, ResponseMode, TurnPhase,
};
use mtooling::{ExecutionContext, SerialExecutionContext, ToolRegistry};

#[derive(Clone)]
struct Reply {
    partials: Vec<String>,
    response: Result<BackendResponse, BackendError>,
    complete: bool,
}

impl Reply {
    fn text(text: &str) -> Self {
        Self {
            partials: Vec::new(),
            response: Ok(BackendResponse::text(text)),
            complete: true,
        }
    }

    fn streamed(partials: &[&str], text: &str) -> Self {
        Self {
            partials: partials.iter().map(ToString::to_string).collect(),
            response: Ok(BackendResponse::text(text)),
            complete: true,
        }
    }

    fn tools(calls: Vec<ToolCall>) -> Self {
        Self {
            partials: Vec::new(),
            response: Ok(BackendResponse::tool_calls(calls)),
            complete: true,
        }
    }

    fn error(error: BackendError) -> Self {
        Self {
            partials: Vec::new(),
            response: Err(error),
            complete: true,
        }
    }
}

type Script = dyn Fn(usize) -> Reply + Send + Sync;

struct ScriptedBackend {
    requests: Mutex<Vec<BackendRequest>>,
    script: Box<Script>,
}

impl ScriptedBackend {
    fn new(script: impl Fn(usize) -> Reply + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            script: Box::new(script),
        })
    }

    fn sequence(replies: Vec<Reply>) -> Arc<Self> {
        Self::new(move |call| {
            replies
                .get(call)
                .cloned()
                .unwrap_or_else(|| Reply::text("out of script"))
        })
    }

    fn record(&self, request: BackendRequest) -> Reply {
        let mut requests = self.requests.lock().expect("requests lock");
        let reply = (self.script)(requests.len());
        requests.push(request);
        reply
    }

    fn requests(&self) -> Vec<BackendRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl ChatBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    fn complete<'a>(
        &'a self,
        request: BackendRequest,
    ) -> BackendFuture<'a, Result<BackendResponse, BackendError>> {
        Box::pin(async move { self.record(request).response })
    }

    fn stream<'a>(
        &'a self,
        request: BackendRequest,
    ) -> BackendFuture<'a, Result<BoxedEventStream<'a>, BackendError>> {
        Box::pin(async move {
            let reply = self.record(request);
            let response = reply.response?;

            let mut events = reply
                .partials
                .into_iter()
                .map(|partial| Ok(StreamEvent::Partial(partial)))
                .collect::<Vec<_>>();
            if reply.complete {
                events.push(Ok(StreamEvent::Complete(response)));
            }

            Ok(Box::pin(VecEventStream::new(events)) as BoxedEventStream<'a>)
        })
    }
}

fn orchestrator(backend: Arc<ScriptedBackend>, mode: ResponseMode) -> ChatOrchestrator {
    ChatOrchestrator::builder(backend)
        .response_mode(mode)
        .build()
        .expect("orchestrator builds")
}

async fn run(chat: &mut ChatOrchestrator, request: ChatRequest) -> Vec<Result<String, ChatError>> {
    chat.send(request)
        .expect("request is valid")
        .collect::<Vec<_>>()
        .await
}

fn fragments(items: Vec<Result<String, ChatError>>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.expect("fragment should be ok"))
        .collect()
}

fn tool_outputs(history: &[Message]) -> Vec<(String, String)> {
    history
        .iter()
        .flat_map(|message| message.parts.iter())
        .filter_map(|part| match part {
            ContentPart::ToolResult(result) => {
                Some((result.tool_call_id.clone(), result.output.clone()))
            }
            _ => None,
        })
        .collect()
}

fn calls(names: &[(&str, &str)]) -> Vec<ToolCall> {
    names
        .iter()
        .map(|(id, name)| ToolCall::new(*id, *name, "{}"))
        .collect()
}

#[tokio::test]
async fn full_response_turn_yields_single_fragment() {
    let backend = ScriptedBackend::sequence(vec![Reply::text("Full response")]);
    let mut chat = orchestrator(backend.clone(), ResponseMode::FullResponse);

    let output = fragments(run(&mut chat, ChatRequest::new("Hello")).await);

    assert_eq!(output, vec!["Full response"]);
    assert_eq!(
        chat.history(),
        vec![Message::user("Hello"), Message::assistant("Full response")]
    );
    assert_eq!(chat.phase(), TurnPhase::Done);
    assert!(!backend.requests()[0].stream);
}

#[tokio::test]
async fn empty_backend_text_yields_empty_stream() {
    for response in [BackendResponse::default(), BackendResponse::text("")] {
        for mode in [ResponseMode::FullResponse, ResponseMode::Streaming] {
            let response = response.clone();
            let backend = ScriptedBackend::new(move |_| Reply {
                partials: Vec::new(),
                response: Ok(response.clone()),
                complete: true,
            });
            let mut chat = orchestrator(backend, mode);

            let output = fragments(run(&mut chat, ChatRequest::new("Hello")).await);

            assert!(output.is_empty());
            assert_eq!(chat.history(), vec![Message::user("Hello")]);
            assert_eq!(chat.phase(), TurnPhase::Done);
        }
    }
}

#[tokio::test]
async fn streaming_forwards_partials_in_order() {
    let backend = ScriptedBackend::sequence(vec![Reply::streamed(
        &["The ", "quick ", "fox"],
        "The quick fox",
    )]);
    let mut chat = orchestrator(backend.clone(), ResponseMode::Streaming);

    let output = fragments(run(&mut chat, ChatRequest::new("Tell me")).await);

    assert_eq!(output, vec!["The ", "quick ", "fox"]);
    assert_eq!(chat.history()[1], Message::assistant("The quick fox"));
    assert!(backend.requests()[0].stream);
}

#[tokio::test]
async fn streaming_without_partials_forwards_completion_once() {
    let backend = ScriptedBackend::sequence(vec![Reply::text("all at once")]);
    let mut chat = orchestrator(backend, ResponseMode::Streaming);

    let output = fragments(run(&mut chat, ChatRequest::new("Hi")).await);

    assert_eq!(output, vec!["all at once"]);
}

#[tokio::test]
async fn streaming_forwards_empty_partials_without_completion_fallback() {
    let backend = ScriptedBackend::sequence(vec![Reply::streamed(&["a", "", "b"], "ab")]);
    let mut chat = orchestrator(backend, ResponseMode::Streaming);

    let output = fragments(run(&mut chat, ChatRequest::new("Spell it")).await);

    assert_eq!(output, vec!["a", "", "b"]);
    assert_eq!(chat.history()[1], Message::assistant("ab"));

    let backend = ScriptedBackend::sequence(vec![Reply::streamed(&[""], "ignored")]);
    let mut chat = orchestrator(backend, ResponseMode::Streaming);

    let output = fragments(run(&mut chat, ChatRequest::new("Quiet")).await);

    assert_eq!(output, vec![""]);
    assert_eq!(chat.history(), vec![Message::user("Quiet")]);
}

#[tokio::test]
async fn endless_tool_requests_fail_after_twenty_backend_calls() {
    let backend = ScriptedBackend::new(|call| {
        Reply::tools(vec![ToolCall::new(format!("call_{call}"), "spin", "{}")])
    });
    let mut chat = orchestrator(backend.clone(), ResponseMode::FullResponse);

    let mut registry = ToolRegistry::new();
    registry.register_blocking_fn(ToolDefinition::new("spin", "Does nothing"), |_| {
        Ok("spun".to_string())
    });

    let output = run(&mut chat, ChatRequest::new("Loop forever").with_tools(registry)).await;

    let error = output
        .last()
        .expect("stream yields an error")
        .clone()
        .expect_err("turn must fail");
    assert_eq!(error.kind, ChatErrorKind::ToolDepthExceeded);
    assert_eq!(error.message, "Maximum tool execution depth exceeded");
    assert_eq!(backend.requests().len(), 20);
    assert_eq!(chat.phase(), TurnPhase::Failed);
}

#[tokio::test]
async fn slow_tool_result_is_a_timeout_error_text() {
    let backend = ScriptedBackend::sequence(vec![
        Reply::tools(calls(&[("call_slow", "slow")])),
        Reply::text("gave up waiting"),
    ]);
    let mut chat = ChatOrchestrator::builder(backend.clone())
        .policy(
            ChatPolicy::default()
                .with_tool_timeout(Duration::from_secs(1))
                .with_response_mode(ResponseMode::FullResponse),
        )
        .build()
        .expect("orchestrator builds");

    let mut registry = ToolRegistry::new();
    registry.register_blocking_fn(ToolDefinition::new("slow", "Sleeps two seconds"), |_| {
        std::thread::sleep(Duration::from_secs(2));
        Ok("SLOW_TOOL_FINISHED".to_string())
    });

    let output = fragments(run(&mut chat, ChatRequest::new("Be slow").with_tools(registry)).await);
    assert_eq!(output, vec!["gave up waiting"]);

    let results = tool_outputs(&chat.history());
    assert_eq!(results.len(), 1);
    assert!(results[0].1.contains("Error executing tool"));
    assert!(!results[0].1.contains("SLOW_TOOL_FINISHED"));
}

#[tokio::test]
async fn unknown_tool_is_reported_back_to_the_backend() {
    let backend = ScriptedBackend::sequence(vec![
        Reply::tools(calls(&[("call_1", "missing")])),
        Reply::text("sorry"),
    ]);
    let mut chat = orchestrator(backend.clone(), ResponseMode::FullResponse);

    let mut registry = ToolRegistry::new();
    registry.register_blocking_fn(ToolDefinition::new("present", "Exists"), |_| {
        Ok("here".to_string())
    });

    let output = fragments(run(&mut chat, ChatRequest::new("Use it").with_tools(registry)).await);
    assert_eq!(output, vec!["sorry"]);

    let second = &backend.requests()[1];
    assert_eq!(
        tool_outputs(&second.messages),
        vec![("call_1".to_string(), "Tool not found: missing".to_string())]
    );
}

#[tokio::test]
async fn tool_results_follow_request_order_and_feed_the_next_call() {
    let backend = ScriptedBackend::sequence(vec![
        Reply::tools(calls(&[("call_a", "slow_echo"), ("call_b", "fast_echo")])),
        Reply::text("both done"),
    ]);
    let mut chat = orchestrator(backend.clone(), ResponseMode::Streaming);

    let mut registry = ToolRegistry::new();
    registry.register_blocking_fn(ToolDefinition::new("slow_echo", "Slow"), |_| {
        std::thread::sleep(Duration::from_millis(200));
        Ok("slow".to_string())
    });
    registry.register_blocking_fn(ToolDefinition::new("fast_echo", "Fast"), |_| {
        Ok("fast".to_string())
    });

    let output = fragments(run(&mut chat, ChatRequest::new("Run both").with_tools(registry)).await);
    assert_eq!(output, vec!["both done"]);

    let history = chat.history();
    let roles = history.iter().map(|message| message.role).collect::<Vec<_>>();
    assert_eq!(
        roles,
        vec![
            Role::User,
            Role::Assistant,
            Role::ToolResult,
            Role::ToolResult,
            Role::Assistant,
        ]
    );
    assert_eq!(
        tool_outputs(&history),
        vec![
            ("call_a".to_string(), "slow".to_string()),
            ("call_b".to_string(), "fast".to_string()),
        ]
    );

    let requests = backend.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].tools.len(), 2);
    assert_eq!(requests[1].messages.len(), 4);
    assert_eq!(requests[1].metadata.get("tool_depth").map(String::as_str), Some("1"));
}

#[tokio::test]
async fn backend_errors_end_the_stream_without_retry() {
    let backend = ScriptedBackend::new(|_| Reply::error(BackendError::transport("connection reset")));

    for mode in [ResponseMode::FullResponse, ResponseMode::Streaming] {
        let mut chat = orchestrator(backend.clone(), mode);
        let output = run(&mut chat, ChatRequest::new("Hello")).await;

        assert_eq!(output.len(), 1);
        let error = output[0].clone().expect_err("backend failure surfaces");
        assert_eq!(error.kind, ChatErrorKind::Backend);
        assert!(error.message.contains("connection reset"));
        assert_eq!(chat.phase(), TurnPhase::Failed);
    }

    assert_eq!(backend.requests().len(), 2);
}

#[tokio::test]
async fn stream_without_completion_is_a_backend_error() {
    let backend = ScriptedBackend::sequence(vec![Reply {
        partials: vec!["partial".to_string()],
        response: Ok(BackendResponse::text("partial")),
        complete: false,
    }]);
    let mut chat = orchestrator(backend, ResponseMode::Streaming);

    let output = run(&mut chat, ChatRequest::new("Hello")).await;

    assert_eq!(output.len(), 2);
    assert_eq!(output[0].clone().expect("partial forwarded"), "partial");
    assert_eq!(
        output[1].clone().expect_err("missing completion").kind,
        ChatErrorKind::Backend
    );
}

#[tokio::test]
async fn invalid_requests_fail_before_any_backend_call() {
    let backend = ScriptedBackend::sequence(vec![Reply::text("unused")]);
    let mut chat = ChatOrchestrator::builder(backend.clone())
        .policy(ChatPolicy::default().with_strict_text_decoding(true))
        .build()
        .expect("orchestrator builds");

    let error = chat.send(ChatRequest::new("   ")).err().expect("blank message");
    assert_eq!(error.kind, ChatErrorKind::InvalidRequest);

    let untyped = Attachment::default().with_data(b"x".to_vec());
    let error = chat
        .send(ChatRequest::new("see file").with_attachment(untyped))
        .err()
        .expect("attachment without content type");
    assert_eq!(error.kind, ChatErrorKind::InvalidRequest);
    assert_eq!(error.message, "Attachment content type must not be null");

    let nameless = Attachment::default()
        .with_content_type("text/plain")
        .with_data(b"x".to_vec());
    let error = chat
        .send(ChatRequest::new("see file").with_attachment(nameless))
        .err()
        .expect("attachment without file name");
    assert_eq!(error.kind, ChatErrorKind::InvalidRequest);
    assert_eq!(error.message, "Attachment file name must not be null");

    let broken = Attachment::new(vec![0xFF, 0xFE], "text/plain", "broken.txt");
    let error = chat
        .send(ChatRequest::new("see file").with_attachment(broken))
        .err()
        .expect("strict decoding failure");
    assert_eq!(error.kind, ChatErrorKind::Encoding);

    let mut registry = ToolRegistry::new();
    registry.register_blocking_fn(ToolDefinition::new("nameless", ""), |_| Ok(String::new()));
    let error = chat
        .send(ChatRequest::new("use tools").with_tools(registry))
        .err()
        .expect("tool without description");
    assert_eq!(error.kind, ChatErrorKind::InvalidRequest);

    assert!(backend.requests().is_empty());
    assert!(chat.history().is_empty());
}

#[tokio::test]
async fn turn_does_nothing_until_polled() {
    let backend = ScriptedBackend::sequence(vec![Reply::text("later")]);
    let mut chat = orchestrator(backend.clone(), ResponseMode::Streaming);

    let stream = chat.send(ChatRequest::new("Hello")).expect("valid request");
    drop(stream);

    assert!(backend.requests().is_empty());
    assert!(chat.history().is_empty());
}

#[tokio::test]
async fn system_prompt_is_sent_first_but_not_remembered() {
    let backend = ScriptedBackend::sequence(vec![Reply::text("one"), Reply::text("two")]);
    let mut chat = orchestrator(backend.clone(), ResponseMode::FullResponse);

    run(
        &mut chat,
        ChatRequest::new("  first  ").with_system_prompt("Be terse."),
    )
    .await;
    run(&mut chat, ChatRequest::new("second").with_system_prompt("   ")).await;

    let requests = backend.requests();
    assert_eq!(requests[0].messages[0], Message::system("Be terse."));
    assert_eq!(requests[0].messages[1], Message::user("first"));
    assert!(
        requests[1]
            .messages
            .iter()
            .all(|message| message.role != Role::System)
    );
    assert!(
        chat.history()
            .iter()
            .all(|message| message.role != Role::System)
    );
}

#[tokio::test]
async fn attachments_are_encoded_into_the_user_message() {
    let backend = ScriptedBackend::sequence(vec![Reply::text("seen")]);
    let mut chat = orchestrator(backend.clone(), ResponseMode::FullResponse);

    let request = ChatRequest::new("Review these")
        .with_attachment(Attachment::new(b"Hello World".to_vec(), "text/plain", "doc.txt"))
        .with_attachment(Attachment::new(vec![1, 2, 3], "image/png", "pic.png"))
        .with_attachment(Attachment::new(b"%PDF".to_vec(), "application/pdf", "report.pdf"))
        .with_attachment(Attachment::new(vec![0x50, 0x4b], "application/zip", "a.zip"));
    run(&mut chat, request).await;

    let user = &backend.requests()[0].messages[0];
    assert_eq!(user.role, Role::User);
    assert_eq!(
        user.text_content(),
        "Review these\n<attachment filename=\"doc.txt\">\nHello World\n</attachment>\n"
    );

    assert_eq!(user.parts.len(), 3);
    match &user.parts[1] {
        ContentPart::Image(media) => {
            assert_eq!(media.file_name, "pic.png");
            assert_eq!(media.data_url, "data:image/png;base64,AQID");
        }
        other => panic!("expected image part, got {other:?}"),
    }
    match &user.parts[2] {
        ContentPart::File(media) => assert_eq!(media.content_type, "application/pdf"),
        other => panic!("expected file part, got {other:?}"),
    }
}

#[tokio::test]
async fn tools_run_inside_the_requested_execution_context() {
    let backend = ScriptedBackend::sequence(vec![
        Reply::tools(calls(&[("call_1", "where_am_i")])),
        Reply::text("done"),
    ]);
    let mut chat = orchestrator(backend, ResponseMode::FullResponse);
    let context: Arc<dyn ExecutionContext> =
        Arc::new(SerialExecutionContext::new("chat-ui").expect("context starts"));

    let mut registry = ToolRegistry::new();
    registry.register_blocking_fn(ToolDefinition::new("where_am_i", "Reports thread"), |_| {
        Ok(std::thread::current()
            .name()
            .unwrap_or("unnamed")
            .to_string())
    });

    run(
        &mut chat,
        ChatRequest::new("Where?")
            .with_tools(registry)
            .with_execution_context(context),
    )
    .await;

    assert_eq!(
        tool_outputs(&chat.history()),
        vec![("call_1".to_string(), "chat-ui".to_string())]
    );
}

#[tokio::test]
async fn depth_resets_between_turns() {
    let backend = ScriptedBackend::sequence(vec![
        Reply::tools(calls(&[("call_1", "noop")])),
        Reply::text("first done"),
        Reply::text("second done"),
    ]);
    let mut chat = orchestrator(backend.clone(), ResponseMode::FullResponse);

    let mut registry = ToolRegistry::new();
    registry.register_blocking_fn(ToolDefinition::new("noop", "Does nothing"), |_| {
        Ok(String::new())
    });
    let registry: Arc<dyn mtooling::ToolSource> = Arc::new(registry);

    run(
        &mut chat,
        ChatRequest::new("one").with_tool_source(registry.clone()),
    )
    .await;
    run(&mut chat, ChatRequest::new("two").with_tool_source(registry)).await;

    let depths = backend
        .requests()
        .iter()
        .map(|request| request.metadata.get("tool_depth").cloned())
        .collect::<Vec<_>>();
    assert_eq!(
        depths,
        vec![
            Some("0".to_string()),
            Some("1".to_string()),
            Some("0".to_string())
        ]
    );
}
