//! Turn request, response mode, phase, and output stream types.

use std::fmt::{Debug, Formatter};
use std::pin::Pin;
use std::sync::Arc;

use futures_core::Stream;
use mattach::Attachment;
use mtooling::{ExecutionContext, Tool, ToolSource};

use crate::ChatError;

/// Lazy sequence of answer fragments produced by one turn.
pub type ChatStream<'a> = Pin<Box<dyn Stream<Item = Result<String, ChatError>> + Send + 'a>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseMode {
    /// Forward partial fragments as the backend produces them.
    #[default]
    Streaming,
    /// Wait for the complete answer and forward it once.
    FullResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TurnPhase {
    #[default]
    Idle,
    Sending,
    Streaming,
    AwaitingFullResponse,
    ToolCallsPending,
    ExecutingTools,
    Done,
    Failed,
}

impl TurnPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// One user turn. Built by the caller and consumed by
/// [`ChatOrchestrator::send`](crate::ChatOrchestrator::send).
#[derive(Clone, Default)]
pub struct ChatRequest {
    pub user_message: String,
    pub system_prompt: Option<String>,
    pub attachments: Vec<Attachment>,
    pub tools: Vec<Arc<dyn ToolSource>>,
    pub execution_context: Option<Arc<dyn ExecutionContext>>,
}

impl ChatRequest {
    pub fn new(user_message: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            ..Self::default()
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn with_attachments(mut self, attachments: impl IntoIterator<Item = Attachment>) -> Self {
        self.attachments.extend(attachments);
        self
    }

    pub fn with_tools<S>(mut self, source: S) -> Self
    where
        S: ToolSource + 'static,
    {
        self.tools.push(Arc::new(source));
        self
    }

    pub fn with_tool_source(mut self, source: Arc<dyn ToolSource>) -> Self {
        self.tools.push(source);
        self
    }

    pub fn with_tool<T>(self, tool: T) -> Self
    where
        T: Tool + 'static,
    {
        let tool: Arc<dyn Tool> = Arc::new(tool);
        self.with_tools(tool)
    }

    pub fn with_execution_context(mut self, context: Arc<dyn ExecutionContext>) -> Self {
        self.execution_context = Some(context);
        self
    }
}

impl Debug for ChatRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatRequest")
            .field("user_message", &self.user_message)
            .field("system_prompt", &self.system_prompt)
            .field("attachments", &self.attachments.len())
            .field("tool_sources", &self.tools.len())
            .field(
                "execution_context",
                &self.execution_context.as_ref().map(|context| context.name()),
            )
            .finish()
    }
}
