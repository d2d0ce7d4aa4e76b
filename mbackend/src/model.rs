//! Backend-agnostic request, response, and message model types.
//!
//! ```rust
//! use mbackend::{BackendErrorKind, BackendRequest, Message};
//!
//! let ok = BackendRequest::new_validated(vec![Message::user("Summarize this diff")]);
//! assert!(ok.is_ok());
//!
//! let err = BackendRequest::new_validated(Vec::new())
//!     .err()
//!     .expect("empty message set should fail");
//! assert_eq!(err.kind, BackendErrorKind::InvalidRequest);
//! ```

use mcommon::MetadataMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::BackendError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
    ToolResult,
}

/// Binary content shipped to the backend as a base64 data URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaReference {
    pub content_type: String,
    pub file_name: String,
    pub data_url: String,
}

impl MediaReference {
    pub fn new(
        content_type: impl Into<String>,
        file_name: impl Into<String>,
        data_url: impl Into<String>,
    ) -> Self {
        Self {
            content_type: content_type.into(),
            file_name: file_name.into(),
            data_url: data_url.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

impl ToolCall {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_call_id: String,
    pub tool_name: String,
    pub output: String,
}

impl ToolResult {
    pub fn for_call(call: &ToolCall, output: impl Into<String>) -> Self {
        Self {
            tool_call_id: call.id.clone(),
            tool_name: call.name.clone(),
            output: output.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    Image(MediaReference),
    File(MediaReference),
    ToolCall(ToolCall),
    ToolResult(ToolResult),
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub parts: Vec<ContentPart>,
}

impl Message {
    pub fn new(role: Role, parts: Vec<ContentPart>) -> Self {
        Self { role, parts }
    }

    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self::new(role, vec![ContentPart::text(text)])
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::text(Role::System, text)
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::text(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::text(Role::Assistant, text)
    }

    pub fn tool_result(result: ToolResult) -> Self {
        Self::new(Role::ToolResult, vec![ContentPart::ToolResult(result)])
    }

    /// Concatenation of every text part, in order.
    pub fn text_content(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn tool_calls(&self) -> impl Iterator<Item = &ToolCall> {
        self.parts.iter().filter_map(|part| match part {
            ContentPart::ToolCall(call) => Some(call),
            _ => None,
        })
    }

    pub fn has_tool_calls(&self) -> bool {
        self.tool_calls().next().is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters_schema: Option<Value>,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters_schema: None,
        }
    }

    pub fn with_parameters_schema(mut self, schema: Value) -> Self {
        self.parameters_schema = Some(schema);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FinishReason {
    #[default]
    EndTurn,
    MaxTokens,
    ToolUse,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

/// Final structured answer of one backend call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BackendResponse {
    pub text: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    pub finish_reason: FinishReason,
    pub usage: TokenUsage,
}

impl BackendResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            text: None,
            tool_calls,
            finish_reason: FinishReason::ToolUse,
            usage: TokenUsage::default(),
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = usage;
        self
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Response text when present and non-empty.
    pub fn non_empty_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|text| !text.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackendRequest {
    pub messages: Vec<Message>,
    pub tools: Vec<ToolDefinition>,
    pub metadata: MetadataMap,
    pub stream: bool,
}

impl BackendRequest {
    pub fn builder() -> BackendRequestBuilder {
        BackendRequestBuilder::new()
    }

    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            tools: Vec::new(),
            metadata: MetadataMap::new(),
            stream: false,
        }
    }

    pub fn new_validated(messages: Vec<Message>) -> Result<Self, BackendError> {
        let request = Self::new(messages);
        request.validate()?;
        Ok(request)
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn enable_streaming(mut self) -> Self {
        self.stream = true;
        self
    }

    pub fn validate(&self) -> Result<(), BackendError> {
        if self.messages.is_empty() {
            return Err(BackendError::invalid_request(
                "at least one message is required",
            ));
        }

        if let Some(tool) = self.tools.iter().find(|tool| tool.name.trim().is_empty()) {
            return Err(BackendError::invalid_request(format!(
                "tool definitions must be named (description: '{}')",
                tool.description
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BackendRequestBuilder {
    messages: Vec<Message>,
    tools: Vec<ToolDefinition>,
    metadata: MetadataMap,
    stream: bool,
}

impl BackendRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn messages(mut self, messages: Vec<Message>) -> Self {
        self.messages.extend(messages);
        self
    }

    pub fn tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn streaming(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn build(self) -> Result<BackendRequest, BackendError> {
        let request = BackendRequest {
            messages: self.messages,
            tools: self.tools,
            metadata: self.metadata,
            stream: self.stream,
        };

        request.validate()?;
        Ok(request)
    }
}
