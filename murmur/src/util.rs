//! Small convenience constructors for common types.

use crate::{Message, ToolCall, ToolResult};

pub fn system_message(content: impl Into<String>) -> Message {
    Message::system(content)
}

pub fn user_message(content: impl Into<String>) -> Message {
    Message::user(content)
}

pub fn assistant_message(content: impl Into<String>) -> Message {
    Message::assistant(content)
}

/// Answers `call` with `output`, keeping the call id and tool name.
pub fn tool_result_message(call: &ToolCall, output: impl Into<String>) -> Message {
    Message::tool_result(ToolResult::for_call(call, output))
}
