//! Per-orchestrator configuration.
//!
//! ```rust
//! use std::time::Duration;
//!
//! use mchat::{ChatPolicy, ResponseMode};
//!
//! let policy = ChatPolicy::default()
//!     .with_tool_timeout(Duration::from_secs(5))
//!     .with_response_mode(ResponseMode::FullResponse);
//!
//! assert!(policy.validate().is_ok());
//! assert_eq!(policy.max_tool_depth, 20);
//! ```

use std::time::Duration;

use mmemory::DEFAULT_MAX_MESSAGES;

use crate::{ChatError, ResponseMode};

pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_TOOL_DEPTH: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPolicy {
    pub tool_timeout: Duration,
    pub memory_capacity: usize,
    pub max_tool_depth: usize,
    pub response_mode: ResponseMode,
    /// Reject text attachments that are not valid UTF-8 instead of substituting U+FFFD.
    pub strict_text_decoding: bool,
}

impl Default for ChatPolicy {
    fn default() -> Self {
        Self {
            tool_timeout: DEFAULT_TOOL_TIMEOUT,
            memory_capacity: DEFAULT_MAX_MESSAGES,
            max_tool_depth: DEFAULT_MAX_TOOL_DEPTH,
            response_mode: ResponseMode::default(),
            strict_text_decoding: false,
        }
    }
}

impl ChatPolicy {
    pub fn with_tool_timeout(mut self, tool_timeout: Duration) -> Self {
        self.tool_timeout = tool_timeout;
        self
    }

    pub fn with_memory_capacity(mut self, memory_capacity: usize) -> Self {
        self.memory_capacity = memory_capacity;
        self
    }

    pub fn with_max_tool_depth(mut self, max_tool_depth: usize) -> Self {
        self.max_tool_depth = max_tool_depth;
        self
    }

    pub fn with_response_mode(mut self, response_mode: ResponseMode) -> Self {
        self.response_mode = response_mode;
        self
    }

    pub fn with_strict_text_decoding(mut self, strict: bool) -> Self {
        self.strict_text_decoding = strict;
        self
    }

    pub fn validate(&self) -> Result<(), ChatError> {
        if self.tool_timeout.is_zero() {
            return Err(ChatError::invalid_request("tool_timeout must be greater than zero"));
        }

        if self.memory_capacity == 0 {
            return Err(ChatError::invalid_request(
                "memory_capacity must be greater than zero",
            ));
        }

        if self.max_tool_depth == 0 {
            return Err(ChatError::invalid_request(
                "max_tool_depth must be greater than zero",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChatErrorKind;

    #[test]
    fn defaults_match_documented_limits() {
        let policy = ChatPolicy::default();

        assert_eq!(policy.tool_timeout, Duration::from_secs(30));
        assert_eq!(policy.memory_capacity, 30);
        assert_eq!(policy.max_tool_depth, 20);
        assert_eq!(policy.response_mode, ResponseMode::Streaming);
        assert!(!policy.strict_text_decoding);
    }

    #[test]
    fn zero_limits_are_rejected() {
        for policy in [
            ChatPolicy::default().with_tool_timeout(Duration::ZERO),
            ChatPolicy::default().with_memory_capacity(0),
            ChatPolicy::default().with_max_tool_depth(0),
        ] {
            let error = policy.validate().expect_err("zero limit");
            assert_eq!(error.kind, ChatErrorKind::InvalidRequest);
        }
    }
}
