//! Lifecycle hooks for tool execution.
//!
//! ```rust
//! use mtooling::{NoopToolExecutionHooks, ToolExecutionHooks};
//!
//! fn assert_hooks_trait(_hooks: &dyn ToolExecutionHooks) {}
//!
//! let hooks = NoopToolExecutionHooks;
//! assert_hooks_trait(&hooks);
//! ```

use std::time::Duration;

use crate::ToolError;

/// Observes every [`ToolExecutor::execute`](crate::ToolExecutor::execute) call.
///
/// `context` is the execution context name, or `None` for the background worker.
pub trait ToolExecutionHooks: Send + Sync {
    fn on_execution_start(&self, _tool_name: &str, _args_json: &str, _context: Option<&str>) {}

    fn on_execution_success(&self, _tool_name: &str, _output: &str, _elapsed: Duration) {}

    fn on_execution_failure(&self, _tool_name: &str, _error: &ToolError, _elapsed: Duration) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopToolExecutionHooks;

impl ToolExecutionHooks for NoopToolExecutionHooks {}
