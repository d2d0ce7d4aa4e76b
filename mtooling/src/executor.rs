//! Bounded, failure-absorbing tool execution.
//!
//! [`ToolExecutor::execute`] never fails: errors, panics and timeouts inside a tool
//! come back as text prefixed with [`TOOL_ERROR_PREFIX`] so the model can react to
//! them.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_timer::Delay;
use futures_util::FutureExt;
use futures_util::future::{Either, select};
use tokio::sync::oneshot;

use crate::{
    ContextTask, ExecutionContext, NoopToolExecutionHooks, ToolDescriptor, ToolError,
    ToolExecutionHooks,
};

pub const TOOL_ERROR_PREFIX: &str = "Error executing tool: ";

#[derive(Clone)]
pub struct ToolExecutor {
    hooks: Arc<dyn ToolExecutionHooks>,
}

impl Default for ToolExecutor {
    fn default() -> Self {
        Self {
            hooks: Arc::new(NoopToolExecutionHooks),
        }
    }
}

impl ToolExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ToolExecutionHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Runs one invocation of `descriptor` and returns the text fed back to the model.
    ///
    /// With a `context` the invocation is submitted there; otherwise it runs on the
    /// runtime's blocking pool. Either way the wait is bounded by `timeout`, and a
    /// timed-out invocation is left running detached.
    pub async fn execute(
        &self,
        descriptor: &ToolDescriptor,
        args_json: &str,
        context: Option<&Arc<dyn ExecutionContext>>,
        timeout: Duration,
    ) -> String {
        let tool_name = descriptor.name();
        let args_json = if args_json.trim().is_empty() {
            "{}".to_string()
        } else {
            args_json.to_string()
        };

        self.hooks.on_execution_start(
            tool_name,
            &args_json,
            context.map(|context| context.name()),
        );
        let started = Instant::now();

        let outcome = match self.dispatch(descriptor, args_json, context) {
            Ok(receiver) => await_outcome(tool_name, receiver, timeout).await,
            Err(error) => Err(error),
        };

        match outcome {
            Ok(output) => {
                self.hooks
                    .on_execution_success(tool_name, &output, started.elapsed());
                output
            }
            Err(error) => {
                let error = error.with_tool_name(tool_name);
                self.hooks
                    .on_execution_failure(tool_name, &error, started.elapsed());
                format!("{TOOL_ERROR_PREFIX}{}", error.message)
            }
        }
    }

    fn dispatch(
        &self,
        descriptor: &ToolDescriptor,
        args_json: String,
        context: Option<&Arc<dyn ExecutionContext>>,
    ) -> Result<oneshot::Receiver<Result<String, ToolError>>, ToolError> {
        let tool = descriptor.tool();
        let (sender, receiver) = oneshot::channel();

        let task: ContextTask = Box::pin(async move {
            let outcome = AssertUnwindSafe(async move { tool.invoke(args_json).await })
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| Err(ToolError::execution(panic_message(payload))));
            let _ = sender.send(outcome);
        });

        match context {
            Some(context) => context.submit(task)?,
            None => {
                let handle = tokio::runtime::Handle::try_current().map_err(|err| {
                    ToolError::context_unavailable(format!(
                        "no runtime available to run tool: {err}"
                    ))
                })?;
                let runner = handle.clone();
                drop(handle.spawn_blocking(move || runner.block_on(task)));
            }
        }

        Ok(receiver)
    }
}

async fn await_outcome(
    tool_name: &str,
    receiver: oneshot::Receiver<Result<String, ToolError>>,
    timeout: Duration,
) -> Result<String, ToolError> {
    match select(receiver, Delay::new(timeout)).await {
        Either::Left((Ok(outcome), _)) => outcome,
        Either::Left((Err(_), _)) => Err(ToolError::execution(format!(
            "tool '{tool_name}' stopped without producing a result"
        ))),
        Either::Right(_) => {
            tracing::warn!(
                tool = tool_name,
                timeout_ms = timeout.as_millis() as u64,
                "tool invocation timed out; leaving it detached"
            );
            Err(ToolError::timeout(format!(
                "tool '{tool_name}' timed out after {} ms",
                timeout.as_millis()
            )))
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "tool panicked".to_string()
    }
}
