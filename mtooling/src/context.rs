//! Execution contexts that tool invocations can be marshaled onto.
//!
//! An embedder that owns a single-threaded domain (a UI loop, an actor, a thread
//! holding non-`Send` handles) implements [`ExecutionContext`] so tool bodies run
//! there instead of on a background worker.
//!
//! ```rust
//! use std::sync::mpsc;
//!
//! use mtooling::{ExecutionContext, SerialExecutionContext};
//!
//! let context = SerialExecutionContext::new("docs-context").expect("context thread starts");
//! let (sender, receiver) = mpsc::channel();
//!
//! context
//!     .submit(Box::pin(async move {
//!         let _ = sender.send(std::thread::current().name().map(ToString::to_string));
//!     }))
//!     .expect("context accepts work");
//!
//! assert_eq!(receiver.recv().unwrap().as_deref(), Some("docs-context"));
//! ```

use mcommon::BoxFuture;
use tokio::sync::mpsc;

use crate::ToolError;

/// One unit of work submitted to an [`ExecutionContext`].
pub type ContextTask = BoxFuture<'static, ()>;

pub trait ExecutionContext: Send + Sync {
    fn name(&self) -> &str {
        "execution-context"
    }

    /// Queues `task` to run inside the context. Must not wait for it to finish.
    fn submit(&self, task: ContextTask) -> Result<(), ToolError>;
}

/// A dedicated OS thread driving a current-thread runtime; tasks run one at a time
/// in submission order.
#[derive(Debug)]
pub struct SerialExecutionContext {
    name: String,
    sender: mpsc::UnboundedSender<ContextTask>,
}

impl SerialExecutionContext {
    pub fn new(name: impl Into<String>) -> Result<Self, ToolError> {
        let name = name.into();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| {
                ToolError::context_unavailable(format!(
                    "failed to build runtime for context '{name}': {err}"
                ))
            })?;
        let (sender, mut receiver) = mpsc::unbounded_channel::<ContextTask>();

        std::thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                runtime.block_on(async move {
                    while let Some(task) = receiver.recv().await {
                        task.await;
                    }
                });
            })
            .map_err(|err| {
                ToolError::context_unavailable(format!(
                    "failed to spawn thread for context '{name}': {err}"
                ))
            })?;

        Ok(Self { name, sender })
    }
}

impl ExecutionContext for SerialExecutionContext {
    fn name(&self) -> &str {
        &self.name
    }

    fn submit(&self, task: ContextTask) -> Result<(), ToolError> {
        self.sender.send(task).map_err(|_| {
            ToolError::context_unavailable(format!("execution context '{}' has shut down", self.name))
        })
    }
}
