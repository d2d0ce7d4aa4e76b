//! Tool trait contract and closure-backed tools.
//!
//! ```rust
//! use mbackend::ToolDefinition;
//! use mtooling::{FunctionTool, Tool};
//!
//! let tool = FunctionTool::new(
//!     ToolDefinition::new("echo", "Echoes input"),
//!     |args| async move { Ok(args) },
//! );
//!
//! assert_eq!(tool.definition().name, "echo");
//! ```

use std::future::Future;
use std::sync::Arc;

use mbackend::ToolDefinition;
use mcommon::BoxFuture;
use serde::de::DeserializeOwned;

use crate::{ToolError, parse_arguments};

pub type ToolFuture<'a, T> = BoxFuture<'a, T>;

/// A named capability the backend may ask to invoke.
///
/// `invoke` should defer its work into the returned future: the executor polls it on
/// the chosen execution context, not on the caller's thread.
pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    fn invoke(&self, args_json: String) -> ToolFuture<'static, Result<String, ToolError>>;
}

/// Anything that contributes tools to a request.
pub trait ToolSource: Send + Sync {
    fn tools(&self) -> Vec<Arc<dyn Tool>>;
}

type ToolHandler =
    dyn Fn(String) -> ToolFuture<'static, Result<String, ToolError>> + Send + Sync;

pub struct FunctionTool {
    definition: ToolDefinition,
    handler: Arc<ToolHandler>,
}

impl FunctionTool {
    pub fn new<F, Fut>(definition: ToolDefinition, handler: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, ToolError>> + Send + 'static,
    {
        let handler: Arc<ToolHandler> = Arc::new(move |args_json| Box::pin(handler(args_json)));

        Self {
            definition,
            handler,
        }
    }

    /// Wraps a synchronous body. It runs when the invocation is polled.
    pub fn blocking<F>(definition: ToolDefinition, handler: F) -> Self
    where
        F: Fn(String) -> Result<String, ToolError> + Send + Sync + 'static,
    {
        let handler = Arc::new(handler);
        Self::new(definition, move |args_json| {
            let handler = Arc::clone(&handler);
            async move { handler(args_json) }
        })
    }

    /// Deserializes the arguments into `T` before calling the synchronous body.
    pub fn json<T, F>(definition: ToolDefinition, handler: F) -> Self
    where
        T: DeserializeOwned + 'static,
        F: Fn(T) -> Result<String, ToolError> + Send + Sync + 'static,
    {
        Self::blocking(definition, move |args_json| {
            let args = parse_arguments::<T>(&args_json)?;
            handler(args)
        })
    }
}

impl Tool for FunctionTool {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    fn invoke(&self, args_json: String) -> ToolFuture<'static, Result<String, ToolError>> {
        (self.handler)(args_json)
    }
}

impl ToolSource for Arc<dyn Tool> {
    fn tools(&self) -> Vec<Arc<dyn Tool>> {
        vec![Arc::clone(self)]
    }
}
