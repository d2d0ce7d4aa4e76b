//! Capability layer for registering and executing tools.
//!
//! Tools come from [`ToolSource`]s (usually a [`ToolRegistry`]), are flattened into a
//! per-request [`ToolTable`], and run through [`ToolExecutor`], which bounds each call
//! by a timeout and optionally marshals it onto an [`ExecutionContext`].

mod args;
mod context;
mod error;
mod executor;
mod hooks;
mod registry;
mod table;
mod tool;

pub mod prelude {
    pub use crate::{
        ExecutionContext, FunctionTool, SerialExecutionContext, Tool, ToolDescriptor, ToolError,
        ToolErrorKind, ToolExecutionHooks, ToolExecutor, ToolFuture, ToolRegistry, ToolSource,
        ToolTable,
    };
}

pub use args::{
    optional_string, parse_arguments, parse_json_object, parse_json_value, required_i64,
    required_string,
};
pub use context::{ContextTask, ExecutionContext, SerialExecutionContext};
pub use error::{ToolError, ToolErrorKind};
pub use executor::{TOOL_ERROR_PREFIX, ToolExecutor};
pub use hooks::{NoopToolExecutionHooks, ToolExecutionHooks};
pub use registry::ToolRegistry;
pub use table::{ToolDescriptor, ToolTable, validate_definition};
pub use tool::{FunctionTool, Tool, ToolFuture, ToolSource};
