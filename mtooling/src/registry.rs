//! Tool registry for lookup by tool definition name.

use std::future::Future;
use std::sync::Arc;

use mbackend::ToolDefinition;
use mcommon::Registry;
use serde::de::DeserializeOwned;

use crate::{FunctionTool, Tool, ToolError, ToolSource};

#[derive(Default)]
pub struct ToolRegistry {
    tools: Registry<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T>(&mut self, tool: T)
    where
        T: Tool + 'static,
    {
        self.register_arc(Arc::new(tool));
    }

    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.definition().name;
        self.tools.insert(name, tool);
    }

    pub fn register_fn<F, Fut>(&mut self, definition: ToolDefinition, handler: F)
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, ToolError>> + Send + 'static,
    {
        self.register(FunctionTool::new(definition, handler));
    }

    pub fn register_blocking_fn<F>(&mut self, definition: ToolDefinition, handler: F)
    where
        F: Fn(String) -> Result<String, ToolError> + Send + Sync + 'static,
    {
        self.register(FunctionTool::blocking(definition, handler));
    }

    pub fn register_json_fn<T, F>(&mut self, definition: ToolDefinition, handler: F)
    where
        T: DeserializeOwned + 'static,
        F: Fn(T) -> Result<String, ToolError> + Send + Sync + 'static,
    {
        self.register(FunctionTool::json(definition, handler));
    }

    pub fn with_tool<T>(mut self, tool: T) -> Self
    where
        T: Tool + 'static,
    {
        self.register(tool);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.remove(name)
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|tool| tool.definition()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl ToolSource for ToolRegistry {
    fn tools(&self) -> Vec<Arc<dyn Tool>> {
        self.tools.values().cloned().collect()
    }
}
