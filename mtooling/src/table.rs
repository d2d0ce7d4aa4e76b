//! Per-request tool table built from caller-supplied sources.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use mbackend::ToolDefinition;
//! use mtooling::{ToolRegistry, ToolSource, ToolTable};
//!
//! let mut registry = ToolRegistry::new();
//! registry.register_blocking_fn(ToolDefinition::new("ping", "Replies pong"), |_| {
//!     Ok("pong".to_string())
//! });
//!
//! let sources: Vec<Arc<dyn ToolSource>> = vec![Arc::new(registry)];
//! let table = ToolTable::build(&sources).expect("definitions are valid");
//! assert!(table.get("ping").is_some());
//! ```

use std::sync::Arc;

use mbackend::ToolDefinition;
use mcommon::Registry;

use crate::{Tool, ToolError, ToolSource};

/// A tool's definition paired with the tool that executes it.
#[derive(Clone)]
pub struct ToolDescriptor {
    definition: ToolDefinition,
    tool: Arc<dyn Tool>,
}

impl ToolDescriptor {
    pub fn new(tool: Arc<dyn Tool>) -> Result<Self, ToolError> {
        let definition = tool.definition();
        validate_definition(&definition)?;
        Ok(Self { definition, tool })
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    pub fn tool(&self) -> Arc<dyn Tool> {
        Arc::clone(&self.tool)
    }
}

impl std::fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("definition", &self.definition)
            .finish_non_exhaustive()
    }
}

pub fn validate_definition(definition: &ToolDefinition) -> Result<(), ToolError> {
    if definition.name.trim().is_empty() {
        return Err(ToolError::invalid_definition("tool name must not be blank"));
    }

    if definition.description.trim().is_empty() {
        return Err(ToolError::invalid_definition(format!(
            "tool '{}' must have a description",
            definition.name
        ))
        .with_tool_name(definition.name.clone()));
    }

    Ok(())
}

/// Name-addressable descriptors, in first-registration order.
#[derive(Debug, Clone, Default)]
pub struct ToolTable {
    descriptors: Registry<String, ToolDescriptor>,
}

impl ToolTable {
    pub fn build(sources: &[Arc<dyn ToolSource>]) -> Result<Self, ToolError> {
        let mut descriptors = Registry::new();

        for source in sources {
            for tool in source.tools() {
                let descriptor = ToolDescriptor::new(tool)?;
                let name = descriptor.name().to_string();
                if descriptors.insert(name.clone(), descriptor).is_some() {
                    tracing::warn!(tool = %name, "duplicate tool name; last registration wins");
                }
            }
        }

        Ok(Self { descriptors })
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.descriptors.get(name)
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.descriptors
            .values()
            .map(|descriptor| descriptor.definition().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
