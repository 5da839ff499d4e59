//! ToolRegistry: the immutable table of tools served over MCP.
//!
//! The registry is populated once at startup through `ToolRegistryBuilder`
//! and frozen by `build()`. Duplicate names are rejected while building.
//! After that it is shared read-only behind an `Arc`.

use std::collections::HashMap;
use std::sync::Arc;

use rmcp::model::Tool;

use crate::error::WhoisMcpError;
use crate::lookup::LookupKind;
use crate::schema::InputSchema;

/// Name, description and input schema of one tool, plus the lookup it runs.
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub schema: InputSchema,
    pub kind: LookupKind,
}

impl ToolDescriptor {
    /// The standard descriptor for a lookup kind.
    pub fn for_kind(kind: LookupKind) -> Self {
        Self {
            name: kind.tool_name().to_string(),
            description: kind.description().to_string(),
            schema: kind.input_schema(),
            kind,
        }
    }

    /// Render as an rmcp `Tool` for `tools/list`.
    pub fn to_tool(&self) -> Tool {
        Tool {
            name: self.name.clone().into(),
            title: None,
            description: Some(self.description.clone().into()),
            input_schema: Arc::new(self.schema.to_json_schema()),
            output_schema: None,
            annotations: None,
            icons: None,
            meta: None,
        }
    }
}

/// Collects descriptors before the registry is frozen.
#[derive(Debug, Default)]
pub struct ToolRegistryBuilder {
    descriptors: Vec<ToolDescriptor>,
    index: HashMap<String, usize>,
}

impl ToolRegistryBuilder {
    /// Add a tool. Fails with `DuplicateTool` if the name is already taken.
    pub fn register(mut self, descriptor: ToolDescriptor) -> crate::Result<Self> {
        if self.index.contains_key(&descriptor.name) {
            return Err(WhoisMcpError::DuplicateTool(descriptor.name));
        }
        tracing::debug!(tool = %descriptor.name, "registering tool");
        self.index
            .insert(descriptor.name.clone(), self.descriptors.len());
        self.descriptors.push(descriptor);
        Ok(self)
    }

    pub fn build(self) -> ToolRegistry {
        ToolRegistry {
            descriptors: self.descriptors,
            index: self.index,
        }
    }
}

/// Immutable name → descriptor table, in registration order.
#[derive(Debug)]
pub struct ToolRegistry {
    descriptors: Vec<ToolDescriptor>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    /// Registry holding the four WHOIS lookup tools.
    pub fn whois() -> crate::Result<Self> {
        LookupKind::ALL
            .into_iter()
            .try_fold(Self::builder(), |builder, kind| {
                builder.register(ToolDescriptor::for_kind(kind))
            })
            .map(ToolRegistryBuilder::build)
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.index.get(name).map(|&i| &self.descriptors[i])
    }

    /// All tools as rmcp `Tool`s, in registration order.
    pub fn tools(&self) -> Vec<Tool> {
        self.descriptors.iter().map(ToolDescriptor::to_tool).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.descriptors.iter().map(|d| d.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
