//! WhoisMcpServer: rmcp ServerHandler backed by the tool registry.
//!
//! `tools/list` is answered straight from the frozen `ToolRegistry`.
//! `tools/call` validates arguments against the tool's schema, then hands the
//! typed request to dispatch. Validation failures are returned as protocol
//! errors (`invalid_params`) and never reach the resolver.

use std::sync::Arc;
use std::time::Instant;

use rmcp::ErrorData as McpError;
use rmcp::handler::server::ServerHandler;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, ListToolsResult, PaginatedRequestParams,
    ServerCapabilities, ServerInfo,
};
use rmcp::service::{NotificationContext, RequestContext, RoleServer};
use serde_json::{Map, Value};

use crate::config::{ServerSection, WhoisConfig};
use crate::dispatch::run_lookup;
use crate::registry::ToolRegistry;
use crate::resolver::{RdapResolver, WhoisResolver};

/// MCP server exposing the WHOIS lookup tools.
///
/// Cloning is cheap and every clone shares the same registry and resolver.
/// Nothing here is mutable after construction.
#[derive(Clone)]
pub struct WhoisMcpServer {
    registry: Arc<ToolRegistry>,
    resolver: Arc<dyn WhoisResolver>,
    identity: Arc<ServerSection>,
}

impl WhoisMcpServer {
    pub fn new(
        registry: ToolRegistry,
        resolver: Arc<dyn WhoisResolver>,
        identity: ServerSection,
    ) -> Self {
        Self {
            registry: Arc::new(registry),
            resolver,
            identity: Arc::new(identity),
        }
    }

    /// Build the standard four-tool server with an RDAP resolver.
    pub fn from_config(config: &WhoisConfig) -> crate::Result<Self> {
        config.validate()?;
        let registry = ToolRegistry::whois()?;
        let resolver = RdapResolver::new(&config.resolver)?;
        Ok(Self::new(registry, Arc::new(resolver), config.server.clone()))
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Server name advertised during `initialize`.
    pub fn name(&self) -> &str {
        &self.identity.name
    }

    /// Validate and run one tool call.
    ///
    /// Unknown tools and schema violations are `invalid_params` errors.
    /// Everything past validation produces a `CallToolResult`, with resolver
    /// failures flagged through `is_error`.
    pub async fn invoke(
        &self,
        name: &str,
        arguments: Option<&Map<String, Value>>,
    ) -> Result<CallToolResult, McpError> {
        let descriptor = self
            .registry
            .get(name)
            .ok_or_else(|| McpError::invalid_params(format!("unknown tool: {}", name), None))?;

        let request = descriptor
            .schema
            .validate(arguments)
            .and_then(|value| descriptor.kind.request(&descriptor.schema.param, value))
            .map_err(|e| {
                tracing::debug!(tool = %name, error = %e, "rejected tool arguments");
                McpError::invalid_params(e.to_string(), None)
            })?;

        let start = Instant::now();
        let result = run_lookup(self.resolver.as_ref(), &request).await;

        tracing::info!(
            tool = %name,
            query = %request,
            is_error = result.is_error.unwrap_or(false),
            duration_ms = %start.elapsed().as_millis(),
            "whois lookup"
        );

        Ok(result)
    }
}

impl ServerHandler for WhoisMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: rmcp::model::Implementation {
                name: self.identity.name.clone(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(self.identity.instructions.clone()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.registry.tools(),
            next_cursor: None,
            meta: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.invoke(&request.name, request.arguments.as_ref()).await
    }

    async fn on_initialized(&self, _context: NotificationContext<RoleServer>) {
        tracing::info!("MCP client initialized");
    }
}
