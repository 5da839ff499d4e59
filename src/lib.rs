//! whois-mcp: WHOIS lookups as MCP tools over STDIO.
//! Registers `whois.domain`, `whois.tld`, `whois.ip` and `whois.as`, validates
//! their input at the boundary, and delegates each lookup to a pluggable
//! resolver (RDAP over HTTP by default).

pub mod config;
pub mod console;
pub mod dispatch;
pub mod error;
pub mod lookup;
pub mod registry;
pub mod resolver;
pub mod schema;
pub mod server;
pub mod transport;

pub use config::{EndpointTemplates, ResolverConfig, ServerSection, WhoisConfig};
pub use dispatch::run_lookup;
pub use error::{Result, WhoisMcpError};
pub use lookup::{LookupKind, LookupRequest};
pub use registry::{ToolDescriptor, ToolRegistry, ToolRegistryBuilder};
pub use resolver::{RdapResolver, ResolverError, WhoisResolver};
pub use schema::{InputSchema, ParamRule, ParamValue, SchemaError};
pub use server::WhoisMcpServer;
pub use transport::{
    DrainingReader, RecordingWriter, ShutdownSignal, ShutdownSignals, drain_on_eof, serve,
    serve_stdio,
};
