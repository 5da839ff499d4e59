//! Error types for whois-mcp startup and registry operations.
//!
//! Per-call failures have their own types: [`crate::schema::SchemaError`] for
//! rejected input and [`crate::resolver::ResolverError`] for delegate failures.

use thiserror::Error;

/// Main error type for whois-mcp operations
#[derive(Error, Debug)]
pub enum WhoisMcpError {
    /// Two tools registered under the same name
    #[error("duplicate tool name: {0}")]
    DuplicateTool(String),

    /// Invalid configuration for a named section
    #[error("invalid config for '{0}': {1}")]
    InvalidConfig(String, String),

    /// Config file could not be read
    #[error("failed to read config file {0}: {1}")]
    ConfigRead(String, String),

    /// Config file is not valid TOML for the expected shape
    #[error("failed to parse config file {0}: {1}")]
    ConfigParse(String, String),

    /// The resolver backend could not be constructed
    #[error("resolver initialization failed: {0}")]
    ResolverInit(String),

    /// MCP transport failed to start or terminated abnormally
    #[error("transport error: {0}")]
    Transport(String),
}

/// Result type alias for whois-mcp operations
pub type Result<T> = std::result::Result<T, WhoisMcpError>;
