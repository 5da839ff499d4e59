//! WHOIS resolver seam.
//!
//! The server never talks to registries itself. Each lookup is delegated to a
//! `WhoisResolver`, whose single outcome (structured result or error) is
//! mapped 1:1 onto the tool response.

pub mod rdap;

use std::net::IpAddr;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use rdap::RdapResolver;

/// Failure reported by a resolver. The `Display` text is what the caller
/// sees in the error response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolverError {
    #[error("no registration data found for '{0}'")]
    NotFound(String),

    #[error("registry returned HTTP {status} for '{query}'")]
    Status { query: String, status: u16 },

    #[error("lookup request for '{query}' failed: {message}")]
    Request { query: String, message: String },

    #[error("invalid registry response for '{query}': {message}")]
    Decode { query: String, message: String },

    /// Failure from a custom `WhoisResolver` that fits none of the HTTP
    /// variants, e.g. a port-43 client reporting "Unknown TLD". The message
    /// is shown to the caller unchanged.
    #[error("{0}")]
    Other(String),
}

/// Backend resolving the four lookup kinds to opaque structured results.
#[async_trait]
pub trait WhoisResolver: Send + Sync {
    async fn lookup_domain(&self, domain: &str) -> Result<Value, ResolverError>;

    async fn lookup_tld(&self, tld: &str) -> Result<Value, ResolverError>;

    async fn lookup_ip(&self, ip: IpAddr) -> Result<Value, ResolverError>;

    async fn lookup_asn(&self, asn: u32) -> Result<Value, ResolverError>;
}
