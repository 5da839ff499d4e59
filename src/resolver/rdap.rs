//! RDAP-backed resolver.
//!
//! Each lookup is a single GET against a configurable endpoint template
//! (bootstrap redirectors such as rdap.org by default). The JSON document is
//! returned as-is. Redirects are followed by the client. There are no retries.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde_json::Value;

use super::{ResolverError, WhoisResolver};
use crate::config::{EndpointTemplates, ResolverConfig};
use crate::error::WhoisMcpError;

const RDAP_ACCEPT: &str = "application/rdap+json, application/json;q=0.9";

/// `WhoisResolver` that queries RDAP services over HTTP(S).
pub struct RdapResolver {
    client: reqwest::Client,
    endpoints: EndpointTemplates,
}

impl RdapResolver {
    /// Build a resolver with an HTTP client configured from `config`.
    pub fn new(config: &ResolverConfig) -> crate::Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| WhoisMcpError::ResolverInit(e.to_string()))?;
        Ok(Self::with_client(client, config.endpoints.clone()))
    }

    /// Build a resolver around an existing client.
    pub fn with_client(client: reqwest::Client, endpoints: EndpointTemplates) -> Self {
        Self { client, endpoints }
    }

    /// GET the rendered endpoint. `segment` is substituted verbatim, so
    /// callers pass free text through `urlencoding::encode` first.
    async fn fetch(
        &self,
        template: &str,
        query: &str,
        segment: &str,
    ) -> Result<Value, ResolverError> {
        let url = EndpointTemplates::render(template, segment);
        tracing::debug!(url = %url, "RDAP request");

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, RDAP_ACCEPT)
            .send()
            .await
            .map_err(|e| ResolverError::Request {
                query: query.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ResolverError::NotFound(query.to_string()));
        }
        if !status.is_success() {
            tracing::warn!(url = %url, status = %status, "RDAP request rejected");
            return Err(ResolverError::Status {
                query: query.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ResolverError::Decode {
                query: query.to_string(),
                message: e.to_string(),
            })
    }
}

#[async_trait]
impl WhoisResolver for RdapResolver {
    async fn lookup_domain(&self, domain: &str) -> Result<Value, ResolverError> {
        self.fetch(&self.endpoints.domain, domain, &urlencoding::encode(domain)).await
    }

    async fn lookup_tld(&self, tld: &str) -> Result<Value, ResolverError> {
        // IANA serves TLD records under the bare label.
        let label = tld.trim_start_matches('.');
        self.fetch(&self.endpoints.tld, label, &urlencoding::encode(label)).await
    }

    // IP and ASN values are already parsed, so their text is path-safe as is.
    // IPv6 colons stay literal.
    async fn lookup_ip(&self, ip: IpAddr) -> Result<Value, ResolverError> {
        let query = ip.to_string();
        self.fetch(&self.endpoints.ip, &query, &query).await
    }

    async fn lookup_asn(&self, asn: u32) -> Result<Value, ResolverError> {
        let query = asn.to_string();
        self.fetch(&self.endpoints.asn, &query, &query).await
    }
}
