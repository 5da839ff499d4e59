//! whois-mcp configuration: deserialization and validation.
//!
//! Every field has a default, so an absent config file and an empty one
//! produce the same server.

use crate::error::WhoisMcpError;
use serde::Deserialize;
use std::path::Path;

/// Placeholder substituted with the lookup query in endpoint templates.
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// Query rendered into each template when validating it.
const SAMPLE_QUERY: &str = "example.com";

/// Top-level whois-mcp configuration, parsed from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WhoisConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub resolver: ResolverConfig,
}

/// Identity advertised to MCP clients during `initialize`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_server_name")]
    pub name: String,
    #[serde(default = "default_instructions")]
    pub instructions: String,
}

/// Settings for the built-in RDAP resolver.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolverConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// HTTP client timeout. Unset means the client never gives up on its own.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub endpoints: EndpointTemplates,
}

/// URL templates for each lookup kind. Each must contain `{query}`.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointTemplates {
    #[serde(default = "default_domain_endpoint")]
    pub domain: String,
    #[serde(default = "default_tld_endpoint")]
    pub tld: String,
    #[serde(default = "default_ip_endpoint")]
    pub ip: String,
    #[serde(default = "default_asn_endpoint")]
    pub asn: String,
}

fn default_server_name() -> String {
    "whois".to_string()
}

fn default_instructions() -> String {
    "MCP for whois lookup about domain, IP, TLD, ASN, etc.".to_string()
}

fn default_user_agent() -> String {
    format!("whois-mcp/{}", env!("CARGO_PKG_VERSION"))
}

fn default_domain_endpoint() -> String {
    "https://rdap.org/domain/{query}".to_string()
}

fn default_tld_endpoint() -> String {
    "https://rdap.iana.org/domain/{query}".to_string()
}

fn default_ip_endpoint() -> String {
    "https://rdap.org/ip/{query}".to_string()
}

fn default_asn_endpoint() -> String {
    "https://rdap.org/autnum/{query}".to_string()
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            instructions: default_instructions(),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: None,
            endpoints: EndpointTemplates::default(),
        }
    }
}

impl Default for EndpointTemplates {
    fn default() -> Self {
        Self {
            domain: default_domain_endpoint(),
            tld: default_tld_endpoint(),
            ip: default_ip_endpoint(),
            asn: default_asn_endpoint(),
        }
    }
}

impl EndpointTemplates {
    /// Substitute `query` into `template`.
    pub fn render(template: &str, query: &str) -> String {
        template.replace(QUERY_PLACEHOLDER, query)
    }

    fn entries(&self) -> [(&'static str, &str); 4] {
        [
            ("domain", self.domain.as_str()),
            ("tld", self.tld.as_str()),
            ("ip", self.ip.as_str()),
            ("asn", self.asn.as_str()),
        ]
    }
}

impl WhoisConfig {
    /// Read, parse and validate a TOML config file.
    pub async fn load(path: &Path) -> crate::Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| WhoisMcpError::ConfigRead(path.display().to_string(), e.to_string()))?;
        let config: WhoisConfig = toml::from_str(&content)
            .map_err(|e| WhoisMcpError::ConfigParse(path.display().to_string(), e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the config, failing fast before the transport is opened.
    pub fn validate(&self) -> crate::Result<()> {
        if self.server.name.trim().is_empty() {
            return Err(WhoisMcpError::InvalidConfig(
                "server.name".to_string(),
                "must be non-empty".to_string(),
            ));
        }

        if self.resolver.timeout_secs == Some(0) {
            return Err(WhoisMcpError::InvalidConfig(
                "resolver.timeout_secs".to_string(),
                "must be > 0 when set".to_string(),
            ));
        }

        for (kind, template) in self.resolver.endpoints.entries() {
            let section = format!("resolver.endpoints.{}", kind);
            if !template.contains(QUERY_PLACEHOLDER) {
                return Err(WhoisMcpError::InvalidConfig(
                    section,
                    format!("template must contain '{}'", QUERY_PLACEHOLDER),
                ));
            }
            // Check the URL a real lookup would request, not the raw template.
            let sample = EndpointTemplates::render(template, SAMPLE_QUERY);
            match url::Url::parse(&sample) {
                Ok(parsed) => match parsed.scheme() {
                    "http" | "https" => {}
                    other => {
                        return Err(WhoisMcpError::InvalidConfig(
                            section,
                            format!("template must be an http(s) URL, got scheme '{}'", other),
                        ));
                    }
                },
                Err(e) => {
                    return Err(WhoisMcpError::InvalidConfig(
                        section,
                        format!("template does not render a valid URL ('{}'): {}", sample, e),
                    ));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse_toml(toml_str: &str) -> WhoisConfig {
        toml::from_str(toml_str).expect("valid TOML")
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_toml("");
        assert_eq!(config.server.name, "whois");
        assert!(config.resolver.timeout_secs.is_none());
        assert_eq!(config.resolver.endpoints.domain, "https://rdap.org/domain/{query}");
        assert_eq!(config.resolver.endpoints.tld, "https://rdap.iana.org/domain/{query}");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_endpoint_override_keeps_other_defaults() {
        let config = parse_toml(
            r#"
            [resolver.endpoints]
            ip = "https://rdap.arin.net/registry/ip/{query}"
            "#,
        );
        assert_eq!(
            config.resolver.endpoints.ip,
            "https://rdap.arin.net/registry/ip/{query}"
        );
        assert_eq!(config.resolver.endpoints.asn, "https://rdap.org/autnum/{query}");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_render_substitutes_query() {
        let url = EndpointTemplates::render("https://rdap.org/autnum/{query}", "15169");
        assert_eq!(url, "https://rdap.org/autnum/15169");
    }

    #[test]
    fn test_template_without_placeholder_rejected() {
        let config = parse_toml(
            r#"
            [resolver.endpoints]
            domain = "https://rdap.org/domain/"
            "#,
        );
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, WhoisMcpError::InvalidConfig(ref s, ref msg) if s == "resolver.endpoints.domain" && msg.contains("{query}")),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_non_http_template_rejected() {
        let config = parse_toml(
            r#"
            [resolver.endpoints]
            tld = "whois://whois.iana.org/{query}"
            "#,
        );
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, WhoisMcpError::InvalidConfig(ref s, ref msg) if s == "resolver.endpoints.tld" && msg.contains("'whois'")),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_template_rendering_invalid_url_rejected() {
        let config = parse_toml(
            r#"
            [resolver.endpoints]
            ip = "https://{query}:notaport/ip"
            "#,
        );
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, WhoisMcpError::InvalidConfig(ref s, ref msg) if s == "resolver.endpoints.ip" && msg.contains("https://example.com:notaport/ip")),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_http_prefix_without_host_rejected() {
        // Passes a prefix check but has no host to connect to.
        let config = parse_toml(
            r#"
            [resolver.endpoints]
            asn = "http:// /autnum/{query}"
            "#,
        );
        assert!(matches!(
            config.validate(),
            Err(WhoisMcpError::InvalidConfig(s, _)) if s == "resolver.endpoints.asn"
        ));
    }

    #[test]
    fn test_template_with_query_string_accepted() {
        let config = parse_toml(
            r#"
            [resolver.endpoints]
            domain = "http://127.0.0.1:8080/lookup?q={query}"
            "#,
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = parse_toml(
            r#"
            [resolver]
            timeout_secs = 0
            "#,
        );
        assert!(matches!(
            config.validate(),
            Err(WhoisMcpError::InvalidConfig(s, _)) if s == "resolver.timeout_secs"
        ));
    }

    #[test]
    fn test_empty_server_name_rejected() {
        let config = parse_toml(
            r#"
            [server]
            name = "  "
            "#,
        );
        assert!(matches!(
            config.validate(),
            Err(WhoisMcpError::InvalidConfig(s, _)) if s == "server.name"
        ));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [server]
            name = "whois-test"

            [resolver]
            timeout_secs = 10
            user_agent = "test-agent"
            "#
        )
        .unwrap();

        let config = WhoisConfig::load(file.path()).await.unwrap();
        assert_eq!(config.server.name, "whois-test");
        assert_eq!(config.resolver.timeout_secs, Some(10));
        assert_eq!(config.resolver.user_agent, "test-agent");
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let result = WhoisConfig::load(&path).await;
        assert!(matches!(result, Err(WhoisMcpError::ConfigRead(_, _))));
    }

    #[tokio::test]
    async fn test_load_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[resolver\ntimeout_secs = ").unwrap();
        let result = WhoisConfig::load(file.path()).await;
        assert!(matches!(result, Err(WhoisMcpError::ConfigParse(_, _))));
    }
}
