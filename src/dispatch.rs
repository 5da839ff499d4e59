//! Lookup dispatch: one validated request in, one response envelope out.

use rmcp::model::{CallToolResult, Content};
use serde_json::Value;

use crate::lookup::{LookupKind, LookupRequest};
use crate::resolver::WhoisResolver;

/// Delegate `request` to the resolver and wrap its single outcome.
///
/// Resolver failures become an `is_error` result carrying the error message;
/// they are never propagated as protocol errors.
pub async fn run_lookup(resolver: &dyn WhoisResolver, request: &LookupRequest) -> CallToolResult {
    let outcome = match request {
        LookupRequest::Domain(domain) => resolver.lookup_domain(domain).await,
        LookupRequest::Tld(tld) => resolver.lookup_tld(tld).await,
        LookupRequest::Ip(ip) => resolver.lookup_ip(*ip).await,
        LookupRequest::Asn(asn) => resolver.lookup_asn(*asn).await,
    };

    match outcome {
        Ok(value) => success_envelope(request.kind(), &value),
        Err(e) => {
            tracing::debug!(query = %request, error = %e, "resolver failed");
            error_envelope(e.to_string())
        }
    }
}

/// Success text: `<label> whois lookup for: \n<compact JSON>`.
pub fn success_envelope(kind: LookupKind, value: &Value) -> CallToolResult {
    match serde_json::to_string(value) {
        Ok(json) => CallToolResult::success(vec![Content::text(format!(
            "{} whois lookup for: \n{}",
            kind.label(),
            json
        ))]),
        Err(e) => error_envelope(e.to_string()),
    }
}

pub fn error_envelope(message: impl Into<String>) -> CallToolResult {
    CallToolResult::error(vec![Content::text(message.into())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::testing::StubResolver;
    use serde_json::json;

    fn text_of(result: &CallToolResult) -> &str {
        assert_eq!(result.content.len(), 1, "exactly one content item");
        result.content[0]
            .raw
            .as_text()
            .map(|t| t.text.as_str())
            .expect("text content")
    }

    fn all_requests() -> Vec<LookupRequest> {
        vec![
            LookupRequest::Domain("example.com".to_string()),
            LookupRequest::Tld("com".to_string()),
            LookupRequest::Ip("1.1.1.1".parse().unwrap()),
            LookupRequest::Asn(13335),
        ]
    }

    #[tokio::test]
    async fn test_success_for_every_kind() {
        let stub = StubResolver::returning(json!({"registrar": "X"}));
        for request in all_requests() {
            let result = run_lookup(&stub, &request).await;
            assert_ne!(result.is_error, Some(true));
            let text = text_of(&result);
            assert!(
                text.starts_with(&format!("{} whois lookup for: \n", request.kind().label())),
                "unexpected text: {text}"
            );
            assert!(text.ends_with(r#"{"registrar":"X"}"#));
        }
        assert_eq!(
            stub.seen(),
            vec!["domain:example.com", "tld:com", "ip:1.1.1.1", "asn:13335"]
        );
    }

    #[tokio::test]
    async fn test_failure_for_every_kind() {
        let stub = StubResolver::failing("getaddrinfo ENOTFOUND whois.example");
        for request in all_requests() {
            let result = run_lookup(&stub, &request).await;
            assert_eq!(result.is_error, Some(true));
            assert_eq!(text_of(&result), "getaddrinfo ENOTFOUND whois.example");
        }
        assert_eq!(stub.calls(), 4);
    }

    #[tokio::test]
    async fn test_domain_text_exact() {
        let stub = StubResolver::returning(json!({"registrar": "X"}));
        let result = run_lookup(&stub, &LookupRequest::Domain("example.com".to_string())).await;
        assert_eq!(
            text_of(&result),
            "Domain whois lookup for: \n{\"registrar\":\"X\"}"
        );
    }

    #[test]
    fn test_success_envelope_serializes_compactly() {
        let value = json!({"a": [1, 2], "b": {"c": null}});
        let result = success_envelope(LookupKind::Asn, &value);
        assert_eq!(
            text_of(&result),
            "ASN whois lookup for: \n{\"a\":[1,2],\"b\":{\"c\":null}}"
        );
    }
}
