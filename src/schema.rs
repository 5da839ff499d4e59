//! Declarative input schemas for the lookup tools.
//!
//! An `InputSchema` names the single required parameter of a tool and the
//! `ParamRule` it must satisfy. The same description is used twice: rendered
//! as JSON Schema for `tools/list`, and evaluated against every `tools/call`
//! before anything is delegated to the resolver.

use std::net::IpAddr;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

/// JSON Schema pattern advertised for ASN parameters.
const ASN_JSON_PATTERN: &str = "^[Aa][Ss][0-9]+$";

/// Matches `AS<digits>` case-insensitively, capturing the digits.
fn asn_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?i:AS)([0-9]+)$").expect("valid regex"))
}

/// Validation failure for a tool call. Surfaced to the caller as a
/// protocol-level invalid-params error, never as a tool result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("missing required parameter '{0}'")]
    Missing(String),

    #[error("parameter '{0}' must be a string")]
    NotAString(String),

    #[error("parameter '{0}' must be a non-empty string")]
    Empty(String),

    #[error("parameter '{param}' must be a valid IPv4 or IPv6 address, got '{value}'")]
    InvalidIp { param: String, value: String },

    #[error("parameter '{param}' must match AS<digits>, got '{value}'")]
    InvalidAsn { param: String, value: String },

    #[error("parameter '{param}': AS number in '{value}' exceeds the 32-bit range")]
    AsnOutOfRange { param: String, value: String },

    #[error("parameter '{0}' does not produce a value accepted by this lookup")]
    KindMismatch(String),
}

/// Constraint applied to a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamRule {
    /// Any string with at least one character.
    NonEmptyString,
    /// An IPv4 or IPv6 address literal.
    IpLiteral,
    /// `AS<digits>`, case-insensitive, converted to the number after `AS`.
    AsnHandle,
}

/// A parameter value that passed its rule, already converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Text(String),
    Ip(IpAddr),
    Asn(u32),
}

impl ParamRule {
    /// Check `raw` against this rule and convert it.
    pub fn check(&self, param: &str, raw: &str) -> Result<ParamValue, SchemaError> {
        match self {
            ParamRule::NonEmptyString => {
                if raw.is_empty() {
                    return Err(SchemaError::Empty(param.to_string()));
                }
                Ok(ParamValue::Text(raw.to_string()))
            }
            ParamRule::IpLiteral => raw
                .parse::<IpAddr>()
                .map(ParamValue::Ip)
                .map_err(|_| SchemaError::InvalidIp {
                    param: param.to_string(),
                    value: raw.to_string(),
                }),
            ParamRule::AsnHandle => {
                let captures = asn_regex()
                    .captures(raw)
                    .ok_or_else(|| SchemaError::InvalidAsn {
                        param: param.to_string(),
                        value: raw.to_string(),
                    })?;
                // Digits-only capture, so the only parse failure is overflow.
                captures[1]
                    .parse::<u32>()
                    .map(ParamValue::Asn)
                    .map_err(|_| SchemaError::AsnOutOfRange {
                        param: param.to_string(),
                        value: raw.to_string(),
                    })
            }
        }
    }

    fn json_schema(&self, description: &str) -> Value {
        match self {
            ParamRule::NonEmptyString => serde_json::json!({
                "type": "string",
                "minLength": 1,
                "description": description,
            }),
            ParamRule::IpLiteral => serde_json::json!({
                "type": "string",
                "anyOf": [{ "format": "ipv4" }, { "format": "ipv6" }],
                "description": description,
            }),
            ParamRule::AsnHandle => serde_json::json!({
                "type": "string",
                "pattern": ASN_JSON_PATTERN,
                "description": description,
            }),
        }
    }
}

/// Schema of a lookup tool: one required string parameter and its rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSchema {
    pub param: String,
    pub description: String,
    pub rule: ParamRule,
}

impl InputSchema {
    pub fn new(param: impl Into<String>, description: impl Into<String>, rule: ParamRule) -> Self {
        Self {
            param: param.into(),
            description: description.into(),
            rule,
        }
    }

    /// Evaluate the call arguments against this schema.
    ///
    /// Unknown extra keys are ignored. The parameter must be present and a
    /// JSON string; its content is then checked by the rule.
    pub fn validate(&self, arguments: Option<&Map<String, Value>>) -> Result<ParamValue, SchemaError> {
        let value = arguments
            .and_then(|args| args.get(&self.param))
            .ok_or_else(|| SchemaError::Missing(self.param.clone()))?;
        let raw = value
            .as_str()
            .ok_or_else(|| SchemaError::NotAString(self.param.clone()))?;
        self.rule.check(&self.param, raw)
    }

    /// Render as a JSON Schema object suitable for MCP tool registration.
    pub fn to_json_schema(&self) -> Map<String, Value> {
        let mut props = Map::new();
        props.insert(self.param.clone(), self.rule.json_schema(&self.description));

        let mut schema = Map::new();
        schema.insert("type".to_string(), Value::String("object".to_string()));
        schema.insert("properties".to_string(), Value::Object(props));
        schema.insert(
            "required".to_string(),
            Value::Array(vec![Value::String(self.param.clone())]),
        );
        schema
    }
}
