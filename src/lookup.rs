//! Lookup kinds and the typed request each tool call is turned into.

use std::fmt;
use std::net::IpAddr;

use crate::schema::{InputSchema, ParamRule, ParamValue, SchemaError};

/// The four WHOIS lookups exposed as tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    Domain,
    Tld,
    Ip,
    Asn,
}

impl LookupKind {
    /// All kinds in registration order.
    pub const ALL: [LookupKind; 4] = [
        LookupKind::Domain,
        LookupKind::Tld,
        LookupKind::Ip,
        LookupKind::Asn,
    ];

    /// MCP tool name.
    pub fn tool_name(self) -> &'static str {
        match self {
            LookupKind::Domain => "whois.domain",
            LookupKind::Tld => "whois.tld",
            LookupKind::Ip => "whois.ip",
            LookupKind::Asn => "whois.as",
        }
    }

    /// Tool description shown to the calling model.
    pub fn description(self) -> &'static str {
        match self {
            LookupKind::Domain => "Looks up whois information about the domain",
            LookupKind::Tld => "Looks up whois information about the Top Level Domain (TLD)",
            LookupKind::Ip => "Looks up whois information about the IP",
            LookupKind::Asn => {
                "Looks up whois information about the Autonomous System Number (ASN)"
            }
        }
    }

    /// Prefix used in the success text, e.g. `Domain whois lookup for: ...`.
    pub fn label(self) -> &'static str {
        match self {
            LookupKind::Domain => "Domain",
            LookupKind::Tld => "TLD",
            LookupKind::Ip => "IP",
            LookupKind::Asn => "ASN",
        }
    }

    pub fn input_schema(self) -> InputSchema {
        match self {
            LookupKind::Domain => InputSchema::new(
                "domain",
                "Domain name to look up, e.g. example.com",
                ParamRule::NonEmptyString,
            ),
            LookupKind::Tld => InputSchema::new(
                "tld",
                "Top level domain to look up, e.g. com",
                ParamRule::NonEmptyString,
            ),
            LookupKind::Ip => InputSchema::new(
                "ip",
                "IPv4 or IPv6 address literal, e.g. 8.8.8.8",
                ParamRule::IpLiteral,
            ),
            LookupKind::Asn => InputSchema::new(
                "asn",
                "Autonomous System Number in the form AS<digits>, e.g. AS15169",
                ParamRule::AsnHandle,
            ),
        }
    }

    /// Build the typed request from a validated parameter value.
    pub fn request(self, param: &str, value: ParamValue) -> Result<LookupRequest, SchemaError> {
        match (self, value) {
            (LookupKind::Domain, ParamValue::Text(domain)) => Ok(LookupRequest::Domain(domain)),
            (LookupKind::Tld, ParamValue::Text(tld)) => Ok(LookupRequest::Tld(tld)),
            (LookupKind::Ip, ParamValue::Ip(ip)) => Ok(LookupRequest::Ip(ip)),
            (LookupKind::Asn, ParamValue::Asn(asn)) => Ok(LookupRequest::Asn(asn)),
            _ => Err(SchemaError::KindMismatch(param.to_string())),
        }
    }
}

/// One validated lookup, created per tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupRequest {
    Domain(String),
    Tld(String),
    Ip(IpAddr),
    Asn(u32),
}

impl LookupRequest {
    pub fn kind(&self) -> LookupKind {
        match self {
            LookupRequest::Domain(_) => LookupKind::Domain,
            LookupRequest::Tld(_) => LookupKind::Tld,
            LookupRequest::Ip(_) => LookupKind::Ip,
            LookupRequest::Asn(_) => LookupKind::Asn,
        }
    }
}

impl fmt::Display for LookupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupRequest::Domain(domain) => f.write_str(domain),
            LookupRequest::Tld(tld) => f.write_str(tld),
            LookupRequest::Ip(ip) => write!(f, "{}", ip),
            LookupRequest::Asn(asn) => write!(f, "AS{}", asn),
        }
    }
}
