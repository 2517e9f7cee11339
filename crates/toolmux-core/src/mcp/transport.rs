//! Transport selection
//!
//! The transport kinds form a closed set. HTTP-based transports are split
//! out into their own enum because they are the only ones a web host can
//! build; `TransportSpec::resolve` refuses the rest there.

use std::collections::BTreeMap;

use reqwest::Url;

use super::error::{McpError, McpResult};
use crate::config::{HostEnvironment, ServerDescriptor, TransportKind};

/// Parameters for spawning a stdio server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
}

/// HTTP-based transports
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpTransport {
    /// Legacy SSE: event stream plus a POST endpoint announced on it
    Sse { url: Url },
    /// Streamable HTTP
    Streamable { url: Url },
}

impl HttpTransport {
    /// The endpoint URL
    pub fn url(&self) -> &Url {
        match self {
            HttpTransport::Sse { url } | HttpTransport::Streamable { url } => url,
        }
    }

    /// Build from a descriptor; fails for non-HTTP kinds
    pub fn resolve(desc: &ServerDescriptor, base_url: Option<&str>) -> McpResult<Self> {
        let make: fn(Url) -> HttpTransport = match desc.transport_kind {
            TransportKind::Sse => |url| HttpTransport::Sse { url },
            TransportKind::Streamable => |url| HttpTransport::Streamable { url },
            other => {
                return Err(McpError::unsupported(
                    &desc.name,
                    format!("'{}' is not an HTTP transport", other),
                ))
            }
        };

        let raw = desc
            .url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| {
                McpError::unsupported(
                    &desc.name,
                    format!("'{}' transport requires a url", desc.transport_kind),
                )
            })?;

        Ok(make(resolve_url(&desc.name, raw, base_url)?))
    }
}

/// A fully resolved way to reach one server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportSpec {
    Command(CommandSpec),
    Http(HttpTransport),
}

impl TransportSpec {
    /// Pick the transport for `desc` in the given host environment
    pub fn resolve(
        desc: &ServerDescriptor,
        environment: HostEnvironment,
        base_url: Option<&str>,
    ) -> McpResult<Self> {
        match desc.transport_kind {
            TransportKind::Command => {
                if environment == HostEnvironment::Web {
                    return Err(McpError::unsupported(
                        &desc.name,
                        "only SSE and Streamable HTTP are supported in a web host",
                    ));
                }
                let program = desc
                    .command
                    .as_deref()
                    .filter(|c| !c.trim().is_empty())
                    .ok_or_else(|| McpError::unsupported(&desc.name, "'command' transport requires a command"))?;

                Ok(TransportSpec::Command(CommandSpec {
                    program: program.to_string(),
                    args: desc.args.clone(),
                    env: desc.env.clone(),
                }))
            }
            TransportKind::Sse | TransportKind::Streamable => {
                Ok(TransportSpec::Http(HttpTransport::resolve(desc, base_url)?))
            }
            TransportKind::Unknown => Err(McpError::unsupported(&desc.name, "unknown transport type")),
        }
    }

    /// Short name for logs
    pub fn kind(&self) -> TransportKind {
        match self {
            TransportSpec::Command(_) => TransportKind::Command,
            TransportSpec::Http(HttpTransport::Sse { .. }) => TransportKind::Sse,
            TransportSpec::Http(HttpTransport::Streamable { .. }) => TransportKind::Streamable,
        }
    }
}

/// Absolute URLs are used as-is; anything else is joined onto `base_url`.
fn resolve_url(server: &str, raw: &str, base_url: Option<&str>) -> McpResult<Url> {
    let raw = raw.trim();
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return Url::parse(raw)
            .map_err(|e| McpError::unsupported(server, format!("invalid url '{}': {}", raw, e)));
    }

    let base = base_url.ok_or_else(|| {
        McpError::unsupported(server, format!("relative url '{}' needs a base_url", raw))
    })?;
    Url::parse(base)
        .and_then(|b| b.join(raw))
        .map_err(|e| McpError::unsupported(server, format!("cannot resolve '{}' against '{}': {}", raw, base, e)))
}
