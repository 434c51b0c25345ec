use std::fmt;

use url::Url;

/// Registered port for IRC over TLS, used whenever a spec omits the port.
pub const DEFAULT_PORT: &str = "6697";

/// Prefix on a port substring signalling a TLS connection.
const SECURE_MARKER: char = '+';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The spec parsed as a URI, but its scheme is not one of ours.
    UnknownScheme(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnknownScheme(spec) => write!(f, "invalid endpoint: {}", spec),
        }
    }
}

impl std::error::Error for ParseError {}

/// A resolved network destination: host, port and whether to use TLS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    /// Port as a string, with any secure marker already stripped.
    pub port: String,
    pub secure: bool,
}

impl Endpoint {
    /// Joins host and port into a bindable address string.
    ///
    /// IPv6 hosts are bracketed; an empty host means "all interfaces".
    pub fn authority(&self) -> String {
        let host = if self.host.is_empty() {
            "0.0.0.0"
        } else {
            &self.host
        };

        if host.contains(':') {
            format!("[{}]:{}", host, self.port)
        } else {
            format!("{}:{}", host, self.port)
        }
    }
}

/// Parses a textual endpoint spec into an [`Endpoint`].
///
/// Three strategies are tried in order, first match wins:
///
/// 1. **URI form**: `ircs://host[:port]`, `irc://host[:port]` (both TLS) or
///    `irc+insecure://host[:port]`. Any other scheme is a parse error; it
///    does not fall through to the remaining strategies.
/// 2. **host:port form**: a bracket-aware split. A leading `+` on the port
///    means TLS and is stripped before the port is stored.
/// 3. **Bare host fallback**: the whole spec is the host, the port defaults
///    to 6697 and the connection is TLS. This never fails.
pub fn parse(spec: &str) -> Result<Endpoint, ParseError> {
    if let Some(result) = parse_uri(spec) {
        return result;
    }

    if let Some((host, port)) = split_host_port(spec) {
        let (port, secure) = match port.strip_prefix(SECURE_MARKER) {
            Some(stripped) => (stripped.to_string(), true),
            None => (port, false),
        };
        return Ok(Endpoint { host, port, secure });
    }

    Ok(Endpoint {
        host: spec.to_string(),
        port: DEFAULT_PORT.to_string(),
        secure: true,
    })
}

/// URI strategy. `None` means the spec is not a URI and the next strategy
/// should run; `Some(Err(..))` is a terminal scheme error.
fn parse_uri(spec: &str) -> Option<Result<Endpoint, ParseError>> {
    let uri = Url::parse(spec).ok()?;

    let secure = match uri.scheme() {
        "irc" | "ircs" => true,
        "irc+insecure" => false,
        _ => return Some(Err(ParseError::UnknownScheme(spec.to_string()))),
    };

    let host = uri
        .host_str()
        .unwrap_or("")
        .trim_start_matches('[')
        .trim_end_matches(']')
        .to_string();

    let port = match uri.port() {
        Some(port) => port.to_string(),
        None => DEFAULT_PORT.to_string(),
    };

    Some(Ok(Endpoint { host, port, secure }))
}

/// Splits `host:port`, honoring `[v6]:port` brackets. Returns `None` on any
/// malformed input so the caller can fall through to the bare-host strategy.
fn split_host_port(spec: &str) -> Option<(String, String)> {
    if let Some(rest) = spec.strip_prefix('[') {
        let (host, rest) = rest.split_once(']')?;
        let port = rest.strip_prefix(':')?;
        if port.contains(':') {
            return None;
        }
        return Some((host.to_string(), port.to_string()));
    }

    let (host, port) = spec.rsplit_once(':')?;
    if host.contains(':') || port.contains('[') || port.contains(']') {
        return None;
    }
    Some((host.to_string(), port.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_uri_with_default_port() {
        let endpoint = parse("ircs://irc.example.org").unwrap();

        assert_eq!(endpoint.host, "irc.example.org");
        assert_eq!(endpoint.port, "6697");
        assert!(endpoint.secure);
    }

    #[test]
    fn authority_brackets_ipv6() {
        let endpoint = parse("[::1]:+7000").unwrap();

        assert_eq!(endpoint.authority(), "[::1]:7000");
    }
}
