//! Upstream target rotation
//!
//! This module holds the fixed list of upstream servers and the rotating
//! cursor that selects the next one for each accepted connection.

use std::fmt;

use anyhow::{Context, Result};
use tokio::sync::Mutex;

use crate::endpoint::{self, Endpoint};

/// An upstream server in the display form sent to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamTarget {
    /// Hostname clients should reconnect to
    pub host: String,

    /// Port string, `+`-prefixed when the connection should use TLS
    pub port: String,
}

impl UpstreamTarget {
    /// Re-encodes a parsed endpoint for redirection use.
    pub fn new(endpoint: Endpoint) -> Self {
        let port = if endpoint.secure {
            format!("+{}", endpoint.port)
        } else {
            endpoint.port
        };

        Self {
            host: endpoint.host,
            port,
        }
    }
}

impl fmt::Display for UpstreamTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Pool of upstream targets with a rotating dispatch cursor.
///
/// The target list is fixed after construction; the cursor is the only
/// mutable state and always stays within `[0, len)`.
#[derive(Debug)]
pub struct RedirectPool {
    targets: Vec<UpstreamTarget>,
    cursor: Mutex<usize>,
}

impl RedirectPool {
    /// Creates a pool from already-built targets.
    ///
    /// Fails on an empty list: a redirector with nowhere to send clients
    /// must not start.
    pub fn new(targets: Vec<UpstreamTarget>) -> Result<Self> {
        if targets.is_empty() {
            anyhow::bail!("at least one upstream is required");
        }

        Ok(Self {
            targets,
            cursor: Mutex::new(0),
        })
    }

    /// Parses each spec and builds the pool, preserving the configured order.
    pub fn from_specs(specs: &[String]) -> Result<Self> {
        let mut targets = Vec::with_capacity(specs.len());
        for spec in specs {
            let parsed = endpoint::parse(spec)
                .with_context(|| format!("failed parsing upstream {:?}", spec))?;
            targets.push(UpstreamTarget::new(parsed));
        }

        Self::new(targets)
    }

    /// Selects the next target in round-robin order.
    ///
    /// The cursor read-and-advance happens under the lock, so no two callers
    /// can observe the same cursor value or skip one.
    pub async fn next_target(&self) -> UpstreamTarget {
        let mut cursor = self.cursor.lock().await;
        let target = self.targets[*cursor].clone();
        *cursor = (*cursor + 1) % self.targets.len();
        target
    }

    /// Number of configured targets.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
