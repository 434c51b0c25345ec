use std::fs;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Listen spec used when the config file omits one: all interfaces, TLS,
/// on the registered ircs port.
pub const DEFAULT_LISTEN: &str = ":+6697";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Endpoint specs of the servers clients are redirected to, in
    /// rotation order.
    #[serde(default)]
    pub upstreams: Vec<String>,

    /// TLS material for the listening socket, required when the listen
    /// endpoint is secure.
    #[serde(default)]
    pub tls: Option<TlsConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TlsConfig {
    /// Path to the PEM certificate chain
    pub certificate: String,

    /// Path to the PEM private key
    pub private_key: String,
}

impl Config {
    /// Loads the configuration from the file named by `USHER_CONFIG`
    /// (default `usher.yaml`). `USHER_LISTEN` overrides the listen spec.
    pub fn load() -> Result<Self> {
        let path =
            std::env::var("USHER_CONFIG").unwrap_or_else(|_| "usher.yaml".to_string());

        let mut cfg = Self::from_file(&path)?;
        if let Ok(listen) = std::env::var("USHER_LISTEN") {
            cfg.listen = listen;
        }

        Ok(cfg)
    }

    pub fn from_file(path: &str) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed reading config file {:?}", path))?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("invalid configuration")
    }
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}
