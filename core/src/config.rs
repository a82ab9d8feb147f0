//! Probe configuration.
//!
//! Stored as camelCase JSON. Nothing is read from the environment; callers
//! decide where (and whether) a config file lives.

use std::net::{IpAddr, Ipv6Addr};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::{Error, Result};

/// Settings shared by every probe a prober performs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Host part of the bind address.
    ///
    /// Defaults to the IPv6 wildcard, which on a dual-stack host also
    /// covers every IPv4 interface. Where IPv6 is unavailable the prober
    /// falls back to `0.0.0.0`.
    #[serde(default = "default_bind_host", rename = "bindHost")]
    pub bind_host: IpAddr,
}

fn default_bind_host() -> IpAddr {
    IpAddr::V6(Ipv6Addr::UNSPECIFIED)
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            bind_host: default_bind_host(),
        }
    }
}

impl ProbeConfig {
    /// Probe on a specific local address instead of all interfaces.
    pub fn with_bind_host(bind_host: impl Into<IpAddr>) -> Self {
        Self {
            bind_host: bind_host.into(),
        }
    }

    /// Parse configuration from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        if json.trim().is_empty() {
            return Err(Error::Config("empty configuration document".to_string()));
        }
        Ok(serde_json::from_str(json)?)
    }

    /// Load configuration from disk.
    ///
    /// Returns default config if the file doesn't exist.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !fs::try_exists(path).await? {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).await?;
        Self::from_json(&contents)
    }

    /// Render the bind address string for `port`, IPv6 hosts bracketed.
    pub(crate) fn bind_address(&self, port: u64) -> String {
        match self.bind_host {
            IpAddr::V4(host) => format!("{host}:{port}"),
            IpAddr::V6(host) => format!("[{host}]:{port}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::net::Ipv4Addr;
    use tempfile::TempDir;

    #[test]
    fn test_default_binds_all_interfaces() {
        let config = ProbeConfig::default();
        assert_eq!(config.bind_host, IpAddr::V6(Ipv6Addr::UNSPECIFIED));
        assert_eq!(config.bind_address(8080), "[::]:8080");
    }

    #[test]
    fn test_ipv4_host_is_not_bracketed() {
        let config = ProbeConfig::with_bind_host(Ipv4Addr::UNSPECIFIED);
        assert_eq!(config.bind_address(8080), "0.0.0.0:8080");
    }

    #[test]
    fn test_ipv6_address_is_bracketed() {
        let config = ProbeConfig::with_bind_host(Ipv6Addr::LOCALHOST);
        assert_eq!(config.bind_address(443), "[::1]:443");
    }

    #[test]
    fn test_from_json() {
        let config = ProbeConfig::from_json(r#"{"bindHost": "127.0.0.1"}"#).unwrap();
        assert_eq!(config.bind_host, IpAddr::V4(Ipv4Addr::LOCALHOST));

        let config = ProbeConfig::from_json("{}").unwrap();
        assert_eq!(config, ProbeConfig::default());
    }

    #[test]
    fn test_from_json_rejects_bad_input() {
        let err = ProbeConfig::from_json(r#"{"bindHost": "not-an-ip"}"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
        assert_eq!(err.kind(), ErrorKind::Config);

        let err = ProbeConfig::from_json("  ").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_load_missing_file_returns_default() {
        let temp_dir = TempDir::new().unwrap();
        let config = ProbeConfig::load(temp_dir.path().join("probe.json"))
            .await
            .unwrap();
        assert_eq!(config, ProbeConfig::default());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("probe.json");
        std::fs::write(&path, r#"{"bindHost": "::1"}"#).unwrap();

        let config = ProbeConfig::load(&path).await.unwrap();
        assert_eq!(config.bind_host, IpAddr::V6(Ipv6Addr::LOCALHOST));
    }
}
