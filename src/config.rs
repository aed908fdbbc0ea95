// =============================================================================
// Dashboard Configuration — JSON file with environment overrides
// =============================================================================
//
// All fields carry `#[serde(default)]` so a partial (or absent) file still
// yields a usable configuration. Environment variables win over the file.
// The configuration is read once at startup and never written back.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

pub const ENV_CONFIG_PATH: &str = "CANDLE_DASH_CONFIG";
pub const ENV_BIND_ADDR: &str = "CANDLE_DASH_BIND_ADDR";
pub const ENV_EXCHANGE_URL: &str = "CANDLE_DASH_EXCHANGE_URL";
pub const ENV_TIMEOUT_SECS: &str = "CANDLE_DASH_TIMEOUT_SECS";

pub const DEFAULT_CONFIG_PATH: &str = "candle_dash.json";

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_bind_addr() -> String {
    "0.0.0.0:8050".to_string()
}

fn default_exchange_url() -> String {
    "https://api.exchange.coinbase.com".to_string()
}

fn default_title() -> String {
    "Crypto Candles".to_string()
}

fn default_user_agent() -> String {
    concat!("candle-dash/", env!("CARGO_PKG_VERSION")).to_string()
}

// =============================================================================
// DashConfig
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashConfig {
    /// Address the HTTP server listens on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Base URL of the exchange REST API (no trailing slash).
    #[serde(default = "default_exchange_url")]
    pub exchange_url: String,

    /// Per-request timeout. `None` leaves the HTTP client's default in place.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Sent on every exchange request; the public API rejects anonymous
    /// clients.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Page heading.
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            exchange_url: default_exchange_url(),
            request_timeout_secs: None,
            user_agent: default_user_agent(),
            title: default_title(),
        }
    }
}

impl DashConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// A missing file is an error so the caller can fall back to defaults
    /// with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config from {}", path.display()))?;

        info!(
            path = %path.display(),
            exchange_url = %config.exchange_url,
            "dashboard config loaded"
        );

        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, keyed by the `CANDLE_DASH_*` variable
    /// names. Blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(addr) = get(ENV_BIND_ADDR) {
            self.bind_addr = addr.trim().to_string();
        }
        if let Some(url) = get(ENV_EXCHANGE_URL) {
            self.exchange_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(secs) = get(ENV_TIMEOUT_SECS) {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("{ENV_TIMEOUT_SECS} must be a whole number of seconds"))?;
            self.request_timeout_secs = (secs > 0).then_some(secs);
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = DashConfig::default();
        assert_eq!(cfg.bind_addr, "0.0.0.0:8050");
        assert_eq!(cfg.exchange_url, "https://api.exchange.coinbase.com");
        assert!(cfg.request_timeout_secs.is_none());
        assert!(cfg.user_agent.starts_with("candle-dash/"));
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: DashConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, DashConfig::default());
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "bind_addr": "127.0.0.1:9000", "request_timeout_secs": 5 }"#;
        let cfg: DashConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.bind_addr, "127.0.0.1:9000");
        assert_eq!(cfg.request_timeout_secs, Some(5));
        assert_eq!(cfg.exchange_url, "https://api.exchange.coinbase.com");
    }

    #[test]
    fn load_missing_file_is_an_error() {
        assert!(DashConfig::load("/definitely/not/here/candle_dash.json").is_err());
    }

    #[test]
    fn env_overrides_win() {
        let env: HashMap<&str, &str> = [
            (ENV_BIND_ADDR, "127.0.0.1:1234"),
            (ENV_EXCHANGE_URL, "http://localhost:9999/"),
            (ENV_TIMEOUT_SECS, "7"),
        ]
        .into_iter()
        .collect();

        let mut cfg = DashConfig::default();
        cfg.apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(cfg.bind_addr, "127.0.0.1:1234");
        assert_eq!(cfg.exchange_url, "http://localhost:9999");
        assert_eq!(cfg.request_timeout_secs, Some(7));
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut cfg = DashConfig::default();
        cfg.apply_overrides(|_| Some("  ".to_string())).unwrap();
        assert_eq!(cfg, DashConfig::default());
    }

    #[test]
    fn bad_timeout_is_rejected() {
        let mut cfg = DashConfig::default();
        let res = cfg.apply_overrides(|k| (k == ENV_TIMEOUT_SECS).then(|| "soon".to_string()));
        assert!(res.is_err());
    }
}
