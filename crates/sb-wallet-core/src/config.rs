use sb_api_types::PoolId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Wallet keys looked up in the host namespace, in display order.
pub const KNOWN_WALLETS: [&str; 6] = ["nami", "eternl", "flint", "lace", "gero", "typhon"];

/// Pool every delegation from this page targets.
pub const DEFAULT_POOL_ID: &str = "pool1pu5jlj4q9w9jlxeu370a3c9myx47md5j5m2str0naunn2q3lkdy";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodecSource {
    /// The page-loaded serialization library global.
    Csl,
    /// The built-in Rust address codec; ready immediately.
    Native,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub known_wallets: Vec<String>,
    pub poll_interval_ms: u64,
    pub max_poll_attempts: u32,
    pub codec_timeout_ms: u64,
    pub codec_source: CodecSource,
    pub codec_global: String,
    pub codec_event: String,
    pub pool_id: String,
    pub backend_url: Option<String>,
    /// `tracing` filter directive for hosts that install a subscriber.
    pub log_filter: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            known_wallets: KNOWN_WALLETS.iter().map(|k| (*k).to_owned()).collect(),
            poll_interval_ms: 500,
            max_poll_attempts: 10,
            codec_timeout_ms: 10_000,
            codec_source: CodecSource::Csl,
            codec_global: "CSL".to_owned(),
            codec_event: "csl-loaded".to_owned(),
            pool_id: DEFAULT_POOL_ID.to_owned(),
            backend_url: None,
            log_filter: "info".to_owned(),
        }
    }
}

impl BridgeConfig {
    /// Parse overrides; missing fields keep their defaults.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn codec_timeout(&self) -> Duration {
        Duration::from_millis(self.codec_timeout_ms)
    }

    pub fn pool(&self) -> PoolId {
        PoolId(self.pool_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            BridgeConfig::from_json(r#"{"poll_interval_ms":50,"codec_source":"native"}"#).unwrap();
        assert_eq!(config.poll_interval(), Duration::from_millis(50));
        assert_eq!(config.codec_source, CodecSource::Native);
        assert_eq!(config.known_wallets, KNOWN_WALLETS);
        assert_eq!(config.codec_event, "csl-loaded");
        assert_eq!(config.pool().0, DEFAULT_POOL_ID);
    }
}
