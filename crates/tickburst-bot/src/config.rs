//! Application configuration.

use crate::error::{AppError, AppResult};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;
use tickburst_exec::{BurstConfig, RequestConfig};
use tickburst_feed::TickSourceConfig;

/// Environment variable overriding the config-file API key.
pub const ENV_API_KEY: &str = "TICKBURST_API_KEY";
/// Environment variable overriding the config-file API secret.
pub const ENV_API_SECRET: &str = "TICKBURST_API_SECRET";

/// Application configuration, loaded from a TOML file.
///
/// Every field has a reference default, so an empty file is a valid
/// testnet configuration apart from the credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Book-ticker stream URL.
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    /// REST base URL, ending in a slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Exchange API key. Overridable via `TICKBURST_API_KEY`.
    #[serde(default)]
    pub api_key: String,
    /// Exchange API secret. Overridable via `TICKBURST_API_SECRET`.
    #[serde(default)]
    pub api_secret: String,
    /// Trading symbol.
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// Signing algorithm name; unknown names abort startup.
    #[serde(default = "default_sign_algo")]
    pub sign_algo: String,
    /// Request validity window in milliseconds.
    #[serde(default = "default_recv_window_ms")]
    pub recv_window_ms: u64,
    /// Order quantity per burst unit.
    #[serde(default = "default_quantity")]
    pub quantity: Decimal,
    /// Number of burst rounds.
    #[serde(default = "default_rounds")]
    pub rounds: u32,
    /// Orders per side per round.
    #[serde(default = "default_orders_per_side")]
    pub orders_per_side: u32,
    /// Buy offset below mid.
    #[serde(default = "default_spread")]
    pub spread_down: Decimal,
    /// Sell offset above mid.
    #[serde(default = "default_spread")]
    pub spread_up: Decimal,
    /// Seconds to let resting orders sit before cancelling.
    #[serde(default = "default_dwell_secs")]
    pub dwell_secs: u64,
    /// Worker pool size for burst fan-out.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_ws_url() -> String {
    "wss://stream.binancefuture.com/ws/btcusdt@bookTicker".to_string()
}

fn default_base_url() -> String {
    "https://testnet.binancefuture.com/fapi/".to_string()
}

fn default_symbol() -> String {
    "BTCUSDT".to_string()
}

fn default_sign_algo() -> String {
    "sha256".to_string()
}

fn default_recv_window_ms() -> u64 {
    10_000
}

fn default_quantity() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

fn default_rounds() -> u32 {
    10
}

fn default_orders_per_side() -> u32 {
    50
}

fn default_spread() -> Decimal {
    Decimal::new(15, 2) // 0.15
}

fn default_dwell_secs() -> u64 {
    10
}

fn default_workers() -> usize {
    8
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str("").expect("empty config deserializes from defaults")
    }
}

impl AppConfig {
    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Apply credential overrides from the environment.
    pub fn apply_env_overrides(&mut self) {
        self.override_credentials(
            std::env::var(ENV_API_KEY).ok(),
            std::env::var(ENV_API_SECRET).ok(),
        );
    }

    fn override_credentials(&mut self, api_key: Option<String>, api_secret: Option<String>) {
        if let Some(key) = api_key {
            self.api_key = key;
        }
        if let Some(secret) = api_secret {
            self.api_secret = secret;
        }
    }

    /// Feed configuration.
    pub fn tick_source_config(&self) -> TickSourceConfig {
        TickSourceConfig {
            url: self.ws_url.clone(),
        }
    }

    /// Static request parameters.
    pub fn request_config(&self) -> RequestConfig {
        RequestConfig {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            symbol: self.symbol.clone(),
            recv_window_ms: self.recv_window_ms,
            quantity: self.quantity,
        }
    }

    /// Orchestrator knobs.
    pub fn burst_config(&self) -> BurstConfig {
        BurstConfig {
            rounds: self.rounds,
            orders_per_side: self.orders_per_side,
            spread_down: self.spread_down,
            spread_up: self.spread_up,
            dwell: Duration::from_secs(self.dwell_secs),
            workers: self.workers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults_match_reference_workload() {
        let config = AppConfig::default();
        assert_eq!(config.rounds, 10);
        assert_eq!(config.orders_per_side, 50);
        assert_eq!(config.spread_down, dec!(0.15));
        assert_eq!(config.spread_up, dec!(0.15));
        assert_eq!(config.dwell_secs, 10);
        assert_eq!(config.sign_algo, "sha256");
        assert_eq!(config.quantity, dec!(0.01));
        assert_eq!(config.symbol, "BTCUSDT");
        assert!(config.base_url.ends_with('/'));
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            symbol = "ETHUSDT"
            rounds = 2
            orders_per_side = 3
            quantity = "0.5"
            spread_down = "0.10"
            "#,
        )
        .unwrap();
        assert_eq!(config.symbol, "ETHUSDT");
        assert_eq!(config.rounds, 2);
        assert_eq!(config.orders_per_side, 3);
        assert_eq!(config.quantity, dec!(0.5));
        assert_eq!(config.spread_down, dec!(0.10));
        // Untouched fields keep their defaults.
        assert_eq!(config.spread_up, dec!(0.15));
        assert_eq!(config.dwell_secs, 10);
    }

    #[test]
    fn test_credential_overrides() {
        let mut config = AppConfig::default();
        config.api_key = "file-key".to_string();
        config.override_credentials(Some("env-key".to_string()), None);
        assert_eq!(config.api_key, "env-key");
        assert_eq!(config.api_secret, "");
    }

    #[test]
    fn test_burst_config_mapping() {
        let config = AppConfig::default();
        let burst = config.burst_config();
        assert_eq!(burst.rounds, 10);
        assert_eq!(burst.dwell, Duration::from_secs(10));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = AppConfig::from_file("/nonexistent/tickburst.toml").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
