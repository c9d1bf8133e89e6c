// src/config.rs

use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;

/// Which prior trade the threshold check compares against.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LastTradeLookup {
    /// Most recent trade for the coin.
    #[default]
    Latest,
    /// First stored trade for the coin (the oldest one).
    Earliest,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TradingParams {
    pub starting_balance: Decimal,
    /// Fixed USD notional for every trade.
    pub trade_amount: Decimal,
    pub fee_rate: Decimal,
    /// Minimum fractional price move since the reference trade (0.05 = 5%).
    pub threshold: Decimal,
    #[serde(default)]
    pub last_trade_lookup: LastTradeLookup,
}

impl TradingParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trade_amount <= Decimal::ZERO {
            return Err(ConfigError::Message(format!(
                "trading.trade_amount must be positive, got {}",
                self.trade_amount
            )));
        }
        if self.fee_rate.is_sign_negative() {
            return Err(ConfigError::Message(format!(
                "trading.fee_rate must not be negative, got {}",
                self.fee_rate
            )));
        }
        if self.threshold.is_sign_negative() {
            return Err(ConfigError::Message(format!(
                "trading.threshold must not be negative, got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedConfig {
    /// CoinGecko-compatible API root, used by the proxy.
    pub upstream_url: String,
    /// Where the desk finds the proxy.
    pub proxy_url: String,
    pub coins: Vec<String>,
    pub poll_interval_secs: u64,
}

impl FeedConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub feed: FeedConfig,
    pub trading: TradingParams,
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        let builder = Self::with_defaults(Config::builder())?
            .add_source(File::with_name("Settings").required(false))
            .add_source(Self::environment());

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.trading.validate()?;
        Ok(config)
    }

    // APP_TRADING__FEE_RATE=0.02, APP_FEED__COINS=bitcoin,dogecoin
    fn environment() -> Environment {
        Environment::with_prefix("APP")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("feed.coins")
    }

    fn with_defaults(
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        builder
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("feed.upstream_url", "https://api.coingecko.com")?
            .set_default("feed.proxy_url", "http://localhost:3000")?
            .set_default("feed.coins", vec!["bitcoin", "ethereum", "litecoin"])?
            .set_default("feed.poll_interval_secs", 60)?
            .set_default("trading.starting_balance", "1000")?
            .set_default("trading.trade_amount", "100")?
            .set_default("trading.fee_rate", "0.01")?
            .set_default("trading.threshold", "0.05")?
            .set_default("trading.last_trade_lookup", "latest")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn defaults_only() -> AppConfig {
        AppConfig::with_defaults(Config::builder())
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults_match_demo_constants() {
        let config = defaults_only();
        assert_eq!(config.trading.starting_balance, dec!(1000));
        assert_eq!(config.trading.trade_amount, dec!(100));
        assert_eq!(config.trading.fee_rate, dec!(0.01));
        assert_eq!(config.trading.threshold, dec!(0.05));
        assert_eq!(config.trading.last_trade_lookup, LastTradeLookup::Latest);
        assert_eq!(config.feed.coins, vec!["bitcoin", "ethereum", "litecoin"]);
        assert_eq!(config.feed.poll_interval(), Duration::from_secs(60));
        assert_eq!(config.server.port, 3000);
        assert!(config.trading.validate().is_ok());
    }

    #[test]
    fn test_override_lookup_mode() {
        let config: AppConfig = AppConfig::with_defaults(Config::builder())
            .unwrap()
            .set_override("trading.last_trade_lookup", "earliest")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.trading.last_trade_lookup, LastTradeLookup::Earliest);
    }

    #[test]
    fn test_environment_overrides_defaults() {
        let vars: config::Map<String, String> = [
            ("APP_TRADING__TRADE_AMOUNT", "250"),
            ("APP_TRADING__LAST_TRADE_LOOKUP", "earliest"),
            ("APP_FEED__COINS", "bitcoin,dogecoin"),
            ("APP_SERVER__PORT", "8080"),
            ("OTHER_SERVER__PORT", "9999"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config: AppConfig = AppConfig::with_defaults(Config::builder())
            .unwrap()
            .add_source(AppConfig::environment().source(Some(vars)))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.trading.trade_amount, dec!(250));
        assert_eq!(config.trading.last_trade_lookup, LastTradeLookup::Earliest);
        assert_eq!(config.feed.coins, vec!["bitcoin", "dogecoin"]);
        assert_eq!(config.server.port, 8080);
        // untouched keys keep their defaults
        assert_eq!(config.trading.fee_rate, dec!(0.01));
    }

    #[test]
    fn test_validate_rejects_bad_params() {
        let mut params = defaults_only().trading;
        params.trade_amount = Decimal::ZERO;
        assert!(params.validate().is_err());

        let mut params = defaults_only().trading;
        params.fee_rate = dec!(-0.01);
        assert!(params.validate().is_err());

        let mut params = defaults_only().trading;
        params.threshold = dec!(-1);
        assert!(params.validate().is_err());
    }
}
