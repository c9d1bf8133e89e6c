// src/types.rs
use crate::connectors::messages::PriceSnapshot;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// +1 for buys, -1 for sells. Used for the holdings leg of a trade.
    pub fn direction(self) -> Decimal {
        match self {
            Side::Buy => Decimal::ONE,
            Side::Sell => Decimal::NEGATIVE_ONE,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

/// A proposed trade. `price` comes from the caller's latest snapshot and may be stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRequest {
    pub coin: String,
    pub action: Side,
    pub price: Decimal,
}

impl TradeRequest {
    pub fn new(coin: impl Into<String>, action: Side, price: Decimal) -> Self {
        Self {
            coin: coin.into(),
            action,
            price,
        }
    }
}

/// An executed simulated trade. Never mutated once appended to history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub coin: String,
    pub action: Side,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal, // USD notional
    #[serde(with = "rust_decimal::serde::float")]
    pub fee: Decimal,
    pub timestamp: DateTime<Utc>,
}

/// What the price poller hands to its consumer on every tick.
#[derive(Debug, Clone)]
pub enum FeedEvent {
    Prices(PriceSnapshot),
    Failed(String),
}
