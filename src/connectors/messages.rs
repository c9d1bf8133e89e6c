// src/connectors/messages.rs
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One entry of the `/simple/price` payload: `{"usd": 50000.12}`.
/// Serialized back as a JSON number so the proxy output matches the upstream shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    #[serde(with = "rust_decimal::serde::float")]
    pub usd: Decimal,
}

/// coin id (lowercase, e.g. "bitcoin") -> quote
pub type PriceSnapshot = BTreeMap<String, PriceQuote>;

/// Latest known USD price for `coin`, if the snapshot has one.
pub fn price_of(snapshot: &PriceSnapshot, coin: &str) -> Option<Decimal> {
    snapshot.get(coin).map(|q| q.usd)
}
