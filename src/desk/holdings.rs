// src/desk/holdings.rs
use rust_decimal::Decimal;
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OverrideError {
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid data format")]
    InvalidFormat,
}

/// A user-supplied holdings snapshot: a non-empty `coin -> number` JSON object.
///
/// Installed wholesale by `TradeDesk::replace_holdings`. No check is made against
/// balance or history, and negative quantities are accepted as typed.
#[derive(Debug, Clone, PartialEq)]
pub struct HoldingsOverride(BTreeMap<String, Decimal>);

impl HoldingsOverride {
    pub fn parse(input: &str) -> Result<Self, OverrideError> {
        let value: Value = serde_json::from_str(input)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, OverrideError> {
        match value {
            Value::Object(map) if !map.is_empty() => Self::from_map(map),
            _ => Err(OverrideError::InvalidFormat),
        }
    }

    fn from_map(map: Map<String, Value>) -> Result<Self, OverrideError> {
        let mut holdings = BTreeMap::new();
        for (coin, value) in map {
            let quantity = match value {
                Value::Number(n) => number_to_decimal(&n)?,
                _ => return Err(OverrideError::InvalidFormat),
            };
            holdings.insert(coin, quantity);
        }
        Ok(Self(holdings))
    }

    pub fn into_inner(self) -> BTreeMap<String, Decimal> {
        self.0
    }
}

fn number_to_decimal(n: &Number) -> Result<Decimal, OverrideError> {
    let text = n.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| OverrideError::InvalidFormat)
}
