// src/desk/account.rs
use crate::config::LastTradeLookup;
use crate::desk::holdings::HoldingsOverride;
use crate::types::Trade;
use rust_decimal::Decimal;
use serde::{ser::SerializeMap, Serialize, Serializer};
use std::collections::BTreeMap;

/// Simulated account: USD balance, per-coin quantities and the append-only trade log.
///
/// Transitions never mutate a shared instance; they return the next state, which the
/// owner installs. `balance` and `holdings` are not sign-checked here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountState {
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    #[serde(serialize_with = "quantities_as_numbers")]
    pub holdings: BTreeMap<String, Decimal>,
    pub history: Vec<Trade>,
}

#[derive(Serialize)]
struct Quantity(#[serde(with = "rust_decimal::serde::float")] Decimal);

fn quantities_as_numbers<S: Serializer>(
    holdings: &BTreeMap<String, Decimal>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(holdings.len()))?;
    for (coin, quantity) in holdings {
        map.serialize_entry(coin, &Quantity(*quantity))?;
    }
    map.end()
}

impl AccountState {
    pub fn new(starting_balance: Decimal) -> Self {
        Self {
            balance: starting_balance,
            holdings: BTreeMap::new(),
            history: Vec::new(),
        }
    }

    /// Quantity held for `coin`; a coin with no entry is treated as zero.
    pub fn holding(&self, coin: &str) -> Decimal {
        self.holdings.get(coin).copied().unwrap_or(Decimal::ZERO)
    }

    /// The prior trade the threshold check measures against.
    pub fn reference_trade(&self, coin: &str, lookup: LastTradeLookup) -> Option<&Trade> {
        match lookup {
            LastTradeLookup::Latest => self.history.iter().rev().find(|t| t.coin == coin),
            LastTradeLookup::Earliest => self.history.iter().find(|t| t.coin == coin),
        }
    }

    /// Replaces the whole holdings map. Balance and history are carried over untouched,
    /// so nothing about the override shows up in the trade log.
    pub fn with_holdings(&self, holdings: HoldingsOverride) -> Self {
        Self {
            balance: self.balance,
            holdings: holdings.into_inner(),
            history: self.history.clone(),
        }
    }
}
