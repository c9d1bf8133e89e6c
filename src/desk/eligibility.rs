// src/desk/eligibility.rs
use crate::config::TradingParams;
use crate::desk::account::AccountState;
use crate::types::{Side, TradeRequest};
use crate::utils::precision::fractional_change;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

/// Why a trade request was turned down. Not an error condition, just the
/// reason behind a `false` eligibility result.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TradeRejection {
    #[error("price must be positive, got {price}")]
    InvalidPrice {
        #[serde(with = "rust_decimal::serde::float")]
        price: Decimal,
    },

    #[error("balance {balance} is below the trade amount {required}")]
    InsufficientBalance {
        #[serde(with = "rust_decimal::serde::float")]
        balance: Decimal,
        #[serde(with = "rust_decimal::serde::float")]
        required: Decimal,
    },

    #[error("holdings worth {value} are below the trade amount {required}")]
    InsufficientHoldings {
        #[serde(with = "rust_decimal::serde::float")]
        value: Decimal,
        #[serde(with = "rust_decimal::serde::float")]
        required: Decimal,
    },

    #[error("price moved {change} since the last {coin} trade, threshold is {threshold}")]
    BelowThreshold {
        coin: String,
        #[serde(with = "rust_decimal::serde::float")]
        change: Decimal,
        #[serde(with = "rust_decimal::serde::float")]
        threshold: Decimal,
    },

    #[error("{coin} trade at {price} is out of range for the account")]
    Overflow {
        coin: String,
        #[serde(with = "rust_decimal::serde::float")]
        price: Decimal,
    },
}

/// Runs the funds check for the side, then the price-move threshold against the
/// reference prior trade for the coin. A coin with no prior trade skips the threshold.
pub fn evaluate(
    state: &AccountState,
    request: &TradeRequest,
    params: &TradingParams,
) -> Result<(), TradeRejection> {
    if request.price <= Decimal::ZERO {
        return Err(TradeRejection::InvalidPrice {
            price: request.price,
        });
    }

    let required = params.trade_amount;
    match request.action {
        Side::Buy => {
            if state.balance < required {
                return Err(TradeRejection::InsufficientBalance {
                    balance: state.balance,
                    required,
                });
            }
        }
        Side::Sell => {
            let value = state.holding(&request.coin).saturating_mul(request.price);
            if value < required {
                return Err(TradeRejection::InsufficientHoldings { value, required });
            }
        }
    }

    if let Some(last) = state.reference_trade(&request.coin, params.last_trade_lookup) {
        if let Some(change) = fractional_change(request.price, last.price) {
            if change < params.threshold {
                return Err(TradeRejection::BelowThreshold {
                    coin: request.coin.clone(),
                    change,
                    threshold: params.threshold,
                });
            }
        }
    }

    Ok(())
}

pub fn is_eligible(state: &AccountState, request: &TradeRequest, params: &TradingParams) -> bool {
    evaluate(state, request, params).is_ok()
}
