// src/desk/executor.rs
use crate::desk::account::AccountState;
use crate::desk::eligibility::TradeRejection;
use crate::types::{Side, Trade, TradeRequest};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Applies a simulated trade, stamping it with the current time.
pub fn apply_trade(
    state: &AccountState,
    request: &TradeRequest,
    amount: Decimal,
    fee_rate: Decimal,
) -> Result<(AccountState, Trade), TradeRejection> {
    apply_trade_at(state, request, amount, fee_rate, Utc::now())
}

/// Computes the next account state for a trade of `amount` USD notional.
///
/// Balance moves by `amount + fee` in the direction of the trade: a buy pays it, a
/// sell receives it. The sell leg therefore credits the fee instead of deducting it;
/// this matches the demo's bookkeeping and is kept as is. Holdings move by
/// `amount / price` coins and the trade is appended to the end of history.
///
/// Does not check eligibility. Only a price the quantity cannot be derived from
/// (non-positive, or small enough to overflow) is refused.
pub fn apply_trade_at(
    state: &AccountState,
    request: &TradeRequest,
    amount: Decimal,
    fee_rate: Decimal,
    timestamp: DateTime<Utc>,
) -> Result<(AccountState, Trade), TradeRejection> {
    if request.price <= Decimal::ZERO {
        return Err(TradeRejection::InvalidPrice {
            price: request.price,
        });
    }

    let overflow = || TradeRejection::Overflow {
        coin: request.coin.clone(),
        price: request.price,
    };

    let fee = amount.checked_mul(fee_rate).ok_or_else(overflow)?;
    let cash_leg = amount.checked_add(fee).ok_or_else(overflow)?;
    let balance = match request.action {
        Side::Buy => state.balance.checked_sub(cash_leg),
        Side::Sell => state.balance.checked_add(cash_leg),
    }
    .ok_or_else(overflow)?;

    let quantity = amount
        .checked_div(request.price)
        .and_then(|q| q.checked_mul(request.action.direction()))
        .ok_or_else(overflow)?;
    let held = state
        .holding(&request.coin)
        .checked_add(quantity)
        .ok_or_else(overflow)?;
    let mut holdings = state.holdings.clone();
    holdings.insert(request.coin.clone(), held);

    let trade = Trade {
        coin: request.coin.clone(),
        action: request.action,
        price: request.price,
        amount,
        fee,
        timestamp,
    };

    let mut history = Vec::with_capacity(state.history.len() + 1);
    history.extend_from_slice(&state.history);
    history.push(trade.clone());

    Ok((
        AccountState {
            balance,
            holdings,
            history,
        },
        trade,
    ))
}
