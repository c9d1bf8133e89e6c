// src/server/handlers.rs
use crate::connectors::messages::PriceSnapshot;
use crate::desk::account::AccountState;
use crate::desk::engine::TradeDesk;
use crate::desk::holdings::HoldingsOverride;
use crate::server::error::AppError;
use crate::server::AppState;
use crate::types::{Side, Trade};
use axum::{extract::State, Json};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct TradeBody {
    pub coin: String,
    pub action: Side,
}

/// Forwards one request to the upstream feed and refreshes the cache with the result.
pub async fn get_prices(State(state): State<AppState>) -> Result<Json<PriceSnapshot>, AppError> {
    let snapshot = state.upstream.fetch_prices().await?;
    *state.prices.write().await = snapshot.clone();
    Ok(Json(snapshot))
}

pub async fn get_account(State(state): State<AppState>) -> Json<AccountState> {
    let desk = state.desk.lock().await;
    Json(desk.state().clone())
}

/// Trades at the latest cached price. The desk lock covers the whole
/// check-then-apply step, so concurrent requests run one at a time.
pub async fn post_trade(
    State(state): State<AppState>,
    Json(body): Json<TradeBody>,
) -> Result<Json<Trade>, AppError> {
    let request = {
        let prices = state.prices.read().await;
        TradeDesk::request_for(&body.coin, body.action, &prices)
    }
    .ok_or_else(|| AppError::UnknownCoin(body.coin.clone()))?;

    let mut desk = state.desk.lock().await;
    let trade = desk.submit(&request)?;
    Ok(Json(trade))
}

/// Raw body so malformed JSON gets the same message path as a bad shape.
pub async fn put_holdings(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<AccountState>, AppError> {
    let holdings = HoldingsOverride::parse(&body)?;
    let mut desk = state.desk.lock().await;
    desk.replace_holdings(holdings);
    Ok(Json(desk.state().clone()))
}
