// src/desk/engine.rs
use crate::config::TradingParams;
use crate::connectors::messages::{price_of, PriceSnapshot};
use crate::desk::account::AccountState;
use crate::desk::eligibility::{self, TradeRejection};
use crate::desk::executor;
use crate::desk::holdings::HoldingsOverride;
use crate::types::{Side, Trade, TradeRequest};
use tracing::{info, warn};

/// Owns one simulated account and runs trade requests against it.
///
/// Each request is evaluated and then either fully installed or dropped; there is
/// no pending state. Callers that share a desk across tasks must serialize access.
pub struct TradeDesk {
    params: TradingParams,
    state: AccountState,
}

impl TradeDesk {
    pub fn new(params: TradingParams) -> Self {
        let state = AccountState::new(params.starting_balance);
        Self { params, state }
    }

    pub fn state(&self) -> &AccountState {
        &self.state
    }

    /// Builds a request at the latest known price for `coin`.
    pub fn request_for(coin: &str, action: Side, prices: &PriceSnapshot) -> Option<TradeRequest> {
        price_of(prices, coin).map(|price| TradeRequest::new(coin, action, price))
    }

    pub fn check(&self, request: &TradeRequest) -> Result<(), TradeRejection> {
        eligibility::evaluate(&self.state, request, &self.params)
    }

    pub fn can_trade(&self, request: &TradeRequest) -> bool {
        eligibility::is_eligible(&self.state, request, &self.params)
    }

    pub fn submit(&mut self, request: &TradeRequest) -> Result<Trade, TradeRejection> {
        let outcome = self.check(request).and_then(|()| {
            executor::apply_trade(
                &self.state,
                request,
                self.params.trade_amount,
                self.params.fee_rate,
            )
        });
        let (next, trade) = match outcome {
            Ok(filled) => filled,
            Err(reason) => {
                warn!(
                    coin = %request.coin,
                    action = %request.action,
                    price = %request.price,
                    "Trade rejected: {}",
                    reason
                );
                return Err(reason);
            }
        };
        self.state = next;

        info!(
            coin = %trade.coin,
            action = %trade.action,
            price = %trade.price,
            fee = %trade.fee,
            balance = %self.state.balance,
            "Paper {}: {} USD of {}",
            trade.action,
            trade.amount,
            trade.coin
        );
        Ok(trade)
    }

    /// Installs a user-supplied holdings map. Bypasses eligibility, fees and history.
    pub fn replace_holdings(&mut self, holdings: HoldingsOverride) {
        self.state = self.state.with_holdings(holdings);
        info!(coins = self.state.holdings.len(), "Holdings replaced from custom input");
    }
}
