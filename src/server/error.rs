// src/server/error.rs
use crate::desk::eligibility::TradeRejection;
use crate::desk::holdings::OverrideError;
use crate::error::FeedError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Upstream price feed error: {0}")]
    Upstream(#[from] FeedError),
    #[error("Invalid holdings: {0}")]
    InvalidHoldings(#[from] OverrideError),
    #[error("Trade rejected: {0}")]
    Rejected(#[from] TradeRejection),
    #[error("No price known for coin: {0}")]
    UnknownCoin(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Upstream(feed_err) => {
                tracing::error!(error = %feed_err, "Upstream price feed error.");
                (
                    StatusCode::BAD_GATEWAY,
                    json!({ "error": "Failed to fetch prices from upstream" }),
                )
            }
            AppError::InvalidHoldings(err) => {
                (StatusCode::BAD_REQUEST, json!({ "error": err.to_string() }))
            }
            AppError::Rejected(reason) => (
                StatusCode::CONFLICT,
                json!({ "error": "Trade not possible or profitable", "reason": reason }),
            ),
            AppError::UnknownCoin(coin) => (
                StatusCode::NOT_FOUND,
                json!({ "error": format!("No price known for coin: {}", coin) }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
