// src/connectors/traits.rs
use crate::connectors::messages::PriceSnapshot;
use crate::error::FeedError;
use async_trait::async_trait;

/// Anything that can produce a `coin -> USD` snapshot on demand.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_prices(&self) -> Result<PriceSnapshot, FeedError>;
}
