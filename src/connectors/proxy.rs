// src/connectors/proxy.rs
use crate::connectors::messages::PriceSnapshot;
use crate::connectors::traits::PriceSource;
use crate::error::FeedError;
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

/// Reads prices through our own backend (`GET /v1/price`) instead of hitting
/// the upstream API directly.
pub struct ProxyClient {
    http_client: Client,
    price_url: Url,
}

impl ProxyClient {
    pub fn new(proxy_url: &str) -> Result<Self, FeedError> {
        let price_url = Url::parse(proxy_url)?.join("/v1/price")?;
        Ok(Self {
            http_client: Client::new(),
            price_url,
        })
    }
}

#[async_trait]
impl PriceSource for ProxyClient {
    async fn fetch_prices(&self) -> Result<PriceSnapshot, FeedError> {
        let snapshot = self
            .http_client
            .get(self.price_url.clone())
            .send()
            .await?
            .error_for_status()?
            .json::<PriceSnapshot>()
            .await?;
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve_mock;
    use axum::{routing::get, Json, Router};
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[tokio::test]
    async fn test_reads_snapshot_from_proxy() {
        let app = Router::new().route(
            "/v1/price",
            get(|| async { Json(json!({"bitcoin": {"usd": 64000.5}})) }),
        );
        let addr = serve_mock(app).await;

        let client = ProxyClient::new(&format!("http://{}", addr)).unwrap();
        let snapshot = client.fetch_prices().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot["bitcoin"].usd, dec!(64000.5));
    }

    #[tokio::test]
    async fn test_unreachable_proxy_is_an_error() {
        // nothing listens on port 9 locally
        let client = ProxyClient::new("http://127.0.0.1:9").unwrap();
        assert!(client.fetch_prices().await.is_err());
    }
}
