// src/connectors/coingecko.rs
use crate::connectors::messages::PriceSnapshot;
use crate::connectors::traits::PriceSource;
use crate::error::FeedError;
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

const SIMPLE_PRICE_PATH: &str = "api/v3/simple/price";
const VS_CURRENCY: &str = "usd";

/// Upstream client for CoinGecko's `/simple/price` endpoint.
pub struct CoinGeckoClient {
    http_client: Client,
    base_url: Url,
    coins: Vec<String>,
}

impl CoinGeckoClient {
    pub fn new(base_url: &str, coins: Vec<String>) -> Result<Self, FeedError> {
        // trailing slash so join() appends instead of replacing the last segment
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Self {
            http_client: Client::new(),
            base_url: Url::parse(&base)?,
            coins,
        })
    }

    fn build_query(&self) -> Result<String, FeedError> {
        let params = [
            ("ids", self.coins.join(",")),
            ("vs_currencies", VS_CURRENCY.to_string()),
        ];
        Ok(serde_urlencoded::to_string(params)?)
    }

    pub fn endpoint(&self) -> Result<Url, FeedError> {
        let mut url = self.base_url.join(SIMPLE_PRICE_PATH)?;
        url.set_query(Some(&self.build_query()?));
        Ok(url)
    }
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    async fn fetch_prices(&self) -> Result<PriceSnapshot, FeedError> {
        let url = self.endpoint()?;
        debug!("Fetching upstream prices: {}", url);

        let snapshot = self
            .http_client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<PriceSnapshot>()
            .await?;
        Ok(snapshot)
    }
}
