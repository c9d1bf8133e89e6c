// src/server/mod.rs
use crate::config::AppConfig;
use crate::connectors::coingecko::CoinGeckoClient;
use crate::connectors::messages::PriceSnapshot;
use crate::connectors::poller::PricePoller;
use crate::connectors::traits::PriceSource;
use crate::desk::engine::TradeDesk;
use crate::types::FeedEvent;
use axum::{
    routing::{get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, RwLock};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

pub mod error;
pub mod handlers;

/// Shared state behind every handler.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<dyn PriceSource>,
    pub prices: Arc<RwLock<PriceSnapshot>>,
    pub desk: Arc<Mutex<TradeDesk>>,
}

impl AppState {
    pub fn new(upstream: Arc<dyn PriceSource>, desk: TradeDesk) -> Self {
        Self {
            upstream,
            prices: Arc::new(RwLock::new(PriceSnapshot::new())),
            desk: Arc::new(Mutex::new(desk)),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/v1/health", get(|| async { "OK" }))
        .route("/v1/price", get(handlers::get_prices))
        .route("/v1/account", get(handlers::get_account))
        .route("/v1/trade", post(handlers::post_trade))
        .route("/v1/holdings", put(handlers::put_holdings))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Copies poller snapshots into the cache used for trade pricing.
async fn keep_cache_warm(prices: Arc<RwLock<PriceSnapshot>>, mut rx: mpsc::Receiver<FeedEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            FeedEvent::Prices(snapshot) => *prices.write().await = snapshot,
            FeedEvent::Failed(reason) => warn!("Keeping stale prices: {}", reason),
        }
    }
}

pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    let upstream: Arc<dyn PriceSource> = Arc::new(CoinGeckoClient::new(
        &config.feed.upstream_url,
        config.feed.coins.clone(),
    )?);
    let state = AppState::new(upstream.clone(), TradeDesk::new(config.trading.clone()));

    let (feed_tx, feed_rx) = mpsc::channel(16);
    let poller = PricePoller::spawn(upstream, config.feed.poll_interval(), feed_tx);
    tokio::spawn(keep_cache_warm(state.prices.clone(), feed_rx));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Price proxy listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    poller.shutdown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LastTradeLookup, TradingParams};
    use crate::connectors::messages::PriceQuote;
    use crate::error::FeedError;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use serde_json::Value;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;

    struct FixedSource {
        down: AtomicBool,
    }

    #[async_trait]
    impl PriceSource for FixedSource {
        async fn fetch_prices(&self) -> Result<PriceSnapshot, FeedError> {
            if self.down.load(Ordering::SeqCst) {
                return Err(url::Url::parse("::").unwrap_err().into());
            }
            let mut snapshot = PriceSnapshot::new();
            snapshot.insert("bitcoin".into(), PriceQuote { usd: dec!(50000) });
            snapshot.insert("litecoin".into(), PriceQuote { usd: dec!(80) });
            Ok(snapshot)
        }
    }

    fn test_state() -> (AppState, Arc<FixedSource>) {
        let source = Arc::new(FixedSource {
            down: AtomicBool::new(false),
        });
        let desk = TradeDesk::new(TradingParams {
            starting_balance: dec!(1000),
            trade_amount: dec!(100),
            fee_rate: dec!(0.01),
            threshold: dec!(0.05),
            last_trade_lookup: LastTradeLookup::Latest,
        });
        (AppState::new(source.clone(), desk), source)
    }

    async fn call(state: &AppState, request: Request<Body>) -> (StatusCode, Value) {
        let response = router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::String(
                String::from_utf8_lossy(&bytes).into_owned(),
            ))
        };
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (state, _) = test_state();
        let (status, body) = call(&state, get("/v1/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::String("OK".into()));
    }

    #[tokio::test]
    async fn test_price_proxy_returns_numbers_and_fills_cache() {
        let (state, _) = test_state();
        let (status, body) = call(&state, get("/v1/price")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["bitcoin"]["usd"].as_f64(), Some(50000.0));
        assert_eq!(body["litecoin"]["usd"].as_f64(), Some(80.0));
        assert_eq!(state.prices.read().await.len(), 2);
    }

    #[tokio::test]
    async fn test_price_proxy_upstream_failure() {
        let (state, source) = test_state();
        source.down.store(true, Ordering::SeqCst);

        let (status, body) = call(&state, get("/v1/price")).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_trade_needs_known_price() {
        let (state, _) = test_state();
        let (status, _) = call(
            &state,
            json_request("POST", "/v1/trade", r#"{"coin":"bitcoin","action":"buy"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_trade_flow() {
        let (state, _) = test_state();
        call(&state, get("/v1/price")).await;

        let (status, trade) = call(
            &state,
            json_request("POST", "/v1/trade", r#"{"coin":"bitcoin","action":"buy"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(trade["action"], "buy");
        assert_eq!(trade["coin"], "bitcoin");

        // same price again is below the threshold
        let (status, body) = call(
            &state,
            json_request("POST", "/v1/trade", r#"{"coin":"bitcoin","action":"buy"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Trade not possible or profitable");
        assert_eq!(body["reason"]["kind"], "below_threshold");

        let desk = state.desk.lock().await;
        assert_eq!(desk.state().balance, dec!(899));
        assert_eq!(desk.state().history.len(), 1);
    }

    #[tokio::test]
    async fn test_holdings_override() {
        let (state, _) = test_state();

        let (status, body) = call(
            &state,
            json_request("PUT", "/v1/holdings", r#"{"litecoin": 2}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["history"].as_array().unwrap().is_empty());

        let (status, body) = call(&state, json_request("PUT", "/v1/holdings", "[]")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid data format");

        let desk = state.desk.lock().await;
        assert_eq!(desk.state().holding("litecoin"), Decimal::from(2));
    }

    #[tokio::test]
    async fn test_sell_after_override() {
        let (state, _) = test_state();
        call(&state, get("/v1/price")).await;
        call(&state, json_request("PUT", "/v1/holdings", r#"{"litecoin": 2}"#)).await;

        let (status, _) = call(
            &state,
            json_request("POST", "/v1/trade", r#"{"coin":"litecoin","action":"sell"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, account) = call(&state, get("/v1/account")).await;
        assert_eq!(account["history"].as_array().unwrap().len(), 1);
        assert_eq!(account["balance"].as_f64(), Some(1101.0));
        assert_eq!(account["history"][0]["amount"].as_f64(), Some(100.0));
        let desk = state.desk.lock().await;
        assert_eq!(desk.state().balance, dec!(1101));
        assert_eq!(desk.state().holding("litecoin"), dec!(0.75));
    }
}
