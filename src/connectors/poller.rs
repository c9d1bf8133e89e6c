// src/connectors/poller.rs
use crate::connectors::traits::PriceSource;
use crate::types::FeedEvent;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

/// Background task that fetches a snapshot right away and then once per interval.
///
/// A failed fetch is reported as `FeedEvent::Failed` and polling carries on. The task
/// stops when the receiver goes away, on `shutdown()`, or when the handle is dropped.
pub struct PricePoller {
    handle: JoinHandle<()>,
}

impl PricePoller {
    pub fn spawn(
        source: Arc<dyn PriceSource>,
        every: Duration,
        sender: mpsc::Sender<FeedEvent>,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!("Price poller started, interval {:?}", every);

            loop {
                ticker.tick().await;

                let event = match source.fetch_prices().await {
                    Ok(snapshot) => {
                        debug!(coins = snapshot.len(), "Price snapshot received");
                        FeedEvent::Prices(snapshot)
                    }
                    Err(e) => {
                        error!("Price fetch failed: {}", e);
                        FeedEvent::Failed(e.to_string())
                    }
                };

                if sender.send(event).await.is_err() {
                    info!("Price channel closed, poller stopping");
                    break;
                }
            }
        });

        Self { handle }
    }

    pub fn shutdown(self) {
        self.handle.abort();
    }
}

impl Drop for PricePoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
