// src/connectors/mod.rs
pub mod coingecko;
pub mod messages;
pub mod poller;
pub mod proxy;
pub mod traits;
