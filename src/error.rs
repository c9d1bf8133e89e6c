// src/error.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Invalid feed URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Failed to encode query: {0}")]
    Query(#[from] serde_urlencoded::ser::Error),

    #[error("Price request failed: {0}")]
    Http(#[from] reqwest::Error),
}
