//! Market data access
//!
//! The resolver, quote fetcher and chart all talk to the market through the
//! [`MarketApi`] trait so the network can be swapped out in tests.

pub mod models;
pub mod yahoo_client;

use anyhow::Result;
use async_trait::async_trait;

pub use models::{ChartResponse, SearchQuote, SearchResponse};
pub use yahoo_client::YahooClient;

#[async_trait]
pub trait MarketApi: Send + Sync {
    /// Free-text ticker search scoped to a region
    async fn search(&self, query: &str, region: &str) -> Result<SearchResponse>;

    /// Chart payload (meta + series) for one symbol
    async fn chart(&self, symbol: &str, interval: &str, range: &str) -> Result<ChartResponse>;
}
