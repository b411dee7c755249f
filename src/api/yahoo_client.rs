use crate::api::models::{ChartResponse, SearchResponse};
use crate::api::MarketApi;
use crate::config::config::ApiConfig;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

#[derive(Clone)]
pub struct YahooClient {
    base_url: String,
    lang: String,
    region: String,
    client: reqwest::Client,
}

impl YahooClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: config.yahoo_base.trim_end_matches('/').to_string(),
            lang: config.lang.clone(),
            region: config.region.clone(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl MarketApi for YahooClient {
    async fn search(&self, query: &str, region: &str) -> Result<SearchResponse> {
        let url = format!("{}/v1/finance/search", self.base_url);
        debug!(target: "search", "GET {} q={} region={}", url, query, region);

        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("region", region)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("Search API error: HTTP {}", response.status()));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .context("Malformed search response")?;
        Ok(parsed)
    }

    async fn chart(&self, symbol: &str, interval: &str, range: &str) -> Result<ChartResponse> {
        let url = format!(
            "{}/v8/finance/chart/{}",
            self.base_url,
            urlencoding::encode(symbol)
        );
        debug!(target: "quote", "GET {} interval={} range={}", url, interval, range);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("region", self.region.as_str()),
                ("lang", self.lang.as_str()),
                ("interval", interval),
                ("range", range),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Chart API error for {}: HTTP {}",
                symbol,
                response.status()
            ));
        }

        let parsed: ChartResponse = response
            .json()
            .await
            .with_context(|| format!("Malformed chart response for {symbol}"))?;
        Ok(parsed)
    }
}
