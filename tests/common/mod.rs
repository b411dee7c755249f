//! Shared fakes for the integration tests

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use ticker_dash::api::{ChartResponse, MarketApi, SearchResponse};
use ticker_dash::orchestrator::chart::{ChartConfig, ChartFactory, ChartInstance, ChartSnapshot};

/// In-memory market: canned search hits and prices, with call recording
#[derive(Default)]
pub struct FakeMarketApi {
    searches: HashMap<String, Vec<(String, String)>>,
    search_delays: HashMap<String, Duration>,
    search_errors: HashSet<String>,
    prices: HashMap<String, f64>,
    missing_price: HashSet<String>,
    failing: HashSet<String>,
    chart_delay: Duration,
    chart_delays: HashMap<String, Duration>,
    pub search_calls: Mutex<Vec<String>>,
    pub chart_calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeMarketApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, query: &str, hits: &[(&str, &str)]) -> Self {
        self.searches.insert(
            query.to_string(),
            hits.iter()
                .map(|(name, symbol)| (name.to_string(), symbol.to_string()))
                .collect(),
        );
        self
    }

    pub fn with_search_delay(mut self, query: &str, ms: u64) -> Self {
        self.search_delays
            .insert(query.to_string(), Duration::from_millis(ms));
        self
    }

    /// Search request fails the way an HTTP 503 does
    pub fn with_search_error(mut self, query: &str) -> Self {
        self.search_errors.insert(query.to_string());
        self
    }

    pub fn with_price(mut self, symbol: &str, price: f64) -> Self {
        self.prices.insert(symbol.to_string(), price);
        self
    }

    /// Chart payload arrives but without regularMarketPrice
    pub fn with_missing_price(mut self, symbol: &str) -> Self {
        self.missing_price.insert(symbol.to_string());
        self
    }

    /// Chart request fails the way an HTTP 500 does
    pub fn with_server_error(mut self, symbol: &str) -> Self {
        self.failing.insert(symbol.to_string());
        self
    }

    pub fn with_chart_delay(mut self, ms: u64) -> Self {
        self.chart_delay = Duration::from_millis(ms);
        self
    }

    /// Delay only the chart requests for `symbol`
    pub fn with_symbol_delay(mut self, symbol: &str, ms: u64) -> Self {
        self.chart_delays
            .insert(symbol.to_string(), Duration::from_millis(ms));
        self
    }

    pub fn search_calls(&self) -> Vec<String> {
        self.search_calls.lock().unwrap().clone()
    }

    pub fn chart_calls(&self) -> Vec<String> {
        self.chart_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketApi for FakeMarketApi {
    async fn search(&self, query: &str, _region: &str) -> Result<SearchResponse> {
        self.search_calls.lock().unwrap().push(query.to_string());
        if let Some(delay) = self.search_delays.get(query) {
            tokio::time::sleep(*delay).await;
        }
        if self.search_errors.contains(query) {
            return Err(anyhow!("HTTP 503 Service Unavailable for {}", query));
        }

        let quotes: Vec<serde_json::Value> = self
            .searches
            .get(query)
            .map(|hits| {
                hits.iter()
                    .map(|(name, symbol)| serde_json::json!({ "shortname": name, "symbol": symbol }))
                    .collect()
            })
            .unwrap_or_default();
        Ok(serde_json::from_value(serde_json::json!({ "quotes": quotes }))?)
    }

    async fn chart(&self, symbol: &str, _interval: &str, _range: &str) -> Result<ChartResponse> {
        self.chart_calls.lock().unwrap().push(symbol.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let delay = self
            .chart_delays
            .get(symbol)
            .copied()
            .unwrap_or(self.chart_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(symbol) {
            return Err(anyhow!("HTTP 500 Internal Server Error for {}", symbol));
        }

        let meta = match self.prices.get(symbol) {
            Some(price) if !self.missing_price.contains(symbol) => serde_json::json!({
                "symbol": symbol,
                "regularMarketPrice": price,
                "previousClose": price - 10.0,
            }),
            _ => serde_json::json!({ "symbol": symbol }),
        };
        Ok(serde_json::from_value(serde_json::json!({
            "chart": { "result": [{
                "meta": meta,
                "timestamp": [1_700_000_000, 1_700_000_300],
                "indicators": { "quote": [{ "close": [1.0, 2.0] }] }
            }]}
        }))?)
    }
}

/// Chart lifecycle event recorded by [`RecordingChartFactory`]
#[derive(Debug, Clone, PartialEq)]
pub enum ChartEvent {
    Created { container: String, symbol: String },
    Released { container: String },
}

#[derive(Clone, Default)]
pub struct RecordingChartFactory {
    pub events: Arc<Mutex<Vec<ChartEvent>>>,
    pub live: Arc<AtomicUsize>,
    pub max_live: Arc<AtomicUsize>,
    pub fail: bool,
}

impl RecordingChartFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ChartEvent> {
        self.events.lock().unwrap().clone()
    }
}

struct RecordingChart {
    container: String,
    symbol: String,
    factory: RecordingChartFactory,
    released: bool,
}

impl ChartInstance for RecordingChart {
    fn container_id(&self) -> &str {
        &self.container
    }

    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn snapshot(&self) -> ChartSnapshot {
        ChartSnapshot::Ready(vec![(0, 1.0)])
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.factory.live.fetch_sub(1, Ordering::SeqCst);
        self.factory.events.lock().unwrap().push(ChartEvent::Released {
            container: self.container.clone(),
        });
    }
}

impl ChartFactory for RecordingChartFactory {
    fn create(&self, config: &ChartConfig) -> Result<Box<dyn ChartInstance>> {
        if self.fail {
            return Err(anyhow!("chart library unavailable"));
        }
        let live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_live.fetch_max(live, Ordering::SeqCst);
        self.events.lock().unwrap().push(ChartEvent::Created {
            container: config.container_id.clone(),
            symbol: config.symbol.clone(),
        });
        Ok(Box::new(RecordingChart {
            container: config.container_id.clone(),
            symbol: config.symbol.clone(),
            factory: self.clone(),
            released: false,
        }))
    }
}
