//! Free-text query to exchange-qualified candidates
//!
//! Search results are filtered to NSE/BSE listings, de-duplicated by display
//! name and capped before any price lookups are fanned out.

use crate::api::{MarketApi, SearchQuote};
use crate::config::config::SearchConfig;
use crate::quote::{Price, QuoteFetcher};
use crate::symbol::Symbol;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Hard ceiling on suggestions and on concurrent price lookups
pub const MAX_CANDIDATES: usize = 5;

/// One row of the suggestion dropdown
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub display_name: String,
    pub symbol: Symbol,
    pub price: Price,
}

/// Keep NSE/BSE entries with a name, first occurrence of each name wins
pub fn filter_candidates(quotes: Vec<SearchQuote>, max: usize) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    quotes
        .into_iter()
        .filter_map(|quote| {
            let name = quote.shortname?.trim().to_string();
            if name.is_empty() {
                return None;
            }
            let symbol = Symbol::parse(quote.symbol.as_deref()?)?;
            Some((name, symbol))
        })
        .filter(|(name, _)| seen.insert(name.clone()))
        .take(max.min(MAX_CANDIDATES))
        .map(|(display_name, symbol)| Candidate {
            display_name,
            symbol,
            price: Price::Unavailable,
        })
        .collect()
}

#[derive(Clone)]
pub struct TickerResolver {
    api: Arc<dyn MarketApi>,
    quotes: QuoteFetcher,
    region: String,
    max_results: usize,
    max_concurrent_quotes: usize,
    fetch_prices: bool,
}

impl TickerResolver {
    pub fn new(api: Arc<dyn MarketApi>, region: &str, config: &SearchConfig) -> Self {
        Self {
            quotes: QuoteFetcher::new(api.clone()),
            api,
            region: region.to_string(),
            max_results: config.max_results.clamp(1, MAX_CANDIDATES),
            max_concurrent_quotes: config.max_concurrent_quotes.clamp(1, MAX_CANDIDATES),
            fetch_prices: config.fetch_prices,
        }
    }

    /// Resolve a query into priced candidates. Never fails: errors are
    /// logged and produce an empty list.
    pub async fn resolve(&self, query: &str) -> Vec<Candidate> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let response = match self.api.search(query, &self.region).await {
            Ok(response) => response,
            Err(e) => {
                warn!(target: "search", "Search for '{}' failed: {:#}", query, e);
                return Vec::new();
            }
        };

        let mut candidates = filter_candidates(response.quotes, self.max_results);
        debug!(target: "search", "'{}' -> {} candidates", query, candidates.len());

        if self.fetch_prices && !candidates.is_empty() {
            self.fill_prices(&mut candidates).await;
        }
        candidates
    }

    /// Look up every candidate's price in parallel, bounded by the semaphore
    async fn fill_prices(&self, candidates: &mut [Candidate]) {
        let permits = Arc::new(Semaphore::new(self.max_concurrent_quotes));
        let mut tasks = JoinSet::new();

        for (index, candidate) in candidates.iter().enumerate() {
            let quotes = self.quotes.clone();
            let symbol = candidate.symbol.clone();
            let permits = permits.clone();
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await.ok();
                (index, quotes.fetch(&symbol).await)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, price)) => {
                    if let Some(candidate) = candidates.get_mut(index) {
                        candidate.price = price;
                    }
                }
                Err(e) => warn!(target: "search", "Price lookup task failed: {}", e),
            }
        }
    }
}
