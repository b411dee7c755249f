//! Market watchlist of configured symbols

use crate::quote::{Price, QuoteFetcher};
use crate::symbol::Symbol;
use tokio::task::JoinSet;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct WatchRow {
    pub symbol: Symbol,
    pub price: Price,
}

/// Parse configured symbols, dropping (and logging) anything unqualified
pub fn parse_symbols(raw: &[String]) -> Vec<Symbol> {
    raw.iter()
        .filter_map(|s| {
            let parsed = Symbol::parse(s);
            if parsed.is_none() {
                warn!(target: "quote", "Watchlist entry '{}' is not an NSE/BSE symbol", s);
            }
            parsed
        })
        .collect()
}

/// Price every symbol concurrently, keeping the configured order
pub async fn refresh(quotes: &QuoteFetcher, symbols: &[Symbol]) -> Vec<WatchRow> {
    let mut rows: Vec<WatchRow> = symbols
        .iter()
        .map(|symbol| WatchRow {
            symbol: symbol.clone(),
            price: Price::Unavailable,
        })
        .collect();

    let mut tasks = JoinSet::new();
    for (index, symbol) in symbols.iter().enumerate() {
        let quotes = quotes.clone();
        let symbol = symbol.clone();
        tasks.spawn(async move { (index, quotes.fetch(&symbol).await) });
    }

    while let Some(joined) = tasks.join_next().await {
        if let Ok((index, price)) = joined {
            if let Some(row) = rows.get_mut(index) {
                row.price = price;
            }
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_symbols_drops_unqualified() {
        let raw = vec!["TCS.NS".to_string(), "^BSESN".to_string(), "ITC.BO".to_string()];
        let parsed = parse_symbols(&raw);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].as_str(), "ITC.BO");
    }
}
