//! Last-traded-price lookups
//!
//! This is the only place that decides how a price is shown to the user:
//! rupee symbol, two decimals, and a fixed message when nothing is known.

use crate::api::models::ChartMeta;
use crate::api::MarketApi;
use crate::symbol::Symbol;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Text shown wherever a price could not be obtained
pub const PRICE_UNAVAILABLE: &str = "Price not available";

const CURRENCY_SYMBOL: &str = "₹";

/// A snapshot price, or the sentinel for any failure
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Price {
    Available(f64),
    #[default]
    Unavailable,
}

impl Price {
    pub fn value(self) -> Option<f64> {
        match self {
            Price::Available(v) => Some(v),
            Price::Unavailable => None,
        }
    }

    pub fn is_available(self) -> bool {
        matches!(self, Price::Available(_))
    }

    fn from_field(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => Price::Available(v),
            _ => Price::Unavailable,
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_price(*self))
    }
}

/// Format a price for display
pub fn format_price(price: Price) -> String {
    match price {
        Price::Available(value) => format!("{}{:.2}", CURRENCY_SYMBOL, value),
        Price::Unavailable => PRICE_UNAVAILABLE.to_string(),
    }
}

/// Day statistics from the same snapshot as the price
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteDetail {
    pub price: Price,
    pub previous_close: Price,
    pub day_high: Price,
    pub day_low: Price,
}

impl QuoteDetail {
    fn from_meta(meta: &ChartMeta) -> Self {
        Self {
            price: Price::from_field(meta.regular_market_price),
            previous_close: Price::from_field(meta.previous_close.or(meta.chart_previous_close)),
            day_high: Price::from_field(meta.regular_market_day_high),
            day_low: Price::from_field(meta.regular_market_day_low),
        }
    }

    /// Change against the previous close as (absolute, percent)
    pub fn change(&self) -> Option<(f64, f64)> {
        let price = self.price.value()?;
        let prev = self.previous_close.value().filter(|p| *p != 0.0)?;
        let change = price - prev;
        Some((change, change / prev * 100.0))
    }

    /// One-line day summary using the shared price format
    pub fn summary(&self) -> String {
        let change = match self.change() {
            Some((abs, pct)) => format!(" ({:+.2}, {:+.2}%)", abs, pct),
            None => String::new(),
        };
        format!(
            "High {} | Low {} | Prev close {}{}",
            format_price(self.day_high),
            format_price(self.day_low),
            format_price(self.previous_close),
            change
        )
    }
}

/// Anything that can show a formatted price
pub trait PriceTarget {
    fn show_price(&mut self, text: &str);
}

impl PriceTarget for String {
    fn show_price(&mut self, text: &str) {
        self.clear();
        self.push_str(text);
    }
}

/// Write a price into a display target using the shared format
pub fn present(price: Price, target: &mut dyn PriceTarget) {
    target.show_price(&format_price(price));
}

#[derive(Clone)]
pub struct QuoteFetcher {
    api: Arc<dyn MarketApi>,
}

impl QuoteFetcher {
    const SNAPSHOT_INTERVAL: &'static str = "1d";
    const SNAPSHOT_RANGE: &'static str = "1d";

    pub fn new(api: Arc<dyn MarketApi>) -> Self {
        Self { api }
    }

    /// Latest traded price; never fails, logs and returns Unavailable instead
    pub async fn fetch(&self, symbol: &Symbol) -> Price {
        self.fetch_detail(symbol)
            .await
            .map(|d| d.price)
            .unwrap_or(Price::Unavailable)
    }

    /// Fetch and write the formatted result straight into `target`
    pub async fn fetch_into(&self, symbol: &Symbol, target: &mut dyn PriceTarget) -> Price {
        let price = self.fetch(symbol).await;
        present(price, target);
        price
    }

    /// Full day snapshot; None on any transport or shape failure
    pub async fn fetch_detail(&self, symbol: &Symbol) -> Option<QuoteDetail> {
        let response = match self
            .api
            .chart(symbol.as_str(), Self::SNAPSHOT_INTERVAL, Self::SNAPSHOT_RANGE)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(target: "quote", "Quote request for {} failed: {:#}", symbol, e);
                return None;
            }
        };

        let Some(result) = response.first() else {
            warn!(target: "quote", "Quote response for {} had no result block", symbol);
            return None;
        };

        let detail = QuoteDetail::from_meta(&result.meta);
        if !detail.price.is_available() {
            warn!(target: "quote", "Quote response for {} is missing regularMarketPrice", symbol);
        } else {
            debug!(target: "quote", "{} -> {}", symbol, detail.price);
        }
        Some(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(Price::Available(3912.5)), "₹3912.50");
        assert_eq!(format_price(Price::Available(0.456)), "₹0.46");
        assert_eq!(format_price(Price::Unavailable), "Price not available");
    }

    #[test]
    fn test_from_field_rejects_non_finite() {
        assert_eq!(Price::from_field(Some(f64::NAN)), Price::Unavailable);
        assert_eq!(Price::from_field(None), Price::Unavailable);
        assert_eq!(Price::from_field(Some(1.0)), Price::Available(1.0));
    }

    #[test]
    fn test_present_overwrites_target() {
        let mut label = String::from("stale text");
        present(Price::Unavailable, &mut label);
        assert_eq!(label, PRICE_UNAVAILABLE);
    }

    #[test]
    fn test_detail_change_and_summary() {
        let detail = QuoteDetail {
            price: Price::Available(110.0),
            previous_close: Price::Available(100.0),
            day_high: Price::Available(112.0),
            day_low: Price::Unavailable,
        };
        assert_eq!(detail.change(), Some((10.0, 10.0)));
        let summary = detail.summary();
        assert!(summary.contains("High ₹112.00"));
        assert!(summary.contains("Low Price not available"));
        assert!(summary.contains("+10.00%"));
    }
}
