//! Response shapes for the search, chart and news endpoints
//!
//! Only the fields the dashboard reads are modelled; everything is optional
//! because the upstream payloads are not contractually stable.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub quotes: Vec<SearchQuote>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuote {
    pub shortname: Option<String>,
    pub symbol: Option<String>,
    pub exchange: Option<String>,
    #[serde(rename = "quoteType")]
    pub quote_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartEnvelope,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartEnvelope {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartResult {
    #[serde(default)]
    pub meta: ChartMeta,
    #[serde(default)]
    pub timestamp: Vec<i64>,
    #[serde(default)]
    pub indicators: Indicators,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    pub symbol: Option<String>,
    pub currency: Option<String>,
    pub regular_market_price: Option<f64>,
    pub previous_close: Option<f64>,
    pub chart_previous_close: Option<f64>,
    pub regular_market_day_high: Option<f64>,
    pub regular_market_day_low: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<IndicatorQuote>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndicatorQuote {
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

impl ChartResponse {
    /// First result block, if the endpoint returned any
    pub fn first(&self) -> Option<&ChartResult> {
        self.chart.result.as_ref().and_then(|r| r.first())
    }
}

impl ChartResult {
    /// Pair timestamps with closes, skipping gaps the API reports as null
    pub fn close_series(&self) -> Vec<(i64, f64)> {
        let Some(quote) = self.indicators.quote.first() else {
            return Vec::new();
        };
        self.timestamp
            .iter()
            .zip(quote.close.iter())
            .filter_map(|(ts, close)| close.filter(|c| c.is_finite()).map(|c| (*ts, c)))
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewsResponse {
    pub status: Option<String>,
    #[serde(default)]
    pub articles: Vec<NewsArticle>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub published_at: Option<String>,
    #[serde(default)]
    pub source: NewsSource,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewsSource {
    pub name: Option<String>,
}
