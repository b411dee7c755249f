//! Business headlines for the news pane
//!
//! The dashboard shows whatever comes back and says plainly why when nothing does.

use crate::api::models::{NewsArticle, NewsResponse};
use crate::config::config::NewsConfig;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Local, Utc};
use std::time::Duration;
use tracing::{info, warn};

const TRENDING_COUNT: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub title: String,
    pub description: String,
    pub url: String,
    pub published_at: Option<DateTime<Utc>>,
    pub source: String,
}

impl Article {
    /// Only articles with a real title and a description are shown
    fn from_raw(raw: NewsArticle) -> Option<Self> {
        let title = raw.title.filter(|t| !t.trim().is_empty() && t != "[Removed]")?;
        let description = raw.description.filter(|d| !d.trim().is_empty())?;
        Some(Self {
            title,
            description,
            url: raw.url.unwrap_or_default(),
            published_at: raw
                .published_at
                .as_deref()
                .and_then(|p| DateTime::parse_from_rfc3339(p).ok())
                .map(|p| p.with_timezone(&Utc)),
            source: raw.source.name.unwrap_or_else(|| "Unknown".to_string()),
        })
    }

    pub fn published_label(&self) -> String {
        self.published_at
            .map(|p| p.with_timezone(&Local).format("%d %b %H:%M").to_string())
            .unwrap_or_default()
    }
}

/// Headlines split into a trending and a market section
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewsFeed {
    pub trending: Vec<Article>,
    pub market: Vec<Article>,
    /// Why the feed is empty, shown in place of headlines
    pub notice: Option<String>,
}

impl NewsFeed {
    pub fn empty(reason: impl Into<String>) -> Self {
        Self {
            notice: Some(reason.into()),
            ..Default::default()
        }
    }

    /// First six articles trend; the next six (or the first six again) are market
    pub fn from_articles(articles: Vec<Article>) -> Self {
        if articles.is_empty() {
            return Self::empty("No news available right now.");
        }
        let trending: Vec<Article> = articles.iter().take(TRENDING_COUNT).cloned().collect();
        let rest: Vec<Article> = articles
            .iter()
            .skip(TRENDING_COUNT)
            .take(TRENDING_COUNT)
            .cloned()
            .collect();
        let market = if rest.is_empty() { trending.clone() } else { rest };
        Self {
            trending,
            market,
            notice: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.trending.is_empty() && self.market.is_empty()
    }
}

pub struct NewsService {
    config: NewsConfig,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl NewsService {
    pub fn new(config: &NewsConfig, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent("ticker-dash")
            .build()
            .context("Failed to build news HTTP client")?;
        Ok(Self {
            api_key: config.resolved_api_key(),
            config: config.clone(),
            client,
        })
    }

    /// Fetch headlines; failures become an empty feed with an explanation
    pub async fn get_news(&self) -> NewsFeed {
        if !self.config.enabled {
            return NewsFeed::empty("News is disabled in the configuration.");
        }
        let Some(api_key) = self.api_key.as_deref() else {
            return NewsFeed::empty("No news available: set NEWSAPI_KEY to enable headlines.");
        };

        match self.fetch_articles(api_key).await {
            Ok(articles) => {
                info!(target: "news", "Loaded {} articles", articles.len());
                NewsFeed::from_articles(articles)
            }
            Err(e) => {
                warn!(target: "news", "News fetch failed: {:#}", e);
                NewsFeed::empty(format!("No news available: {}", e))
            }
        }
    }

    async fn fetch_articles(&self, api_key: &str) -> Result<Vec<Article>> {
        let url = format!("{}/top-headlines", self.config.base_url.trim_end_matches('/'));
        let page_size = self.config.page_size.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("country", self.config.country.as_str()),
                ("category", self.config.category.as_str()),
                ("pageSize", page_size.as_str()),
                ("apiKey", api_key),
            ])
            .send()
            .await?;

        let status = response.status();
        let body: NewsResponse = response.json().await.context("Malformed news response")?;
        if !status.is_success() || body.status.as_deref() == Some("error") {
            return Err(anyhow!(
                "{}",
                body.message.unwrap_or_else(|| format!("HTTP {}", status))
            ));
        }

        Ok(parse_articles(body))
    }
}

pub fn parse_articles(response: NewsResponse) -> Vec<Article> {
    response
        .articles
        .into_iter()
        .filter_map(Article::from_raw)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(i: usize) -> Article {
        Article {
            title: format!("Headline {i}"),
            description: "Body".to_string(),
            url: format!("https://news/{i}"),
            published_at: None,
            source: "Wire".to_string(),
        }
    }

    #[test]
    fn test_parse_articles_filters_removed_and_empty() {
        let json = r#"{"status":"ok","articles":[
            {"title":"Sensex rallies","description":"Banks lead","url":"https://a","publishedAt":"2024-10-01T09:30:00Z","source":{"name":"ET"}},
            {"title":"[Removed]","description":"x"},
            {"title":"No description"},
            {"title":"","description":"empty title"}
        ]}"#;
        let response: NewsResponse = serde_json::from_str(json).unwrap();
        let articles = parse_articles(response);
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].source, "ET");
        assert!(articles[0].published_at.is_some());
    }

    #[test]
    fn test_feed_split() {
        let feed = NewsFeed::from_articles((0..9).map(article).collect());
        assert_eq!(feed.trending.len(), 6);
        assert_eq!(feed.market.len(), 3);
        assert_eq!(feed.market[0].title, "Headline 6");

        let short = NewsFeed::from_articles((0..2).map(article).collect());
        assert_eq!(short.market, short.trending);
    }

    #[test]
    fn test_empty_feed_explains_itself() {
        let feed = NewsFeed::from_articles(Vec::new());
        assert!(feed.is_empty());
        assert!(feed.notice.unwrap().contains("No news"));
    }

    #[tokio::test]
    async fn test_missing_key_skips_network() {
        let config = NewsConfig {
            api_key: None,
            ..NewsConfig::default()
        };
        let mut service = NewsService::new(&config, 1).unwrap();
        service.api_key = None;
        let feed = service.get_news().await;
        assert!(feed.is_empty());
        assert!(feed.notice.unwrap().contains("NEWSAPI_KEY"));
    }
}
