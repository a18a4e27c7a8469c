use crate::config::{BraveConfig, HttpConfig};
use crate::domain::context::NewsItem;
use crate::domain::ports::NewsProvider;
use crate::domain::trading::types::currencies;
use crate::infrastructure::core::{HttpClientFactory, build_url_with_query};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct BraveNewsResponse {
    #[serde(default)]
    results: Vec<BraveNewsResult>,
}

#[derive(Debug, Deserialize)]
struct BraveNewsResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    source: Option<BraveSource>,
    #[serde(default)]
    page_age: Option<String>,
    #[serde(default)]
    age: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BraveSource {
    #[serde(default)]
    name: String,
}

impl From<BraveNewsResult> for NewsItem {
    fn from(r: BraveNewsResult) -> Self {
        NewsItem {
            title: r.title,
            url: r.url,
            snippet: r.description,
            source: r.source.map(|s| s.name).unwrap_or_default(),
            published: r.page_age.or(r.age).unwrap_or_default(),
        }
    }
}

/// News headlines from the Brave news search API
pub struct BraveNewsProvider {
    config: BraveConfig,
    client: ClientWithMiddleware,
}

impl BraveNewsProvider {
    pub fn new(config: BraveConfig, http: &HttpConfig) -> Self {
        Self {
            config,
            client: HttpClientFactory::create_client(http),
        }
    }

    fn search_url(&self, query: &str) -> String {
        let count = if self.config.news_count == 0 {
            10
        } else {
            self.config.news_count
        };
        build_url_with_query(
            &format!(
                "{}/res/v1/news/search",
                self.config.base_url.trim_end_matches('/')
            ),
            &[("q", query.to_string()), ("count", count.to_string())],
        )
    }
}

/// "EUR USD JPY forex news" for [EUR_USD, USD_JPY]
pub fn news_query(instruments: &[String]) -> String {
    let mut seen = BTreeSet::new();
    let mut terms = Vec::new();
    for currency in instruments.iter().flat_map(|i| currencies(i)) {
        if seen.insert(currency.clone()) {
            terms.push(currency);
        }
    }
    terms.push("forex news".to_string());
    terms.join(" ")
}

fn parse_news(body: &str) -> Result<Vec<NewsItem>> {
    let response: BraveNewsResponse =
        serde_json::from_str(body).context("Failed to decode Brave news response")?;
    Ok(response.results.into_iter().map(NewsItem::from).collect())
}

#[async_trait]
impl NewsProvider for BraveNewsProvider {
    async fn fetch_news(&self, instruments: &[String]) -> Result<Vec<NewsItem>> {
        let url = self.search_url(&news_query(instruments));
        debug!("Brave GET {}", url);

        let mut request = self.client.get(&url).header("Accept", "application/json");
        if !self.config.api_key.is_empty() {
            request = request.header("X-Subscription-Token", &self.config.api_key);
        }
        let resp = request
            .send()
            .await
            .context("Brave news request failed")?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("brave api status {}", status.as_u16());
        }
        let body = resp.text().await.context("Failed to read Brave response")?;
        let items = parse_news(&body)?;
        debug!("Brave: {} news items", items.len());
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_deduplicates_currencies() {
        let instruments = vec!["EUR_USD".to_string(), "USD_JPY".to_string()];
        assert_eq!(news_query(&instruments), "EUR USD JPY forex news");
    }

    #[test]
    fn test_parse_news_results() {
        let body = r#"{
            "type": "news",
            "results": [
                {
                    "title": "ECB holds rates",
                    "url": "https://example.com/ecb",
                    "description": "The ECB left rates unchanged.",
                    "source": {"name": "Reuters"},
                    "page_age": "2025-01-10T08:00:00"
                },
                {"title": "Yen slides"}
            ]
        }"#;
        let items = parse_news(body).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].source, "Reuters");
        assert_eq!(items[0].snippet, "The ECB left rates unchanged.");
        assert_eq!(items[0].published, "2025-01-10T08:00:00");
        assert_eq!(items[1].source, "");
    }

    #[test]
    fn test_missing_results_is_empty() {
        assert!(parse_news("{}").unwrap().is_empty());
    }

    #[test]
    fn test_search_url() {
        let provider = BraveNewsProvider::new(
            BraveConfig {
                api_key: String::new(),
                base_url: "https://api.search.brave.com/".to_string(),
                news_count: 0,
            },
            &HttpConfig::default(),
        );
        let url = provider.search_url("EUR USD forex news");
        assert!(url.starts_with("https://api.search.brave.com/res/v1/news/search?q="));
        assert!(url.ends_with("count=10"));
    }
}
