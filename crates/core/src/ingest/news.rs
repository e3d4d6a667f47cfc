use crate::config::Settings;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2/everything";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_MAX_ARTICLES: usize = 3;

#[async_trait::async_trait]
pub trait NewsClient: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Newest headlines first, at most `max_articles`. Never fails: any upstream problem yields an
    /// empty list.
    async fn fetch_headlines(&self, ticker: &str, max_articles: usize) -> Vec<String>;
}

#[derive(Debug, Clone)]
pub struct NewsApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl NewsApiClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings.require_newsapi_key()?.to_string();
        let base_url = std::env::var("NEWS_API_BASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = std::env::var("NEWS_API_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self::new(base_url, api_key, Duration::from_secs(timeout_secs))
    }

    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build news http client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    async fn fetch_once(&self, ticker: &str, max_articles: usize) -> Result<Vec<String>> {
        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("q", ticker),
                ("sortBy", "publishedAt"),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await
            .context("news request failed")?;

        let status = res.status();
        if !status.is_success() {
            // NewsAPI error bodies echo the request; keep them out of the logs.
            anyhow::bail!("news HTTP {status}");
        }

        let text = res.text().await.context("failed to read news response")?;
        parse_headlines(&text, max_articles)
    }
}

#[async_trait::async_trait]
impl NewsClient for NewsApiClient {
    fn provider_name(&self) -> &'static str {
        "newsapi"
    }

    async fn fetch_headlines(&self, ticker: &str, max_articles: usize) -> Vec<String> {
        match self.fetch_once(ticker, max_articles).await {
            Ok(headlines) => headlines,
            Err(err) => {
                tracing::error!(%ticker, error = %format!("{err:#}"), "failed to fetch news");
                Vec::new()
            }
        }
    }
}

fn parse_headlines(text: &str, max_articles: usize) -> Result<Vec<String>> {
    let body = serde_json::from_str::<EverythingResponse>(text)
        .context("news response is not valid JSON")?;

    Ok(body
        .articles
        .into_iter()
        .take(max_articles)
        .filter_map(|a| a.title)
        .collect())
}

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    #[serde(default)]
    title: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::test_server;
    use serde_json::json;

    fn body(titles: &[Option<&str>]) -> String {
        let articles: Vec<_> = titles
            .iter()
            .map(|t| json!({"source": {"name": "Wire"}, "title": t, "publishedAt": "2026-10-18T12:00:00Z"}))
            .collect();
        json!({"status": "ok", "totalResults": articles.len(), "articles": articles}).to_string()
    }

    #[test]
    fn keeps_provider_order_and_caps_count() {
        let text = body(&[Some("a"), Some("b"), Some("c"), Some("d")]);
        assert_eq!(parse_headlines(&text, 3).unwrap(), vec!["a", "b", "c"]);
        assert_eq!(parse_headlines(&text, 10).unwrap().len(), 4);
        assert!(parse_headlines(&text, 0).unwrap().is_empty());
    }

    #[test]
    fn duplicates_are_kept() {
        let text = body(&[Some("same"), Some("same")]);
        assert_eq!(parse_headlines(&text, 3).unwrap(), vec!["same", "same"]);
    }

    #[test]
    fn untitled_articles_are_skipped_within_the_window() {
        let text = body(&[Some("a"), None, Some("c"), Some("d")]);
        assert_eq!(parse_headlines(&text, 3).unwrap(), vec!["a", "c"]);
    }

    #[test]
    fn missing_articles_is_empty_and_garbage_is_error() {
        assert!(parse_headlines(r#"{"status":"ok"}"#, 3).unwrap().is_empty());
        assert!(parse_headlines("not json", 3).is_err());
    }

    #[tokio::test]
    async fn server_error_degrades_to_empty() {
        let addr = test_server::respond_with("HTTP/1.1 500 Internal Server Error").await;
        let client =
            NewsApiClient::new(format!("http://{addr}/v2/everything"), "key", Duration::from_secs(2))
                .unwrap();
        assert_eq!(client.fetch_headlines("GRPH", DEFAULT_MAX_ARTICLES).await, Vec::<String>::new());
    }

    #[tokio::test]
    async fn timeout_degrades_to_empty() {
        let addr = test_server::silent().await;
        let client = NewsApiClient::new(
            format!("http://{addr}/v2/everything"),
            "key",
            Duration::from_millis(200),
        )
        .unwrap();
        assert_eq!(client.fetch_headlines("GRPH", DEFAULT_MAX_ARTICLES).await, Vec::<String>::new());
    }

    #[tokio::test]
    async fn unreachable_provider_degrades_to_empty() {
        let client = NewsApiClient::new("http://127.0.0.1:9/v2/everything", "key", Duration::from_secs(2))
            .unwrap();
        assert!(client.fetch_headlines("GRPH", DEFAULT_MAX_ARTICLES).await.is_empty());
    }
}
