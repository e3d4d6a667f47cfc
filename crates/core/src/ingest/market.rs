use crate::domain::quote::TickerQuote;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
// The chart endpoint answers 429 to clients without a browser-like agent.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0 Safari/537.36";

#[async_trait::async_trait]
pub trait MarketDataClient: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Never fails: any upstream problem yields [`TickerQuote::unavailable`].
    async fn fetch_quote(&self, ticker: &str) -> TickerQuote;
}

#[derive(Debug, Clone)]
pub struct YahooChartClient {
    http: reqwest::Client,
    base_url: String,
}

impl YahooChartClient {
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("MARKET_DATA_BASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = std::env::var("MARKET_DATA_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self::new(base_url, Duration::from_secs(timeout_secs))
    }

    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build market data http client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    fn url(&self, ticker: &str) -> String {
        format!(
            "{}/v8/finance/chart/{}",
            self.base_url.trim_end_matches('/'),
            ticker
        )
    }

    async fn fetch_once(&self, ticker: &str) -> Result<TickerQuote> {
        let res = self
            .http
            .get(self.url(ticker))
            .query(&[("range", "1d"), ("interval", "1d")])
            .send()
            .await
            .context("market data request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read market data response")?;
        if !status.is_success() {
            anyhow::bail!("market data HTTP {status}: {text}");
        }

        parse_chart_quote(&text)
    }
}

#[async_trait::async_trait]
impl MarketDataClient for YahooChartClient {
    fn provider_name(&self) -> &'static str {
        "yahoo_chart"
    }

    async fn fetch_quote(&self, ticker: &str) -> TickerQuote {
        match self.fetch_once(ticker).await {
            Ok(quote) => quote,
            Err(err) => {
                tracing::error!(%ticker, error = %format!("{err:#}"), "failed to fetch stock data");
                TickerQuote::unavailable()
            }
        }
    }
}

fn parse_chart_quote(text: &str) -> Result<TickerQuote> {
    let body = serde_json::from_str::<ChartResponse>(text)
        .with_context(|| format!("market data response is not a chart payload: {text}"))?;

    if let Some(err) = body.chart.error {
        anyhow::bail!(
            "market data provider error {}: {}",
            err.code.as_deref().unwrap_or("unknown"),
            err.description.as_deref().unwrap_or("")
        );
    }

    let meta = body
        .chart
        .result
        .into_iter()
        .flatten()
        .next()
        .context("market data response has no result")?
        .meta;

    let previous_close = meta
        .regular_market_previous_close
        .or(meta.previous_close)
        .or(meta.chart_previous_close);

    Ok(TickerQuote::from_prices(meta.regular_market_price, previous_close))
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    regular_market_price: Option<f64>,
    #[serde(default)]
    regular_market_previous_close: Option<f64>,
    #[serde(default)]
    previous_close: Option<f64>,
    #[serde(default)]
    chart_previous_close: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}
