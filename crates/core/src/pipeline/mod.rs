//! Discovery -> extraction -> enrichment -> analysis, one step after another.
//!
//! Generation and extraction failures stop the run with an [`OrchestrationError`] naming the
//! stage. Enrichment clients cannot fail (see [`crate::ingest`]), so a dead news or market feed
//! only thins out the analysis prompt.

pub mod error;
pub mod prompts;

use crate::config::Settings;
use crate::domain::recommendation::{Recommendation, StockSnapshot};
use crate::extract::extract_symbol;
use crate::ingest::market::{MarketDataClient, YahooChartClient};
use crate::ingest::news::{NewsApiClient, NewsClient, DEFAULT_MAX_ARTICLES};
use crate::llm::{ChatRequest, LlmClient};
use anyhow::anyhow;
use error::{OrchestrationError, Stage, StageContext};
use std::sync::Arc;

#[derive(Clone)]
pub struct Orchestrator {
    llm: Arc<dyn LlmClient>,
    market: Arc<dyn MarketDataClient>,
    news: Arc<dyn NewsClient>,
    max_headlines: usize,
}

impl Orchestrator {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        market: Arc<dyn MarketDataClient>,
        news: Arc<dyn NewsClient>,
    ) -> Self {
        Self {
            llm,
            market,
            news,
            max_headlines: DEFAULT_MAX_ARTICLES,
        }
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let llm = crate::llm::client_from_settings(settings)?;
        let market = Arc::new(YahooChartClient::from_env()?);
        let news = Arc::new(NewsApiClient::from_settings(settings)?);

        tracing::info!(
            llm = %llm.provider(),
            market = market.provider_name(),
            news = news.provider_name(),
            "recommendation pipeline configured"
        );

        Ok(Self::new(llm, market, news))
    }

    pub fn with_max_headlines(mut self, max_headlines: usize) -> Self {
        self.max_headlines = max_headlines;
        self
    }

    /// Runs the whole pipeline from scratch. Nothing is cached between calls.
    pub async fn produce_recommendation(&self) -> Result<Recommendation, OrchestrationError> {
        tracing::info!("discovering promising stocks");
        let discovery_text = self
            .generate(prompts::discovery_request())
            .await
            .stage(Stage::Discovery)?;

        let symbol = extract_symbol(&discovery_text)
            .ok_or_else(|| anyhow!("no ticker symbol found in discovery text"))
            .stage(Stage::Extraction)?;
        tracing::info!(%symbol, "discovered stock");

        let snapshot = self.build_snapshot(&symbol).await.stage(Stage::AnalysisData)?;

        let prompt = prompts::build_analysis_prompt(&snapshot);
        let analysis_text = self
            .generate(prompts::analysis_request(prompt))
            .await
            .stage(Stage::Analysis)?;

        tracing::info!(%symbol, "recommendation ready");
        Ok(Recommendation {
            symbol: snapshot.symbol,
            discovery_text,
            analysis_text,
            generated_at: chrono::Utc::now(),
        })
    }

    pub async fn build_snapshot(&self, symbol: &str) -> anyhow::Result<StockSnapshot> {
        let quote = self.market.fetch_quote(symbol).await;
        let news = self.news.fetch_headlines(symbol, self.max_headlines).await;
        tracing::info!(
            %symbol,
            price = ?quote.price,
            change_percent = ?quote.change_percent,
            headlines = news.len(),
            "enriched discovered stock"
        );
        StockSnapshot::try_new(symbol, quote, news)
    }

    async fn generate(&self, request: ChatRequest) -> anyhow::Result<String> {
        let text = self.llm.complete(request).await?;
        anyhow::ensure!(
            !text.trim().is_empty(),
            "{} returned empty text",
            self.llm.provider()
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::quote::TickerQuote;
    use crate::llm::Provider;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned completions in order and records every request.
    struct ScriptedLlm {
        replies: Mutex<VecDeque<anyhow::Result<String>>>,
        seen: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedLlm {
        fn new(replies: Vec<anyhow::Result<String>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<ChatRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl LlmClient for ScriptedLlm {
        fn provider(&self) -> Provider {
            Provider::OpenAI
        }

        async fn complete(&self, request: ChatRequest) -> anyhow::Result<String> {
            self.seen.lock().unwrap().push(request);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(anyhow!("no scripted reply left")))
        }
    }

    struct FixedMarket {
        price: Option<f64>,
        previous_close: Option<f64>,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl MarketDataClient for FixedMarket {
        fn provider_name(&self) -> &'static str {
            "fixed"
        }

        async fn fetch_quote(&self, ticker: &str) -> TickerQuote {
            self.calls.lock().unwrap().push(ticker.to_string());
            TickerQuote::from_prices(self.price, self.previous_close)
        }
    }

    struct FixedNews(Vec<String>);

    #[async_trait::async_trait]
    impl NewsClient for FixedNews {
        fn provider_name(&self) -> &'static str {
            "fixed"
        }

        async fn fetch_headlines(&self, _ticker: &str, max_articles: usize) -> Vec<String> {
            self.0.iter().take(max_articles).cloned().collect()
        }
    }

    fn market(price: Option<f64>, previous_close: Option<f64>) -> Arc<FixedMarket> {
        Arc::new(FixedMarket {
            price,
            previous_close,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn news(headlines: &[&str]) -> Arc<FixedNews> {
        Arc::new(FixedNews(headlines.iter().map(|s| s.to_string()).collect()))
    }

    #[tokio::test]
    async fn end_to_end_builds_prompt_from_enrichment() {
        let llm = ScriptedLlm::new(vec![
            Ok("My pick is GRPH (Graphex Inc), a graphite producer.".to_string()),
            Ok("Graphex looks promising.".to_string()),
        ]);
        let market = market(Some(12.5), Some(10.0));
        let orchestrator = Orchestrator::new(
            llm.clone(),
            market.clone(),
            news(&["Graphex wins contract"]),
        );

        let rec = orchestrator.produce_recommendation().await.unwrap();
        assert_eq!(rec.symbol, "GRPH");
        assert_eq!(market.calls.lock().unwrap().as_slice(), ["GRPH"]);

        let requests = llm.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].max_tokens, 1000);
        assert_eq!(requests[1].max_tokens, 500);

        let prompt = &requests[1].messages[1].content;
        assert!(prompt.contains("Stock: GRPH"));
        assert!(prompt.contains("Current Price: $12.5"));
        assert!(prompt.contains("Daily Change: 25.0%"));
        assert!(prompt.contains("Graphex wins contract"));

        assert_eq!(
            rec.render_text(),
            "AI Stock Discovery:\nMy pick is GRPH (Graphex Inc), a graphite producer.\n\n\
Detailed Analysis:\nGraphex looks promising."
        );
    }

    #[tokio::test]
    async fn discovery_failure_is_tagged() {
        let llm = ScriptedLlm::new(vec![Err(anyhow!("upstream 503"))]);
        let orchestrator = Orchestrator::new(llm.clone(), market(None, None), news(&[]));

        let err = orchestrator.produce_recommendation().await.unwrap_err();
        assert_eq!(err.stage, Stage::Discovery);
        assert_eq!(llm.requests().len(), 1);
    }

    #[tokio::test]
    async fn blank_discovery_is_a_discovery_failure() {
        let llm = ScriptedLlm::new(vec![Ok("   \n".to_string())]);
        let orchestrator = Orchestrator::new(llm, market(None, None), news(&[]));

        let err = orchestrator.produce_recommendation().await.unwrap_err();
        assert_eq!(err.stage, Stage::Discovery);
    }

    #[tokio::test]
    async fn missing_symbol_is_tagged_extraction() {
        let llm = ScriptedLlm::new(vec![Ok("THE best pick is hard to say".to_string())]);
        let market = market(Some(1.0), Some(1.0));
        let orchestrator = Orchestrator::new(llm.clone(), market.clone(), news(&[]));

        let err = orchestrator.produce_recommendation().await.unwrap_err();
        assert_eq!(err.stage, Stage::Extraction);
        assert!(market.calls.lock().unwrap().is_empty());
        assert_eq!(llm.requests().len(), 1);
    }

    #[tokio::test]
    async fn analysis_failure_is_tagged() {
        let llm = ScriptedLlm::new(vec![
            Ok("Pick: GRPH".to_string()),
            Err(anyhow!("timeout")),
        ]);
        let orchestrator = Orchestrator::new(llm, market(None, None), news(&[]));

        let err = orchestrator.produce_recommendation().await.unwrap_err();
        assert_eq!(err.stage, Stage::Analysis);
        assert!(err.to_string().contains("timeout"));
    }

    #[tokio::test]
    async fn degraded_enrichment_still_produces_a_recommendation() {
        let llm = ScriptedLlm::new(vec![Ok("Pick: GRPH".to_string()), Ok("ok".to_string())]);
        let orchestrator = Orchestrator::new(llm.clone(), market(None, None), news(&[]));

        orchestrator.produce_recommendation().await.unwrap();
        let prompt = &llm.requests()[1].messages[1].content;
        assert!(prompt.contains("Current Price: N/A"));
        assert!(prompt.contains("Daily Change: N/A"));
        assert!(prompt.contains("Recent News: No recent news"));
    }

    #[tokio::test]
    async fn headline_cap_is_passed_to_news_client() {
        let orchestrator = Orchestrator::new(
            ScriptedLlm::new(vec![]),
            market(None, None),
            news(&["a", "b", "c", "d"]),
        )
        .with_max_headlines(2);

        let snapshot = orchestrator.build_snapshot("GRPH").await.unwrap();
        assert_eq!(snapshot.news, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn each_run_repeats_the_whole_pipeline() {
        let llm = ScriptedLlm::new(vec![
            Ok("Pick: GRPH".to_string()),
            Ok("first".to_string()),
            Ok("Pick: ABCD".to_string()),
            Ok("second".to_string()),
        ]);
        let market = market(None, None);
        let orchestrator = Orchestrator::new(llm.clone(), market.clone(), news(&[]));

        let first = orchestrator.produce_recommendation().await.unwrap();
        let second = orchestrator.produce_recommendation().await.unwrap();
        assert_eq!(first.symbol, "GRPH");
        assert_eq!(second.symbol, "ABCD");
        assert_eq!(llm.requests().len(), 4);
        assert_eq!(market.calls.lock().unwrap().as_slice(), ["GRPH", "ABCD"]);
    }
}
