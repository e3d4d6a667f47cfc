pub mod domain;
pub mod extract;
pub mod ingest;
pub mod llm;
pub mod pipeline;

pub mod config {
    use anyhow::Context;

    use crate::llm::Provider;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub newsapi_key: Option<String>,
        pub openai_api_key: Option<String>,
        pub anthropic_api_key: Option<String>,
        pub llm_provider: Provider,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_lookup(|key| std::env::var(key).ok())
        }

        pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
            let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

            let llm_provider = match non_empty("LLM_PROVIDER") {
                Some(name) => name.parse::<Provider>()?,
                None => Provider::OpenAI,
            };

            Ok(Self {
                newsapi_key: non_empty("NEWSAPI_KEY"),
                openai_api_key: non_empty("OPENAI_API_KEY"),
                anthropic_api_key: non_empty("ANTHROPIC_API_KEY"),
                llm_provider,
                sentry_dsn: non_empty("SENTRY_DSN"),
            })
        }

        /// Fails unless every secret the pipeline needs is present. Binaries call this once at
        /// startup so a missing key never surfaces as a per-request error.
        pub fn validate_required(&self) -> anyhow::Result<()> {
            self.require_newsapi_key()?;
            match self.llm_provider {
                Provider::OpenAI => self.require_openai_api_key().map(|_| ()),
                Provider::Anthropic => self.require_anthropic_api_key().map(|_| ()),
            }
        }

        pub fn require_newsapi_key(&self) -> anyhow::Result<&str> {
            self.newsapi_key
                .as_deref()
                .context("NEWSAPI_KEY environment variable is required")
        }

        pub fn require_openai_api_key(&self) -> anyhow::Result<&str> {
            self.openai_api_key
                .as_deref()
                .context("OPENAI_API_KEY environment variable is required")
        }

        pub fn require_anthropic_api_key(&self) -> anyhow::Result<&str> {
            self.anthropic_api_key
                .as_deref()
                .context("ANTHROPIC_API_KEY environment variable is required")
        }
    }

}
