pub mod anthropic;
pub mod error;
pub mod openai;

use crate::config::Settings;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Anthropic,
    OpenAI,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Anthropic => "anthropic",
            Provider::OpenAI => "openai",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAI),
            "anthropic" => Ok(Provider::Anthropic),
            other => anyhow::bail!("unknown LLM_PROVIDER {other:?} (expected openai or anthropic)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// One chat-completion call: ordered messages plus an output token cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
}

#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    fn provider(&self) -> Provider;

    /// Returns the generated text. Empty text is returned as-is; callers decide whether that is
    /// a failure.
    async fn complete(&self, request: ChatRequest) -> anyhow::Result<String>;
}

/// Builds the client selected by `LLM_PROVIDER`.
pub fn client_from_settings(settings: &Settings) -> anyhow::Result<Arc<dyn LlmClient>> {
    Ok(match settings.llm_provider {
        Provider::OpenAI => Arc::new(openai::OpenAiClient::from_settings(settings)?),
        Provider::Anthropic => Arc::new(anthropic::AnthropicClient::from_settings(settings)?),
    })
}
