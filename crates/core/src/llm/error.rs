use crate::llm::Provider;
use std::fmt;

/// Carries enough of a failed provider exchange to debug it from the logs.
#[derive(Debug, Clone)]
pub struct LlmDiagnosticsError {
    pub provider: Provider,
    pub stage: &'static str,
    pub detail: String,
    pub raw_output: Option<String>,
}

impl LlmDiagnosticsError {
    pub fn http(provider: Provider, status: reqwest::StatusCode, body: String) -> Self {
        Self {
            provider,
            stage: "http",
            detail: format!("status={status}"),
            raw_output: Some(body),
        }
    }
}

impl fmt::Display for LlmDiagnosticsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LLM error (provider={}, stage={}): {}",
            self.provider, self.stage, self.detail
        )
    }
}

impl std::error::Error for LlmDiagnosticsError {}
