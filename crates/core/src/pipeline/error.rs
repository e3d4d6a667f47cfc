use crate::llm::error::LlmDiagnosticsError;
use std::fmt;

/// Pipeline step that produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Discovery,
    Extraction,
    AnalysisData,
    Analysis,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Discovery => "discovery",
            Stage::Extraction => "extraction",
            Stage::AnalysisData => "analysis-data",
            Stage::Analysis => "analysis",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct OrchestrationError {
    pub stage: Stage,
    pub source: anyhow::Error,
}

impl OrchestrationError {
    pub fn new(stage: Stage, source: anyhow::Error) -> Self {
        Self { stage, source }
    }

    /// The provider exchange behind a failed generation stage, if there was one.
    pub fn llm_diagnostics(&self) -> Option<&LlmDiagnosticsError> {
        self.source.downcast_ref::<LlmDiagnosticsError>()
    }
}

impl fmt::Display for OrchestrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "recommendation failed at stage={}: {:#}", self.stage, self.source)
    }
}

impl std::error::Error for OrchestrationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

/// Tags any error with the stage it happened in.
pub trait StageContext<T> {
    fn stage(self, stage: Stage) -> Result<T, OrchestrationError>;
}

impl<T> StageContext<T> for anyhow::Result<T> {
    fn stage(self, stage: Stage) -> Result<T, OrchestrationError> {
        self.map_err(|source| OrchestrationError::new(stage, source))
    }
}
