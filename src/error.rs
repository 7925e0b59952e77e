use std::time::Duration;

use thiserror::Error;

use crate::models::PipelineStage;

/// Failure talking to the language-model service
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),

    #[error("authentication rejected ({status}): {body}")]
    Authentication { status: u16, body: String },

    #[error("rate limited: {body}")]
    RateLimited { body: String },

    #[error("provider error ({status}): {body}")]
    Provider { status: u16, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

impl ServiceError {
    /// Whether another attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::RateLimited { .. } | Self::Timeout(_) => true,
            Self::Provider { status, .. } => *status >= 500,
            Self::Authentication { .. } | Self::MalformedResponse(_) => false,
        }
    }
}

/// Errors surfaced to callers of the pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("failed to load formatting examples: {0}")]
    ExampleLoad(String),

    #[error("{stage} stage failed: {source}")]
    Service {
        stage: &'static str,
        #[source]
        source: ServiceError,
    },

    #[error("pipeline stopped at {0:?} before producing a final answer")]
    Incomplete(PipelineStage),

    #[error("invalid stage transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: PipelineStage,
        to: PipelineStage,
    },
}

impl PipelineError {
    pub fn service(stage: &'static str, source: ServiceError) -> Self {
        Self::Service { stage, source }
    }
}

/// Structured model output could not be recovered from the raw text.
///
/// Never leaves the crate: stages swap in a sentinel record instead.
#[derive(Debug, Error)]
#[error("unable to parse assessment: {0}")]
pub(crate) struct AssessmentParseError(pub String);
