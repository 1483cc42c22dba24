// Question generation: phrase extraction, prompt construction and the rate-limited
// generator gateway. All LLM calls go through llm_client.

pub mod gateway;
pub mod limiter;
pub mod phrases;
pub mod prompts;
pub mod request;

use thiserror::Error;

use crate::llm_client::LlmError;

/// Hard generation failures. None of them leave a partial master behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("generator returned malformed output: {0}")]
    MalformedOutput(String),

    #[error("generator returned {actual} questions, expected {expected}")]
    WrongCount { expected: usize, actual: usize },

    #[error("generation rate limit exhausted")]
    RateLimited,

    #[error("generation timed out")]
    Timeout,

    #[error("generator unavailable: {0}")]
    Upstream(String),
}

impl From<LlmError> for GenerationError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::RateLimited { .. } => GenerationError::RateLimited,
            other => GenerationError::Upstream(other.to_string()),
        }
    }
}
