//! Generator gateway: the only path from a `GenerationRequest` to raw questions.
//!
//! Success means exactly `question_count` well-formed questions; anything else is a hard
//! failure and nothing downstream is persisted.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use crate::generation::limiter::GenerationLimiter;
use crate::generation::prompts::TEST_GENERATION_SYSTEM;
use crate::generation::request::{build_prompt, GenerationRequest};
use crate::generation::GenerationError;
use crate::llm_client::{strip_json_fences, Completion};
use crate::models::question::Question;

#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<Question>, GenerationError>;
}

/// Production generator: rate-limited, time-bounded LLM completion plus strict parsing.
pub struct LlmQuestionGenerator {
    llm: Arc<dyn Completion>,
    limiter: GenerationLimiter,
    timeout: Duration,
}

impl LlmQuestionGenerator {
    pub fn new(llm: Arc<dyn Completion>, limiter: GenerationLimiter, timeout: Duration) -> Self {
        Self {
            llm,
            limiter,
            timeout,
        }
    }
}

#[async_trait]
impl QuestionGenerator for LlmQuestionGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<Question>, GenerationError> {
        let _permit = self.limiter.acquire().await?;
        let prompt = build_prompt(request);

        let raw = tokio::time::timeout(
            self.timeout,
            self.llm.complete(&prompt, TEST_GENERATION_SYSTEM),
        )
        .await
        .map_err(|_| {
            warn!("Generation timed out after {}s", self.timeout.as_secs());
            GenerationError::Timeout
        })??;

        let questions = parse_questions(&raw, request.question_count).inspect_err(|e| {
            warn!("Rejected generator output: {e}");
        })?;
        info!("Generator returned {} questions", questions.len());
        Ok(questions)
    }
}

/// Parses model output into exactly `expected` questions, renumbering ids from 1.
///
/// Accepts a bare array or `{"questions": [...]}`, optionally inside markdown fences.
pub fn parse_questions(raw: &str, expected: usize) -> Result<Vec<Question>, GenerationError> {
    let value: Value = serde_json::from_str(strip_json_fences(raw))
        .map_err(|e| GenerationError::MalformedOutput(format!("not JSON: {e}")))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("questions") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(GenerationError::MalformedOutput(
                    "object without a \"questions\" array".to_string(),
                ))
            }
        },
        _ => {
            return Err(GenerationError::MalformedOutput(
                "expected a JSON array of questions".to_string(),
            ))
        }
    };

    if items.len() != expected {
        return Err(GenerationError::WrongCount {
            expected,
            actual: items.len(),
        });
    }

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let mut question: Question = serde_json::from_value(item).map_err(|e| {
                GenerationError::MalformedOutput(format!("question {}: {e}", i + 1))
            })?;
            if !question.is_well_formed() {
                return Err(GenerationError::MalformedOutput(format!(
                    "question {} has {} options and correctAnswer {}",
                    i + 1,
                    question.options.len(),
                    question.correct_answer
                )));
            }
            question.id = (i + 1) as u8;
            Ok(question)
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;
    use crate::models::question::fixtures::sample_questions;
    use crate::models::question::JobPosting;

    struct FixedCompletion(Result<String, fn() -> LlmError>);

    #[async_trait]
    impl Completion for FixedCompletion {
        async fn complete(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
            self.0.clone().map_err(|make| make())
        }
    }

    struct SlowCompletion;

    #[async_trait]
    impl Completion for SlowCompletion {
        async fn complete(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
            tokio::time::sleep(Duration::from_secs(600)).await;
            Ok("[]".to_string())
        }
    }

    fn generator(llm: Arc<dyn Completion>) -> LlmQuestionGenerator {
        LlmQuestionGenerator::new(
            llm,
            GenerationLimiter::new(1, Duration::ZERO, Duration::from_secs(5)),
            Duration::from_secs(120),
        )
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new(
            JobPosting {
                details: "Warehouse stock tracking".to_string(),
                ..Default::default()
            },
            vec!["stock tracking".to_string()],
        )
    }

    fn sample_json() -> String {
        serde_json::to_string(&sample_questions()).unwrap()
    }

    #[test]
    fn test_parse_bare_array() {
        let questions = parse_questions(&sample_json(), 10).unwrap();
        assert_eq!(questions, sample_questions());
    }

    #[test]
    fn test_parse_fenced_wrapper_object() {
        let raw = format!("```json\n{{\"questions\": {}}}\n```", sample_json());
        assert_eq!(parse_questions(&raw, 10).unwrap().len(), 10);
    }

    #[test]
    fn test_ids_renumbered_in_order() {
        let mut questions = sample_questions();
        for q in questions.iter_mut() {
            q.id = 42;
        }
        let raw = serde_json::to_string(&questions).unwrap();
        let ids: Vec<u8> = parse_questions(&raw, 10)
            .unwrap()
            .iter()
            .map(|q| q.id)
            .collect();
        assert_eq!(ids, (1..=10).collect::<Vec<u8>>());
    }

    #[test]
    fn test_wrong_count() {
        let raw = serde_json::to_string(&sample_questions()[..9]).unwrap();
        assert_eq!(
            parse_questions(&raw, 10).unwrap_err(),
            GenerationError::WrongCount {
                expected: 10,
                actual: 9
            }
        );
    }

    #[test]
    fn test_malformed_outputs() {
        assert!(matches!(
            parse_questions("Sure! Here are your questions:", 10),
            Err(GenerationError::MalformedOutput(_))
        ));
        assert!(matches!(
            parse_questions("{\"items\": []}", 10),
            Err(GenerationError::MalformedOutput(_))
        ));

        let mut questions = sample_questions();
        questions[4].options.pop();
        let raw = serde_json::to_string(&questions).unwrap();
        assert!(matches!(
            parse_questions(&raw, 10),
            Err(GenerationError::MalformedOutput(msg)) if msg.contains("question 5")
        ));

        let mut questions = sample_questions();
        questions[0].correct_answer = 4;
        let raw = serde_json::to_string(&questions).unwrap();
        assert!(matches!(
            parse_questions(&raw, 10),
            Err(GenerationError::MalformedOutput(_))
        ));
    }

    #[tokio::test]
    async fn test_generate_success() {
        let llm = Arc::new(FixedCompletion(Ok(sample_json())));
        let questions = generator(llm).generate(&request()).await.unwrap();
        assert_eq!(questions.len(), 10);
    }

    #[tokio::test]
    async fn test_llm_rate_limit_maps_to_rate_limited() {
        let llm = Arc::new(FixedCompletion(Err(|| LlmError::RateLimited { retries: 3 })));
        let err = generator(llm).generate(&request()).await.unwrap_err();
        assert_eq!(err, GenerationError::RateLimited);
    }

    #[tokio::test]
    async fn test_other_llm_failure_maps_to_upstream() {
        let llm = Arc::new(FixedCompletion(Err(|| LlmError::Api {
            status: 400,
            message: "bad request".to_string(),
        })));
        let err = generator(llm).generate(&request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::Upstream(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_completion_times_out() {
        let err = generator(Arc::new(SlowCompletion))
            .generate(&request())
            .await
            .unwrap_err();
        assert_eq!(err, GenerationError::Timeout);
    }
}
