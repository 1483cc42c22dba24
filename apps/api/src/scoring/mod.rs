//! Submission & scoring engine.
//!
//! Grades one attempt against the instance snapshot, enforces the per-candidate attempt
//! limit and records an informational flag for suspicious answer patterns.

pub mod handlers;

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::assessment::NewSubmission;
use crate::models::question::{Question, OPTION_COUNT};
use crate::quality::distribution::longest_run;
use crate::registry::active_instance;
use crate::store::AssessmentStore;

pub const POINTS_PER_CORRECT: i32 = 10;
/// Pattern check only applies from this many answers up.
pub const ANOMALY_MIN_ANSWERS: usize = 5;
/// Identical consecutive selections at or above this length are flagged.
pub const ANOMALY_RUN_LENGTH: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerInput {
    pub question_id: i64,
    pub selected_option: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionInput {
    pub candidate_email: String,
    pub answers: Vec<AnswerInput>,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    pub score: i32,
    pub correct_count: i32,
    pub total_questions: usize,
    pub attempt_number: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grade {
    pub correct_count: i32,
    pub score: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerPattern {
    pub longest_identical_run: usize,
    pub anomaly: bool,
}

/// Lowercased, trimmed email used for attempt counting.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate(input: &SubmissionInput) -> Result<String, AppError> {
    let email = normalize_email(&input.candidate_email);
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Validation(
            "candidateEmail must be a valid email address".to_string(),
        ));
    }
    if let Some(bad) = input
        .answers
        .iter()
        .find(|a| !(0..OPTION_COUNT as i64).contains(&a.selected_option))
    {
        return Err(AppError::Validation(format!(
            "selectedOption {} for question {} is out of range 0..={}",
            bad.selected_option,
            bad.question_id,
            OPTION_COUNT - 1
        )));
    }
    Ok(email)
}

/// Counts matches against the answer key. The first answer per question wins; answers to
/// unknown questions are ignored.
pub fn grade(questions: &[Question], answers: &[AnswerInput]) -> Grade {
    let key: HashMap<i64, i64> = questions
        .iter()
        .map(|q| (q.id as i64, q.correct_answer as i64))
        .collect();
    let mut seen = HashSet::new();

    let correct_count = answers
        .iter()
        .filter(|a| seen.insert(a.question_id))
        .filter(|a| key.get(&a.question_id) == Some(&a.selected_option))
        .count() as i32;

    Grade {
        correct_count,
        score: POINTS_PER_CORRECT * correct_count,
    }
}

/// Longest run of identical selections in submission order.
pub fn answer_pattern(answers: &[AnswerInput]) -> AnswerPattern {
    let selections: Vec<i64> = answers.iter().map(|a| a.selected_option).collect();
    let run = longest_run(&selections);
    AnswerPattern {
        longest_identical_run: run,
        anomaly: answers.len() >= ANOMALY_MIN_ANSWERS && run >= ANOMALY_RUN_LENGTH,
    }
}

/// Grades and records one attempt for `token`.
pub async fn submit(
    store: &dyn AssessmentStore,
    token: &str,
    input: SubmissionInput,
    now: DateTime<Utc>,
) -> Result<SubmissionResult, AppError> {
    let instance = active_instance(store, token, now).await?;
    let email = validate(&input)?;

    let grade = grade(&instance.questions, &input.answers);
    let pattern = answer_pattern(&input.answers);
    if pattern.anomaly {
        warn!(
            "Answer pattern anomaly on instance {}: {} identical selections in a row",
            instance.id, pattern.longest_identical_run
        );
    }

    let answers = serde_json::to_value(&input.answers).map_err(anyhow::Error::from)?;
    let metadata = json!({
        "antiCheat": input.metadata,
        "answerPatternAnomaly": pattern.anomaly,
        "longestIdenticalRun": pattern.longest_identical_run,
    });

    // a concurrent submit can take our attempt number between count and insert
    for _ in 0..2 {
        let prior = store.count_submissions(instance.id, &email).await?;
        if prior >= i64::from(instance.max_attempts) {
            return Err(AppError::LimitExceeded(format!(
                "All {} attempts have been used",
                instance.max_attempts
            )));
        }
        let attempt_number = prior as i32 + 1;

        let inserted = store
            .insert_submission(NewSubmission {
                instance_id: instance.id,
                candidate_email: email.clone(),
                answers: answers.clone(),
                score: grade.score,
                correct_count: grade.correct_count,
                attempt_number,
                started_at: input.started_at,
                submitted_at: now,
                metadata: metadata.clone(),
            })
            .await?;

        if inserted.is_some() {
            info!(
                "Recorded attempt {attempt_number}/{} on instance {}: score {}",
                instance.max_attempts, instance.id, grade.score
            );
            return Ok(SubmissionResult {
                score: grade.score,
                correct_count: grade.correct_count,
                total_questions: instance.questions.len(),
                attempt_number,
            });
        }
        warn!(
            "Attempt {attempt_number} on instance {} was taken concurrently; recounting",
            instance.id
        );
    }

    Err(AppError::LimitExceeded(
        "Another submission for this attempt is in progress".to_string(),
    ))
}
