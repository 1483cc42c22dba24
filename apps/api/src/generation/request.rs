//! Generation request construction. Pure, no I/O.

use serde::{Deserialize, Serialize};

use crate::generation::prompts::TEST_GENERATION_PROMPT_TEMPLATE;
use crate::models::question::{Category, JobPosting, Question, QUESTION_COUNT};

/// Minimum questions per category. A soft target: QC reports shortfalls but never rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryQuotas {
    pub technical: usize,
    pub situational: usize,
    pub experience: usize,
}

impl Default for CategoryQuotas {
    fn default() -> Self {
        Self {
            technical: 3,
            situational: 4,
            experience: 2,
        }
    }
}

impl CategoryQuotas {
    /// Human-readable notes for every category below its minimum.
    pub fn shortfalls(&self, questions: &[Question]) -> Vec<String> {
        [
            (Category::Technical, "technical", self.technical),
            (Category::Situational, "situational", self.situational),
            (Category::Experience, "experience", self.experience),
        ]
        .into_iter()
        .filter_map(|(category, name, minimum)| {
            let actual = questions.iter().filter(|q| q.category == category).count();
            (actual < minimum)
                .then(|| format!("Only {actual} {name} questions (target at least {minimum})"))
        })
        .collect()
    }
}

/// Everything the generator needs for one test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub job: JobPosting,
    pub allowed_terms: Vec<String>,
    pub quotas: CategoryQuotas,
    pub question_count: usize,
}

impl GenerationRequest {
    pub fn new(job: JobPosting, allowed_terms: Vec<String>) -> Self {
        Self {
            job,
            allowed_terms,
            quotas: CategoryQuotas::default(),
            question_count: QUESTION_COUNT,
        }
    }
}

/// Fills the generation template from a request.
pub fn build_prompt(request: &GenerationRequest) -> String {
    let terms = if request.allowed_terms.is_empty() {
        "(none extracted)".to_string()
    } else {
        request
            .allowed_terms
            .iter()
            .map(|t| format!("- {t}"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let or_unknown = |s: &str| {
        if s.trim().is_empty() {
            "(not specified)".to_string()
        } else {
            s.trim().to_string()
        }
    };

    TEST_GENERATION_PROMPT_TEMPLATE
        .replace("{question_count}", &request.question_count.to_string())
        .replace("{technical_min}", &request.quotas.technical.to_string())
        .replace("{situational_min}", &request.quotas.situational.to_string())
        .replace("{experience_min}", &request.quotas.experience.to_string())
        .replace("{title}", &or_unknown(&request.job.title))
        .replace("{department}", &or_unknown(&request.job.department))
        .replace("{allowed_terms}", &terms)
        // last: posting text may itself contain braces
        .replace("{details}", request.job.details.trim())
}
