use serde::{Deserialize, Serialize};

/// Number of questions in every generated test.
pub const QUESTION_COUNT: usize = 10;
/// Number of answer options per question.
pub const OPTION_COUNT: usize = 4;

/// Competency area a question probes. Quotas per category are requested from the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Technical,
    Situational,
    Experience,
}

/// A single multiple-choice question as produced by the generator and repaired by QC.
///
/// JSON uses camelCase (`correctAnswer`) because that is the shape the generation prompt asks for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(default)]
    pub id: u8,
    pub category: Category,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: u8,
    #[serde(default)]
    pub explanation: String,
}

impl Question {
    /// True when the question carries exactly four options and an in-range correct index.
    pub fn is_well_formed(&self) -> bool {
        self.options.len() == OPTION_COUNT && (self.correct_answer as usize) < OPTION_COUNT
    }

    pub fn correct_index(&self) -> usize {
        self.correct_answer as usize
    }
}

/// Candidate-facing projection of a question: no answer key, no explanation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuestion {
    pub id: u8,
    pub category: Category,
    pub question: String,
    pub options: Vec<String>,
}

impl From<&Question> for PublicQuestion {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id,
            category: q.category,
            question: q.question.clone(),
            options: q.options.clone(),
        }
    }
}

/// Free text of a job posting. Only `details` is required to be non-empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobPosting {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub department: String,
    pub details: String,
}

impl JobPosting {
    /// Title, department and details joined into one block for phrase extraction.
    pub fn full_text(&self) -> String {
        [self.title.as_str(), self.department.as_str(), self.details.as_str()]
            .iter()
            .filter(|s| !s.trim().is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Ten well-formed questions, all keyed to option 0, with explanations echoing option 0.
    pub fn sample_questions() -> Vec<Question> {
        (0..QUESTION_COUNT)
            .map(|i| {
                let category = match i % 3 {
                    0 => Category::Technical,
                    1 => Category::Situational,
                    _ => Category::Experience,
                };
                Question {
                    id: (i + 1) as u8,
                    category,
                    question: format!("Question {} about stock tracking in the warehouse?", i + 1),
                    options: vec![
                        format!("Record stock movements in the inventory system {i}"),
                        format!("Wait for the weekly report before acting {i}"),
                        format!("Ask the shift lead to decide on counts {i}"),
                        format!("Compare paper lists at the end of month {i}"),
                    ],
                    correct_answer: 0,
                    explanation: format!(
                        "Recording stock movements in the inventory system keeps counts accurate {i}"
                    ),
                }
            })
            .collect()
    }
}
