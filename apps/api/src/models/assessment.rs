use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::question::Question;

/// What a master test set is cached against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum OwnerKey {
    JobPosting(Uuid),
    Analysis(Uuid),
}

impl OwnerKey {
    pub fn kind(&self) -> &'static str {
        match self {
            OwnerKey::JobPosting(_) => "job_posting",
            OwnerKey::Analysis(_) => "analysis",
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            OwnerKey::JobPosting(id) | OwnerKey::Analysis(id) => *id,
        }
    }
}

impl std::fmt::Display for OwnerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id())
    }
}

/// Cached, validated question set for one owner key.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MasterTestSetRow {
    pub id: Uuid,
    pub owner_kind: String,
    pub owner_id: Uuid,
    pub questions: Json<Vec<Question>>,
    /// QC diagnostics captured when the set was generated.
    pub quality_report: Value,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl MasterTestSetRow {
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// A tokened, time-limited snapshot of a master's questions.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TestInstanceRow {
    pub id: Uuid,
    pub master_id: Uuid,
    pub token: String,
    pub questions: Json<Vec<Question>>,
    pub max_attempts: i32,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl TestInstanceRow {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// One graded attempt. Never updated after insert.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SubmissionRow {
    pub id: Uuid,
    pub instance_id: Uuid,
    pub candidate_email: String,
    pub answers: Value,
    pub score: i32,
    pub correct_count: i32,
    pub attempt_number: i32,
    pub started_at: DateTime<Utc>,
    pub submitted_at: DateTime<Utc>,
    pub metadata: Value,
}

/// Insert payload for a master; the store assigns nothing but may reject on constraint.
#[derive(Debug, Clone)]
pub struct NewMaster {
    pub owner: OwnerKey,
    pub questions: Vec<Question>,
    pub quality_report: Value,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewInstance {
    pub master_id: Uuid,
    pub token: String,
    pub questions: Vec<Question>,
    pub max_attempts: i32,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub instance_id: Uuid,
    pub candidate_email: String,
    pub answers: Value,
    pub score: i32,
    pub correct_count: i32,
    pub attempt_number: i32,
    pub started_at: DateTime<Utc>,
    pub submitted_at: DateTime<Utc>,
    pub metadata: Value,
}
