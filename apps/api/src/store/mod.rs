//! Storage seam for masters, instances and submissions.
//!
//! `AppState` holds an `Arc<dyn AssessmentStore>`; production uses `PgAssessmentStore`,
//! tests use the in-memory store. Inserts that hit a uniqueness constraint return `None`
//! so callers can retry without parsing database error codes.

#[cfg(test)]
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::assessment::{
    MasterTestSetRow, NewInstance, NewMaster, NewSubmission, OwnerKey, SubmissionRow,
    TestInstanceRow,
};

pub use postgres::PgAssessmentStore;

#[async_trait]
pub trait AssessmentStore: Send + Sync {
    /// Newest master for `owner` that has not expired at `now`.
    async fn find_active_master(
        &self,
        owner: OwnerKey,
        now: DateTime<Utc>,
    ) -> Result<Option<MasterTestSetRow>, sqlx::Error>;

    async fn find_master(&self, id: Uuid) -> Result<Option<MasterTestSetRow>, sqlx::Error>;

    async fn insert_master(&self, master: NewMaster) -> Result<MasterTestSetRow, sqlx::Error>;

    /// Ends every active master of `master.owner` at `master.created_at` and inserts
    /// `master`, atomically. On error the previous master stays active.
    async fn replace_master(&self, master: NewMaster) -> Result<MasterTestSetRow, sqlx::Error>;

    /// `None` when the token is already taken.
    async fn insert_instance(
        &self,
        instance: NewInstance,
    ) -> Result<Option<TestInstanceRow>, sqlx::Error>;

    async fn find_instance_by_token(
        &self,
        token: &str,
    ) -> Result<Option<TestInstanceRow>, sqlx::Error>;

    async fn count_submissions(
        &self,
        instance_id: Uuid,
        candidate_email: &str,
    ) -> Result<i64, sqlx::Error>;

    /// `None` when (instance, email, attempt number) already exists.
    async fn insert_submission(
        &self,
        submission: NewSubmission,
    ) -> Result<Option<SubmissionRow>, sqlx::Error>;
}
