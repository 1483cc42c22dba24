use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use uuid::Uuid;

use crate::models::assessment::{
    MasterTestSetRow, NewInstance, NewMaster, NewSubmission, OwnerKey, SubmissionRow,
    TestInstanceRow,
};
use crate::store::AssessmentStore;

/// Vec-backed store with the same uniqueness rules as the Postgres schema.
#[derive(Default)]
pub struct MemoryStore {
    masters: Mutex<Vec<MasterTestSetRow>>,
    instances: Mutex<Vec<TestInstanceRow>>,
    submissions: Mutex<Vec<SubmissionRow>>,
    fail_next_master_insert: AtomicBool,
}

impl MemoryStore {
    pub fn masters(&self) -> Vec<MasterTestSetRow> {
        self.masters.lock().unwrap().clone()
    }

    pub fn submissions(&self) -> Vec<SubmissionRow> {
        self.submissions.lock().unwrap().clone()
    }

    /// Makes the next master insert fail, as a dropped connection would.
    pub fn fail_next_master_insert(&self) {
        self.fail_next_master_insert.store(true, Ordering::SeqCst);
    }

    fn master_row(&self, master: NewMaster) -> Result<MasterTestSetRow, sqlx::Error> {
        if self.fail_next_master_insert.swap(false, Ordering::SeqCst) {
            return Err(sqlx::Error::Protocol("connection reset".to_string()));
        }
        Ok(MasterTestSetRow {
            id: Uuid::new_v4(),
            owner_kind: master.owner.kind().to_string(),
            owner_id: master.owner.id(),
            questions: Json(master.questions),
            quality_report: master.quality_report,
            created_at: master.created_at,
            expires_at: master.expires_at,
        })
    }
}

fn owned_by(row: &MasterTestSetRow, owner: OwnerKey) -> bool {
    row.owner_kind == owner.kind() && row.owner_id == owner.id()
}

#[async_trait]
impl AssessmentStore for MemoryStore {
    async fn find_active_master(
        &self,
        owner: OwnerKey,
        now: DateTime<Utc>,
    ) -> Result<Option<MasterTestSetRow>, sqlx::Error> {
        Ok(self
            .masters
            .lock()
            .unwrap()
            .iter()
            .filter(|m| owned_by(m, owner) && m.is_active_at(now))
            .max_by_key(|m| m.created_at)
            .cloned())
    }

    async fn find_master(&self, id: Uuid) -> Result<Option<MasterTestSetRow>, sqlx::Error> {
        Ok(self
            .masters
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.id == id)
            .cloned())
    }

    async fn insert_master(&self, master: NewMaster) -> Result<MasterTestSetRow, sqlx::Error> {
        let row = self.master_row(master)?;
        self.masters.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn replace_master(&self, master: NewMaster) -> Result<MasterTestSetRow, sqlx::Error> {
        let owner = master.owner;
        let now = master.created_at;
        let mut masters = self.masters.lock().unwrap();
        // staged on a copy so a failed insert leaves the table untouched
        let mut staged = masters.clone();
        for m in staged.iter_mut() {
            if owned_by(m, owner) && m.is_active_at(now) {
                m.expires_at = now;
            }
        }
        let row = self.master_row(master)?;
        staged.push(row.clone());
        *masters = staged;
        Ok(row)
    }

    async fn insert_instance(
        &self,
        instance: NewInstance,
    ) -> Result<Option<TestInstanceRow>, sqlx::Error> {
        let mut instances = self.instances.lock().unwrap();
        if instances.iter().any(|i| i.token == instance.token) {
            return Ok(None);
        }
        let row = TestInstanceRow {
            id: Uuid::new_v4(),
            master_id: instance.master_id,
            token: instance.token,
            questions: Json(instance.questions),
            max_attempts: instance.max_attempts,
            created_at: instance.created_at,
            expires_at: instance.expires_at,
        };
        instances.push(row.clone());
        Ok(Some(row))
    }

    async fn find_instance_by_token(
        &self,
        token: &str,
    ) -> Result<Option<TestInstanceRow>, sqlx::Error> {
        Ok(self
            .instances
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.token == token)
            .cloned())
    }

    async fn count_submissions(
        &self,
        instance_id: Uuid,
        candidate_email: &str,
    ) -> Result<i64, sqlx::Error> {
        Ok(self
            .submissions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.instance_id == instance_id && s.candidate_email == candidate_email)
            .count() as i64)
    }

    async fn insert_submission(
        &self,
        submission: NewSubmission,
    ) -> Result<Option<SubmissionRow>, sqlx::Error> {
        let mut submissions = self.submissions.lock().unwrap();
        if submissions.iter().any(|s| {
            s.instance_id == submission.instance_id
                && s.candidate_email == submission.candidate_email
                && s.attempt_number == submission.attempt_number
        }) {
            return Ok(None);
        }
        let row = SubmissionRow {
            id: Uuid::new_v4(),
            instance_id: submission.instance_id,
            candidate_email: submission.candidate_email,
            answers: submission.answers,
            score: submission.score,
            correct_count: submission.correct_count,
            attempt_number: submission.attempt_number,
            started_at: submission.started_at,
            submitted_at: submission.submitted_at,
            metadata: submission.metadata,
        };
        submissions.push(row.clone());
        Ok(Some(row))
    }
}
