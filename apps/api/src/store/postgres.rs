use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::{PgPool, Postgres};
use tracing::debug;
use uuid::Uuid;

use crate::models::assessment::{
    MasterTestSetRow, NewInstance, NewMaster, NewSubmission, OwnerKey, SubmissionRow,
    TestInstanceRow,
};
use crate::store::AssessmentStore;

const INSERT_MASTER: &str = r#"
    INSERT INTO master_test_sets
        (id, owner_kind, owner_id, questions, quality_report, created_at, expires_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
    RETURNING *
"#;

fn bind_master(
    query: QueryAs<'_, Postgres, MasterTestSetRow, PgArguments>,
    master: NewMaster,
) -> QueryAs<'_, Postgres, MasterTestSetRow, PgArguments> {
    query
        .bind(Uuid::new_v4())
        .bind(master.owner.kind())
        .bind(master.owner.id())
        .bind(Json(master.questions))
        .bind(master.quality_report)
        .bind(master.created_at)
        .bind(master.expires_at)
}

#[derive(Clone)]
pub struct PgAssessmentStore {
    pool: PgPool,
}

impl PgAssessmentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssessmentStore for PgAssessmentStore {
    async fn find_active_master(
        &self,
        owner: OwnerKey,
        now: DateTime<Utc>,
    ) -> Result<Option<MasterTestSetRow>, sqlx::Error> {
        sqlx::query_as::<_, MasterTestSetRow>(
            r#"
            SELECT * FROM master_test_sets
            WHERE owner_kind = $1 AND owner_id = $2 AND expires_at > $3
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(owner.kind())
        .bind(owner.id())
        .bind(now)
        .fetch_optional(&self.pool)
        .await
    }

    async fn find_master(&self, id: Uuid) -> Result<Option<MasterTestSetRow>, sqlx::Error> {
        sqlx::query_as::<_, MasterTestSetRow>("SELECT * FROM master_test_sets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn insert_master(&self, master: NewMaster) -> Result<MasterTestSetRow, sqlx::Error> {
        bind_master(sqlx::query_as(INSERT_MASTER), master)
            .fetch_one(&self.pool)
            .await
    }

    async fn replace_master(&self, master: NewMaster) -> Result<MasterTestSetRow, sqlx::Error> {
        let owner = master.owner;
        let now = master.created_at;
        let mut tx = self.pool.begin().await?;

        let expired = sqlx::query(
            r#"
            UPDATE master_test_sets SET expires_at = $3
            WHERE owner_kind = $1 AND owner_id = $2 AND expires_at > $3
            "#,
        )
        .bind(owner.kind())
        .bind(owner.id())
        .bind(now)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let row = bind_master(sqlx::query_as(INSERT_MASTER), master)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        debug!("Expired {expired} master(s) for {owner}");
        Ok(row)
    }

    async fn insert_instance(
        &self,
        instance: NewInstance,
    ) -> Result<Option<TestInstanceRow>, sqlx::Error> {
        sqlx::query_as::<_, TestInstanceRow>(
            r#"
            INSERT INTO test_instances
                (id, master_id, token, questions, max_attempts, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (token) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(instance.master_id)
        .bind(instance.token)
        .bind(Json(instance.questions))
        .bind(instance.max_attempts)
        .bind(instance.created_at)
        .bind(instance.expires_at)
        .fetch_optional(&self.pool)
        .await
    }

    async fn find_instance_by_token(
        &self,
        token: &str,
    ) -> Result<Option<TestInstanceRow>, sqlx::Error> {
        sqlx::query_as::<_, TestInstanceRow>("SELECT * FROM test_instances WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
    }

    async fn count_submissions(
        &self,
        instance_id: Uuid,
        candidate_email: &str,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM submissions WHERE instance_id = $1 AND candidate_email = $2",
        )
        .bind(instance_id)
        .bind(candidate_email)
        .fetch_one(&self.pool)
        .await
    }

    async fn insert_submission(
        &self,
        submission: NewSubmission,
    ) -> Result<Option<SubmissionRow>, sqlx::Error> {
        sqlx::query_as::<_, SubmissionRow>(
            r#"
            INSERT INTO submissions
                (id, instance_id, candidate_email, answers, score, correct_count,
                 attempt_number, started_at, submitted_at, metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (instance_id, candidate_email, attempt_number) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(submission.instance_id)
        .bind(submission.candidate_email)
        .bind(submission.answers)
        .bind(submission.score)
        .bind(submission.correct_count)
        .bind(submission.attempt_number)
        .bind(submission.started_at)
        .bind(submission.submitted_at)
        .bind(submission.metadata)
        .fetch_optional(&self.pool)
        .await
    }
}
