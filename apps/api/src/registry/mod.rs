//! Master/instance registry.
//!
//! A master caches one validated question set per owner key for `master_ttl_days`.
//! Instances are per-candidate snapshots of a master, handed out by token; regenerating a
//! master never touches instances that were already issued.

pub mod handlers;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rand::distr::{Alphanumeric, Distribution};
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::AssessmentSettings;
use crate::errors::AppError;
use crate::generation::gateway::QuestionGenerator;
use crate::generation::phrases::{extract_allowed_terms, term_phrases, AllowedTerm};
use crate::generation::request::GenerationRequest;
use crate::models::assessment::{
    MasterTestSetRow, NewInstance, NewMaster, OwnerKey, TestInstanceRow,
};
use crate::models::question::{JobPosting, PublicQuestion};
use crate::quality::diagnostics::Diagnostics;
use crate::quality::QualityPipeline;
use crate::store::AssessmentStore;

pub const TOKEN_LEN: usize = 40;
const TOKEN_INSERT_ATTEMPTS: usize = 3;

/// Result of `get_or_create_master`.
#[derive(Debug, Clone)]
pub struct MasterOutcome {
    pub master: MasterTestSetRow,
    /// True when an active master was found and generation was skipped.
    pub reused: bool,
}

/// Persisted next to the questions of every master.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredQualityReport<'a> {
    allowed_terms: &'a [AllowedTerm],
    diagnostics: &'a Diagnostics,
}

/// Candidate-facing view of an instance.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicTest {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub max_attempts: i32,
    pub questions: Vec<PublicQuestion>,
}

pub struct Registry {
    store: Arc<dyn AssessmentStore>,
    generator: Arc<dyn QuestionGenerator>,
    pipeline: Arc<QualityPipeline>,
    settings: AssessmentSettings,
    owner_locks: Mutex<HashMap<OwnerKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl Registry {
    pub fn new(
        store: Arc<dyn AssessmentStore>,
        generator: Arc<dyn QuestionGenerator>,
        pipeline: Arc<QualityPipeline>,
        settings: AssessmentSettings,
    ) -> Self {
        Self {
            store,
            generator,
            pipeline,
            settings,
            owner_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Single-flight lock for one owner key. Idle entries are pruned on each call.
    fn owner_lock(&self, owner: OwnerKey) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .owner_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks.entry(owner).or_default().clone()
    }

    /// Returns the active master for `owner`, generating one only when none exists.
    pub async fn get_or_create_master(
        &self,
        owner: OwnerKey,
        job: &JobPosting,
        now: DateTime<Utc>,
        rng: &mut StdRng,
    ) -> Result<MasterOutcome, AppError> {
        let lock = self.owner_lock(owner);
        let _guard = lock.lock().await;

        if let Some(master) = self.store.find_active_master(owner, now).await? {
            info!("Reusing master {} for {owner}", master.id);
            return Ok(MasterOutcome {
                master,
                reused: true,
            });
        }

        let new_master = self.build_master(owner, job, now, rng).await?;
        let master = self.store.insert_master(new_master).await?;
        info!("Created master {} for {owner}", master.id);
        Ok(MasterOutcome {
            master,
            reused: false,
        })
    }

    /// Generates a fresh master and retires the previous one in a single store call.
    /// If generation or the write fails the previous master stays active.
    pub async fn regenerate_master(
        &self,
        owner: OwnerKey,
        job: &JobPosting,
        now: DateTime<Utc>,
        rng: &mut StdRng,
    ) -> Result<MasterTestSetRow, AppError> {
        let lock = self.owner_lock(owner);
        let _guard = lock.lock().await;

        let new_master = self.build_master(owner, job, now, rng).await?;
        let master = self.store.replace_master(new_master).await?;
        info!("Regenerated master {} for {owner}", master.id);
        Ok(master)
    }

    async fn build_master(
        &self,
        owner: OwnerKey,
        job: &JobPosting,
        now: DateTime<Utc>,
        rng: &mut StdRng,
    ) -> Result<NewMaster, AppError> {
        if job.details.trim().is_empty() {
            return Err(AppError::Validation(
                "job posting details must not be empty".to_string(),
            ));
        }

        let terms = extract_allowed_terms(&job.full_text());
        let phrases = term_phrases(&terms);
        info!(
            "Generating questions for {owner} with {} allowed terms",
            phrases.len()
        );

        let request = GenerationRequest::new(job.clone(), phrases);
        let raw = self.generator.generate(&request).await?;
        let report = self
            .pipeline
            .run(raw, job, &request.allowed_terms, rng)?;

        let mut diagnostics = report.diagnostics;
        for note in request.quotas.shortfalls(&report.questions) {
            diagnostics.warn(note);
        }

        let quality_report = serde_json::to_value(StoredQualityReport {
            allowed_terms: &terms,
            diagnostics: &diagnostics,
        })
        .map_err(anyhow::Error::from)?;

        Ok(NewMaster {
            owner,
            questions: report.questions,
            quality_report,
            created_at: now,
            expires_at: now + self.settings.master_ttl(),
        })
    }

    /// Issues a new instance with a fresh token and a copy of the master's questions.
    pub async fn create_instance(
        &self,
        master_id: Uuid,
        now: DateTime<Utc>,
        rng: &mut StdRng,
    ) -> Result<TestInstanceRow, AppError> {
        let master = self
            .store
            .find_master(master_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Master test set {master_id} not found")))?;
        if !master.is_active_at(now) {
            return Err(AppError::Expired(format!(
                "Master test set {master_id} expired at {}",
                master.expires_at
            )));
        }

        for attempt in 1..=TOKEN_INSERT_ATTEMPTS {
            let instance = NewInstance {
                master_id,
                token: generate_token(rng),
                questions: master.questions.0.clone(),
                max_attempts: self.settings.max_attempts,
                created_at: now,
                expires_at: now + self.settings.instance_ttl(),
            };
            if let Some(row) = self.store.insert_instance(instance).await? {
                info!("Issued instance {} from master {master_id}", row.id);
                return Ok(row);
            }
            warn!("Token collision on attempt {attempt}, retrying");
        }

        Err(anyhow::anyhow!(
            "could not allocate a unique token after {TOKEN_INSERT_ATTEMPTS} attempts"
        )
        .into())
    }

    /// The instance as a candidate may see it: no answer key, no explanations.
    pub async fn public_view(&self, token: &str, now: DateTime<Utc>) -> Result<PublicTest, AppError> {
        let instance = active_instance(self.store.as_ref(), token, now).await?;
        Ok(PublicTest {
            questions: instance.questions.iter().map(PublicQuestion::from).collect(),
            token: instance.token,
            expires_at: instance.expires_at,
            max_attempts: instance.max_attempts,
        })
    }
}

/// Looks up an instance by token and rejects it once expired.
pub async fn active_instance(
    store: &dyn AssessmentStore,
    token: &str,
    now: DateTime<Utc>,
) -> Result<TestInstanceRow, AppError> {
    let instance = store
        .find_instance_by_token(token)
        .await?
        .ok_or_else(|| AppError::NotFound("Test not found".to_string()))?;
    if instance.is_expired_at(now) {
        return Err(AppError::Expired(format!(
            "Test expired at {}",
            instance.expires_at
        )));
    }
    Ok(instance)
}

pub fn generate_token(rng: &mut StdRng) -> String {
    Alphanumeric
        .sample_iter(rng)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}
