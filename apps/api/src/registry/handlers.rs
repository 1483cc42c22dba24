use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::assessment::{MasterTestSetRow, OwnerKey};
use crate::models::question::{JobPosting, Question};
use crate::registry::PublicTest;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct MasterRequest {
    pub owner: OwnerKey,
    pub job: JobPosting,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterResponse {
    pub id: Uuid,
    pub owner: OwnerKey,
    pub questions: Vec<Question>,
    pub quality_report: Value,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub reused: bool,
}

impl MasterResponse {
    fn new(owner: OwnerKey, master: MasterTestSetRow, reused: bool) -> Self {
        Self {
            id: master.id,
            owner,
            questions: master.questions.0,
            quality_report: master.quality_report,
            created_at: master.created_at,
            expires_at: master.expires_at,
            reused,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceResponse {
    pub id: Uuid,
    pub master_id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub max_attempts: i32,
}

/// POST /api/v1/assessments/masters
pub async fn handle_get_or_create_master(
    State(state): State<AppState>,
    Json(req): Json<MasterRequest>,
) -> Result<(StatusCode, Json<MasterResponse>), AppError> {
    let mut rng = StdRng::from_os_rng();
    let outcome = state
        .registry
        .get_or_create_master(req.owner, &req.job, Utc::now(), &mut rng)
        .await?;
    let status = if outcome.reused {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((
        status,
        Json(MasterResponse::new(req.owner, outcome.master, outcome.reused)),
    ))
}

/// POST /api/v1/assessments/masters/regenerate
pub async fn handle_regenerate_master(
    State(state): State<AppState>,
    Json(req): Json<MasterRequest>,
) -> Result<(StatusCode, Json<MasterResponse>), AppError> {
    let mut rng = StdRng::from_os_rng();
    let master = state
        .registry
        .regenerate_master(req.owner, &req.job, Utc::now(), &mut rng)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(MasterResponse::new(req.owner, master, false)),
    ))
}

/// POST /api/v1/assessments/masters/:id/instances
pub async fn handle_create_instance(
    State(state): State<AppState>,
    Path(master_id): Path<Uuid>,
) -> Result<(StatusCode, Json<InstanceResponse>), AppError> {
    let mut rng = StdRng::from_os_rng();
    let instance = state
        .registry
        .create_instance(master_id, Utc::now(), &mut rng)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(InstanceResponse {
            id: instance.id,
            master_id: instance.master_id,
            token: instance.token,
            expires_at: instance.expires_at,
            max_attempts: instance.max_attempts,
        }),
    ))
}

/// GET /api/v1/tests/:token
pub async fn handle_get_test(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<PublicTest>, AppError> {
    Ok(Json(state.registry.public_view(&token, Utc::now()).await?))
}
