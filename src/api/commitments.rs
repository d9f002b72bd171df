use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::domain::{
    CandidateId, Commitment, CommitmentId, CommitmentView, Decimal, EventId, FinishPosition,
    ScoredResult,
};
use crate::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitmentsResponse {
    pub commitments: Vec<CommitmentView>,
    pub season_total: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommitmentRequest {
    pub event_id: i64,
    pub candidate_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordResultRequest {
    /// Absent for a missed cut or withdrawal.
    pub finish_position: Option<FinishPosition>,
    /// Actual reported amount as a decimal string; overrides the payout table.
    pub reported_earnings: Option<Decimal>,
}

pub async fn get_commitments(
    State(state): State<AppState>,
) -> Result<Json<CommitmentsResponse>, AppError> {
    let (commitments, season_total) = futures::try_join!(
        state.season.list_commitments(),
        state.season.ledger.season_total()
    )?;
    Ok(Json(CommitmentsResponse {
        commitments,
        season_total,
    }))
}

pub async fn create_commitment(
    State(state): State<AppState>,
    Json(request): Json<CreateCommitmentRequest>,
) -> Result<(StatusCode, Json<Commitment>), AppError> {
    let commitment = state
        .season
        .commit(
            EventId::new(request.event_id),
            CandidateId::new(request.candidate_id),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(commitment)))
}

pub async fn record_result(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<RecordResultRequest>,
) -> Result<Json<ScoredResult>, AppError> {
    let scored = state
        .season
        .record_result(
            CommitmentId::new(id),
            request.finish_position,
            request.reported_earnings,
        )
        .await?;
    Ok(Json(scored))
}
