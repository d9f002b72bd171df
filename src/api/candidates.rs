use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::domain::Candidate;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidatesQuery {
    /// Only candidates not yet committed.
    pub available: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidatesResponse {
    pub candidates: Vec<Candidate>,
}

pub async fn get_candidates(
    Query(params): Query<CandidatesQuery>,
    State(state): State<AppState>,
) -> Result<Json<CandidatesResponse>, AppError> {
    let candidates = if params.available.unwrap_or(false) {
        state.season.candidates.available().await?
    } else {
        state.season.list_candidates().await?
    };
    Ok(Json(CandidatesResponse { candidates }))
}
