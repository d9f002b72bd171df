use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::domain::{CandidateId, Reservation, ReservationView, Week};
use crate::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationsResponse {
    pub reservations: Vec<ReservationView>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    pub candidate_id: i64,
    pub week: Week,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearReservationQuery {
    pub candidate_id: Option<i64>,
    pub week: Option<Week>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearReservationResponse {
    pub removed: u64,
}

pub async fn get_reservations(
    State(state): State<AppState>,
) -> Result<Json<ReservationsResponse>, AppError> {
    let reservations = state.season.list_reservations().await?;
    Ok(Json(ReservationsResponse { reservations }))
}

pub async fn create_reservation(
    State(state): State<AppState>,
    Json(request): Json<CreateReservationRequest>,
) -> Result<Json<Reservation>, AppError> {
    let reservation = state
        .season
        .create_reservation(CandidateId::new(request.candidate_id), request.week)
        .await?;
    Ok(Json(reservation))
}

pub async fn clear_reservation(
    Query(params): Query<ClearReservationQuery>,
    State(state): State<AppState>,
) -> Result<Json<ClearReservationResponse>, AppError> {
    let removed = state
        .season
        .clear_reservation(params.candidate_id.map(CandidateId::new), params.week)
        .await?;
    Ok(Json(ClearReservationResponse { removed }))
}
