use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::AppState;
use crate::domain::{Decimal, Event, SegmentStanding};
use crate::error::{AppError, LedgerError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsResponse {
    pub mode: String,
    pub standings: Vec<SegmentStanding>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_event: Option<Event>,
    pub events_total: usize,
    pub events_completed: usize,
    pub commitments: usize,
    pub season_total: Decimal,
    pub standings: Vec<SegmentStanding>,
}

pub async fn get_standings(
    State(state): State<AppState>,
) -> Result<Json<StandingsResponse>, AppError> {
    let standings = state.season.list_segment_standings().await?;
    Ok(Json(StandingsResponse {
        mode: state.season.standings.mode().to_string(),
        standings,
    }))
}

pub async fn rebuild_standings(
    State(state): State<AppState>,
) -> Result<Json<StandingsResponse>, AppError> {
    let standings = state.season.standings.rebuild().await?;
    Ok(Json(StandingsResponse {
        mode: state.season.standings.mode().to_string(),
        standings,
    }))
}

pub async fn get_season_summary(
    State(state): State<AppState>,
) -> Result<Json<SeasonSummary>, AppError> {
    // Runs first so the schedule below reflects date-driven completion.
    let current_event = match state.season.current_event().await {
        Ok(event) => Some(event),
        Err(LedgerError::NoCurrentEvent) => None,
        Err(e) => return Err(e.into()),
    };

    let (schedule, commitments, season_total, standings) = futures::try_join!(
        state.season.schedule(),
        state.season.list_commitments(),
        state.season.ledger.season_total(),
        state.season.list_segment_standings()
    )?;

    Ok(Json(SeasonSummary {
        current_event,
        events_total: schedule.len(),
        events_completed: schedule.iter().filter(|e| e.is_completed).count(),
        commitments: commitments.len(),
        season_total,
        standings,
    }))
}
