use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::domain::{Event, EventId};
use crate::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsResponse {
    pub events: Vec<Event>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteEventRequest {
    pub winner: Option<String>,
}

pub async fn get_events(State(state): State<AppState>) -> Result<Json<EventsResponse>, AppError> {
    let events = state.season.schedule().await?;
    Ok(Json(EventsResponse { events }))
}

pub async fn get_current_event(State(state): State<AppState>) -> Result<Json<Event>, AppError> {
    Ok(Json(state.season.current_event().await?))
}

/// The body is optional; without one the event is completed with no winner.
pub async fn complete_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Option<Json<CompleteEventRequest>>,
) -> Result<Json<Event>, AppError> {
    let Json(request) = body.unwrap_or_default();
    let event = state
        .season
        .complete_event(EventId::new(id), request.winner.as_deref())
        .await?;
    Ok(Json(event))
}
