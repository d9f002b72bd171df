pub mod candidates;
pub mod commitments;
pub mod events;
pub mod health;
pub mod planning;
pub mod reservations;
pub mod standings;

use crate::config::Config;
use crate::db::Repository;
use crate::season::Season;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub season: Season,
    pub repo: Arc<Repository>,
    pub config: Config,
}

impl AppState {
    pub fn new(season: Season, repo: Arc<Repository>, config: Config) -> Self {
        Self {
            season,
            repo,
            config,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/season", get(standings::get_season_summary))
        .route("/v1/events", get(events::get_events))
        .route("/v1/events/current", get(events::get_current_event))
        .route("/v1/events/:id/complete", post(events::complete_event))
        .route("/v1/candidates", get(candidates::get_candidates))
        .route(
            "/v1/reservations",
            get(reservations::get_reservations)
                .post(reservations::create_reservation)
                .delete(reservations::clear_reservation),
        )
        .route(
            "/v1/commitments",
            get(commitments::get_commitments).post(commitments::create_commitment),
        )
        .route(
            "/v1/commitments/:id/result",
            post(commitments::record_result),
        )
        .route("/v1/standings", get(standings::get_standings))
        .route("/v1/standings/rebuild", post(standings::rebuild_standings))
        .route("/v1/ev", get(planning::get_ev))
        .route("/v1/recommendations", get(planning::get_recommendations))
        .layer(cors)
        .with_state(state)
}
