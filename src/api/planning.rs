use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::AppState;
use crate::domain::{validate_amounts, Decimal, Tier, Week};
use crate::error::AppError;
use crate::season::Recommendation;

const DEFAULT_RECOMMENDATION_LIMIT: usize = 10;
const MAX_RECOMMENDATION_LIMIT: usize = 200;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvQuery {
    pub tier: String,
    pub purse: String,
    pub multiplier: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvResponse {
    pub tier: Tier,
    pub purse: Decimal,
    pub multiplier: Decimal,
    pub expected_value: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsQuery {
    /// Defaults to the current event's week.
    pub week: Option<Week>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsResponse {
    pub week: Week,
    pub recommendations: Vec<Recommendation>,
}

pub async fn get_ev(
    Query(params): Query<EvQuery>,
    State(state): State<AppState>,
) -> Result<Json<EvResponse>, AppError> {
    let tier = Tier::from_str(&params.tier).map_err(AppError::BadRequest)?;
    let purse = parse_amount("purse", &params.purse)?;
    let multiplier = match params.multiplier.as_deref() {
        Some(m) if !m.trim().is_empty() => parse_amount("multiplier", m)?,
        _ => Decimal::one(),
    };

    validate_amounts(purse, multiplier).map_err(AppError::BadRequest)?;

    let expected_value = state.season.compute_ev(tier, purse, multiplier)?;
    Ok(Json(EvResponse {
        tier,
        purse,
        multiplier,
        expected_value,
    }))
}

pub async fn get_recommendations(
    Query(params): Query<RecommendationsQuery>,
    State(state): State<AppState>,
) -> Result<Json<RecommendationsResponse>, AppError> {
    let week = match params.week {
        Some(week) => week,
        None => state.season.current_event().await?.week,
    };
    let limit = params
        .limit
        .unwrap_or(DEFAULT_RECOMMENDATION_LIMIT)
        .min(MAX_RECOMMENDATION_LIMIT);

    let recommendations = state.season.recommend(week, limit).await?;
    Ok(Json(RecommendationsResponse {
        week,
        recommendations,
    }))
}

fn parse_amount(field: &str, value: &str) -> Result<Decimal, AppError> {
    let amount = Decimal::from_str_canonical(value)
        .map_err(|_| AppError::BadRequest(format!("Invalid {}: {}", field, value)))?;
    if amount.is_negative() {
        return Err(AppError::BadRequest(format!("{} must not be negative", field)));
    }
    Ok(amount)
}
