use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::{auth::AuthUser, profile::UserProfile, state::AppState};

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub diet_plan: String,
    pub exercise_plan: String,
}

pub fn recommendation_routes() -> Router<AppState> {
    Router::new().route("/recommendations", get(get_recommendations))
}

#[instrument(skip(state))]
pub async fn get_recommendations(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<RecommendationsResponse>, (StatusCode, String)> {
    let row = match state.profiles.get(user_id).await {
        Ok(Some(row)) => row,
        Ok(None) => return Err((StatusCode::NOT_FOUND, "Profile not found".into())),
        Err(e) => {
            error!(error = %e, %user_id, "load profile failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    let profile = UserProfile::try_from(row).map_err(|e| {
        warn!(error = %e, %user_id, "profile not ready for recommendations");
        (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
    })?;

    let plans = state.planner.produce_plans(&profile).await;
    info!(%user_id, "recommendations generated");

    Ok(Json(RecommendationsResponse {
        diet_plan: plans.diet_content,
        exercise_plan: plans.exercise_content,
    }))
}
