use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::{error, info, instrument, warn};

use crate::{auth::AuthUser, state::AppState};

use super::dto::{StoredProfile, UpdateProfileRequest};

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).put(update_profile))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<StoredProfile>, (StatusCode, String)> {
    match state.profiles.get(user_id).await {
        Ok(Some(row)) => Ok(Json(row)),
        Ok(None) => Err((StatusCode::NOT_FOUND, "Profile not found".into())),
        Err(e) => {
            error!(error = %e, %user_id, "load profile failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<StoredProfile>, (StatusCode, String)> {
    let payload = payload.normalize().map_err(|e| {
        warn!(error = %e, %user_id, "rejected profile update");
        (StatusCode::BAD_REQUEST, e.to_string())
    })?;

    let row = state.profiles.upsert(user_id, &payload).await.map_err(|e| {
        error!(error = %e, %user_id, "save profile failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    info!(%user_id, "profile updated");
    Ok(Json(row))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::{app::build_app, auth::test_token, state::AppState};

    #[tokio::test]
    async fn put_then_get_profile() {
        let state = AppState::fake();
        let user_id = Uuid::new_v4();
        let token = test_token(&state, user_id);
        let app = build_app(state);

        let body = json!({
            "age": 30,
            "gender": "female",
            "weight_kg": 60.0,
            "height_cm": 165.0,
            "dietary_preference": "vegan",
            "activity_level": "moderate",
            "goal": "weight_loss"
        });
        let res = app
            .clone()
            .oneshot(
                Request::put("/api/v1/profile")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let res = app
            .oneshot(
                Request::get("/api/v1/profile")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let saved: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(saved["age"], 30);
        assert_eq!(saved["dietary_preference"], "vegan");
    }

    #[tokio::test]
    async fn invalid_profile_is_bad_request() {
        let state = AppState::fake();
        let token = test_token(&state, Uuid::new_v4());
        let app = build_app(state);

        let body = json!({
            "age": 30,
            "gender": "female",
            "weight_kg": -60.0,
            "height_cm": 165.0,
            "dietary_preference": "no",
            "activity_level": "moderate",
            "goal": "weight_loss"
        });
        let res = app
            .oneshot(
                Request::put("/api/v1/profile")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_profile_is_not_found() {
        let state = AppState::fake();
        let token = test_token(&state, Uuid::new_v4());
        let res = build_app(state)
            .oneshot(
                Request::get("/api/v1/profile")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
