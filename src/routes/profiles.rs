//! Profile routes
//!
//! Onboarding and profile lookup for the signed-in user.

use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::api::DataResponse;
use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::domain::profile::{OnboardingRequest, OnboardingResponse};
use crate::error::{ApiError, ApiResult};

/// GET /profile
pub async fn get_my_profile(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
) -> ApiResult<impl IntoResponse> {
    let profile = state
        .profiles
        .find_profile(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(DataResponse::new(profile)))
}

/// POST /onboarding
///
/// Validates the onboarding form, computes the activity-adjusted BMR and
/// marks the user onboarded.
pub async fn complete_onboarding(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    payload: Result<Json<OnboardingRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(req) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let onboarding = req
        .validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    tracing::debug!(
        user_id = %auth.user_id,
        bmr = onboarding.basal_metabolic_rate,
        "Completing onboarding"
    );

    let user = state
        .profiles
        .complete_onboarding(auth.user_id, &onboarding)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    tracing::info!(user_id = %auth.user_id, "Onboarding completed");

    Ok(Json(OnboardingResponse {
        user,
        message: "Onboarding completed successfully".to_string(),
    }))
}
