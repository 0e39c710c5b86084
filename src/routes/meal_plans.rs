//! Meal plan endpoints
//!
//! `POST /meal-plans` runs the full pipeline for the signed-in user:
//! profile lookup, prompt, one completion call, then nutrition enrichment.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::MessageResponse;
use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::domain::{MealPlan, MealPlanRequest, PlanType};
use crate::error::{ApiError, ApiResult};
use crate::middleware::RequestIdExt;
use crate::services::PlanPreferences;

const PLAN_TYPE_REQUIRED: &str = "planType is required and must be \"daily\" or \"weekly\"";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateMealPlanBody {
    #[serde(default)]
    pub plan_type: Option<PlanType>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    pub plan_type: PlanType,
    pub user_id: Uuid,
    pub preferences: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanResponse {
    pub success: bool,
    pub meal_plan: MealPlan,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugInfo>,
}

/// POST /meal-plans
pub async fn generate_meal_plan(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    headers: HeaderMap,
    payload: Result<Json<GenerateMealPlanBody>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let profile = state
        .profiles
        .find_profile(auth.user_id)
        .await?
        .filter(|p| p.is_onboarded)
        .ok_or(ApiError::OnboardingRequired)?;

    let plan_type = payload
        .ok()
        .and_then(|Json(body)| body.plan_type)
        .ok_or_else(|| ApiError::bad_request(PLAN_TYPE_REQUIRED))?;

    let request = MealPlanRequest::new(plan_type);
    let preferences = PlanPreferences::from_profile(&profile, &state.settings.preferred_cuisine);

    tracing::info!(
        user_id = %auth.user_id,
        plan_type = plan_type.as_str(),
        "Generating meal plan"
    );

    let plan = state
        .generator
        .generate(&preferences, &request, headers.request_id())
        .await?;

    let meal_plan = state.enricher.enrich(plan).await;

    let debug = state.settings.env.is_dev().then(|| DebugInfo {
        plan_type,
        user_id: auth.user_id,
        preferences: format!(
            "bmr={} goal={} restrictions={} cooking_time={}m cuisine={}",
            preferences.basal_metabolic_rate,
            preferences.goal.as_str(),
            preferences.restrictions_text(),
            preferences.cooking_time_minutes,
            preferences.preferred_cuisine
        ),
        timestamp: Utc::now(),
    });

    Ok(Json(MealPlanResponse {
        success: true,
        meal_plan,
        debug,
    }))
}

/// GET /meal-plans
pub async fn meal_plan_status() -> MessageResponse {
    MessageResponse::with_method("Meal Plan API is working", "GET")
}
