pub mod health;
pub mod meal_plans;
pub mod profiles;

use axum::{routing::get, routing::post, Router};
use std::sync::Arc;

use crate::app::AppState;

/// Build the API router with all routes
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Public routes
        .route("/health", get(health::health_check))
        // Profile
        .route("/profile", get(profiles::get_my_profile))
        .route("/onboarding", post(profiles::complete_onboarding))
        // Meal plans
        .route(
            "/meal-plans",
            get(meal_plans::meal_plan_status).post(meal_plans::generate_meal_plan),
        )
}
