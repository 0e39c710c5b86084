//! Meal plan generation: prompt, one completion call, strict parse.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, instrument};

use super::completion::{CompletionProvider, CompletionRequest};
use super::prompt::{build_prompt, PlanPreferences, SYSTEM_INSTRUCTION};
use crate::domain::{Meal, MealPlan, MealPlanRequest, PlanType};
use crate::error::{ApiError, ApiResult};

/// Meal as emitted by the model. Nutrition fields the model may add on its
/// own are ignored; only enrichment fills them.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedMeal {
    name: String,
    ingredients: Vec<String>,
    prep_time_minutes: u32,
    cook_time_minutes: u32,
    instructions: Vec<String>,
    #[serde(with = "rust_decimal::serde::float")]
    estimated_price_usd: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedPlan {
    plan_type: PlanType,
    days: BTreeMap<String, Vec<GeneratedMeal>>,
}

impl From<GeneratedMeal> for Meal {
    fn from(m: GeneratedMeal) -> Self {
        Self {
            name: m.name.trim().to_string(),
            ingredients: m.ingredients,
            prep_time_minutes: m.prep_time_minutes,
            cook_time_minutes: m.cook_time_minutes,
            instructions: m.instructions,
            estimated_price_usd: m.estimated_price_usd.round_dp(2),
            macros: None,
            nutrition_details: None,
            nutrition_source: None,
            nutrition_error: None,
        }
    }
}

/// Parse completion output into a plan and check it matches the request.
///
/// Anything other than a single well-formed JSON document is rejected; no
/// repair is attempted.
pub fn parse_plan(text: &str, request: &MealPlanRequest) -> ApiResult<MealPlan> {
    let generated: GeneratedPlan = serde_json::from_str(text.trim()).map_err(|e| {
        ApiError::Generation(format!("completion output is not a valid meal plan: {}", e))
    })?;

    let plan = MealPlan {
        plan_type: generated.plan_type,
        days: generated
            .days
            .into_iter()
            .map(|(day, meals)| (day, meals.into_iter().map(Meal::from).collect()))
            .collect(),
    };

    plan.validate_shape(request)
        .map_err(|e| ApiError::Generation(format!("meal plan has the wrong shape: {}", e)))?;

    Ok(plan)
}

#[derive(Clone)]
pub struct MealPlanGenerator {
    completion: Arc<dyn CompletionProvider>,
}

impl MealPlanGenerator {
    pub fn new(completion: Arc<dyn CompletionProvider>) -> Self {
        Self { completion }
    }

    #[instrument(skip(self, preferences), fields(plan_type = request.plan_type.as_str()))]
    pub async fn generate(
        &self,
        preferences: &PlanPreferences,
        request: &MealPlanRequest,
        request_id: Option<&str>,
    ) -> ApiResult<MealPlan> {
        let prompt = build_prompt(preferences, request);

        let text = self
            .completion
            .complete(CompletionRequest {
                system: SYSTEM_INSTRUCTION,
                prompt: &prompt,
                request_id,
            })
            .await?;

        let plan = parse_plan(&text, request)?;
        info!(meals = plan.meal_count(), "Meal plan generated");
        Ok(plan)
    }
}
