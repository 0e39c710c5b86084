//! Meal plan domain types
//!
//! These mirror the JSON document the completion service is asked to emit,
//! plus the nutrition fields filled in by enrichment.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_MEALS_PER_DAY: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    Daily,
    Weekly,
}

impl PlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
        }
    }

    pub fn day_count(&self) -> usize {
        match self {
            Self::Daily => 1,
            Self::Weekly => 7,
        }
    }

    /// Fixed day keys a plan of this type must contain, in order.
    pub fn day_keys(&self) -> Vec<String> {
        (1..=self.day_count()).map(|d| format!("day{}", d)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MealPlanRequest {
    pub plan_type: PlanType,
    pub meals_per_day: u32,
}

impl MealPlanRequest {
    pub fn new(plan_type: PlanType) -> Self {
        Self {
            plan_type,
            meals_per_day: DEFAULT_MEALS_PER_DAY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Macros {
    pub calories: u32,
    pub protein_grams: u32,
    pub carbs_grams: u32,
    pub fat_grams: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionDetails {
    /// grams
    pub fiber: f64,
    /// milligrams
    pub sodium: f64,
    /// grams
    pub sugar: f64,
    /// milligrams
    pub cholesterol: f64,
    #[serde(rename = "yield")]
    pub servings: f64,
    /// grams
    pub total_weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub name: String,
    pub ingredients: Vec<String>,
    pub prep_time_minutes: u32,
    pub cook_time_minutes: u32,
    pub instructions: Vec<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub estimated_price_usd: Decimal,
    #[serde(default)]
    pub macros: Option<Macros>,
    #[serde(default)]
    pub nutrition_details: Option<NutritionDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlan {
    pub plan_type: PlanType,
    pub days: BTreeMap<String, Vec<Meal>>,
}

impl MealPlan {
    pub fn meal_count(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    /// Check the plan has exactly the day keys and per-day meal counts the
    /// request asked for, and that every meal is usable.
    pub fn validate_shape(&self, request: &MealPlanRequest) -> Result<(), String> {
        if self.plan_type != request.plan_type {
            return Err(format!(
                "expected a {} plan, got {}",
                request.plan_type.as_str(),
                self.plan_type.as_str()
            ));
        }

        let expected = request.plan_type.day_keys();
        let actual: Vec<&String> = self.days.keys().collect();
        if actual.len() != expected.len() || expected.iter().any(|k| !self.days.contains_key(k))
        {
            return Err(format!(
                "expected day keys {:?}, got {:?}",
                expected, actual
            ));
        }

        for (day, meals) in &self.days {
            if meals.len() != request.meals_per_day as usize {
                return Err(format!(
                    "{} has {} meals, expected {}",
                    day,
                    meals.len(),
                    request.meals_per_day
                ));
            }
            for (idx, meal) in meals.iter().enumerate() {
                if meal.name.trim().is_empty() {
                    return Err(format!("{} meal {} has no name", day, idx + 1));
                }
                if meal.ingredients.iter().all(|i| i.trim().is_empty()) {
                    return Err(format!("{} meal '{}' has no ingredients", day, meal.name));
                }
                if meal.estimated_price_usd.is_sign_negative() {
                    return Err(format!("{} meal '{}' has a negative price", day, meal.name));
                }
            }
        }

        Ok(())
    }
}
