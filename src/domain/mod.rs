//! Domain types and DTOs
//!
//! Profiles collected at onboarding and the meal plans generated from them.

pub mod meal_plan;
pub mod profile;

pub use meal_plan::{Macros, Meal, MealPlan, MealPlanRequest, NutritionDetails, PlanType};
pub use profile::{ActivityLevel, Goal, Profile, Sex};
