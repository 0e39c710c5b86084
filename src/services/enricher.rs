//! Nutrition enrichment of generated meal plans.
//!
//! Every meal is analyzed independently with bounded concurrency and a
//! per-meal timeout. A failed meal is marked with `nutrition_error` and
//! never fails the plan. Day keys, meal count and meal order are preserved.

use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

use super::nutrition::NutritionProvider;
use crate::domain::{Meal, MealPlan};

#[derive(Clone)]
pub struct NutritionEnricher {
    provider: Arc<dyn NutritionProvider>,
    concurrency: usize,
    per_meal_timeout: Duration,
}

impl NutritionEnricher {
    pub fn new(
        provider: Arc<dyn NutritionProvider>,
        concurrency: usize,
        per_meal_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            concurrency: concurrency.max(1),
            per_meal_timeout,
        }
    }

    #[instrument(skip_all, fields(meals = plan.meal_count()))]
    pub async fn enrich(&self, plan: MealPlan) -> MealPlan {
        let MealPlan { plan_type, days } = plan;

        let mut enriched: BTreeMap<String, Vec<Meal>> =
            days.keys().map(|day| (day.clone(), Vec::new())).collect();

        let flattened = days
            .into_iter()
            .flat_map(|(day, meals)| meals.into_iter().map(move |meal| (day.clone(), meal)));

        // `buffered` yields results in input order
        let results: Vec<(String, Meal)> = stream::iter(flattened)
            .map(|(day, meal)| {
                let this = self.clone();
                async move { (day, this.enrich_meal(meal).await) }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let failed = results
            .iter()
            .filter(|(_, meal)| meal.nutrition_error.is_some())
            .count();

        for (day, meal) in results {
            enriched.entry(day).or_default().push(meal);
        }

        info!(failed, "Meal plan enrichment finished");

        MealPlan {
            plan_type,
            days: enriched,
        }
    }

    async fn enrich_meal(&self, mut meal: Meal) -> Meal {
        let outcome =
            tokio::time::timeout(self.per_meal_timeout, self.provider.analyze(&meal.ingredients))
                .await;

        let error = match outcome {
            Ok(Ok(facts)) => {
                meal.macros = Some(facts.macros);
                meal.nutrition_details = Some(facts.details);
                meal.nutrition_source = Some(self.provider.source().to_string());
                meal.nutrition_error = None;
                return meal;
            }
            Ok(Err(e)) => format!("Nutrition analysis failed: {}", e),
            Err(_) => format!(
                "Nutrition analysis timed out after {}s",
                self.per_meal_timeout.as_secs_f32()
            ),
        };

        warn!(meal = %meal.name, error = %error, "Meal left without nutrition data");
        meal.macros = None;
        meal.nutrition_details = None;
        meal.nutrition_source = None;
        meal.nutrition_error = Some(error);
        meal
    }
}
