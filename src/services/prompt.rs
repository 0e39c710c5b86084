//! Prompt construction for meal plan generation.
//!
//! Everything here is pure string building; profile values are interpolated
//! as-is.

use crate::domain::{Goal, MealPlanRequest, PlanType, Profile};

/// System instruction sent with every meal plan prompt.
pub const SYSTEM_INSTRUCTION: &str = "You are a professional nutritionist and meal planning \
expert. Always respond with valid JSON only and do not include any text before or after the \
JSON output.";

pub const FALLBACK_BMR: i32 = 2000;
pub const FALLBACK_COOKING_TIME_MINUTES: i32 = 30;

/// Profile attributes the generator works from.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanPreferences {
    pub basal_metabolic_rate: i32,
    pub goal: Goal,
    /// Allergies followed by dietary restrictions, de-duplicated.
    pub restrictions: Vec<String>,
    pub cooking_time_minutes: i32,
    pub preferred_cuisine: String,
}

impl PlanPreferences {
    pub fn from_profile(profile: &Profile, preferred_cuisine: &str) -> Self {
        let mut restrictions: Vec<String> = Vec::new();
        for item in profile
            .allergies
            .iter()
            .chain(profile.dietary_restrictions.iter())
        {
            let item = item.trim();
            if !item.is_empty()
                && !restrictions
                    .iter()
                    .any(|existing| existing.eq_ignore_ascii_case(item))
            {
                restrictions.push(item.to_string());
            }
        }

        Self {
            basal_metabolic_rate: profile.basal_metabolic_rate.unwrap_or(FALLBACK_BMR),
            goal: profile.goal.unwrap_or(Goal::HealthyEating),
            restrictions,
            cooking_time_minutes: profile
                .preferred_cooking_time_minutes
                .unwrap_or(FALLBACK_COOKING_TIME_MINUTES),
            preferred_cuisine: preferred_cuisine.to_string(),
        }
    }

    pub fn restrictions_text(&self) -> String {
        if self.restrictions.is_empty() {
            "none".to_string()
        } else {
            self.restrictions.join(", ")
        }
    }
}

const MEAL_TEMPLATE: &str = r#"      {
        "name": "Dish Name",
        "ingredients": [
          "150 g ingredient 1",
          "1 tbsp ingredient 2",
          "2 cups ingredient 3"
        ],
        "prepTimeMinutes": 10,
        "cookTimeMinutes": 20,
        "instructions": [
          "Step 1: Clear instruction",
          "Step 2: Clear instruction",
          "Step 3: Clear instruction"
        ],
        "estimatedPriceUsd": 4.50
      }"#;

/// JSON skeleton the model must fill in, with one example meal per day key.
fn output_template(plan_type: PlanType) -> String {
    let days = plan_type
        .day_keys()
        .iter()
        .map(|key| format!("    \"{}\": [\n{}\n    ]", key, MEAL_TEMPLATE))
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        "{{\n  \"planType\": \"{}\",\n  \"days\": {{\n{}\n  }}\n}}",
        plan_type.as_str(),
        days
    )
}

pub fn build_prompt(preferences: &PlanPreferences, request: &MealPlanRequest) -> String {
    let meals = request.meals_per_day;
    let minutes = preferences.cooking_time_minutes;
    let goal = preferences.goal.describe();

    let (plan_label, meal_count_rule) = match request.plan_type {
        PlanType::Daily => (
            "daily".to_string(),
            format!("Provide exactly {} meals for day1.", meals),
        ),
        PlanType::Weekly => (
            "7-day weekly".to_string(),
            format!(
                "Provide exactly {} meals for each of the 7 days (day1 through day7), {} meals \
                 in total. Do not repeat a dish name anywhere in the week.",
                meals,
                meals * 7
            ),
        ),
    };

    format!(
        "Create a {plan_label} meal plan with the following requirements:

Daily energy needs (activity-adjusted basal metabolic rate): {bmr} kcal
Goal: {goal}
Dietary restrictions / allergies: {restrictions}
Cooking time limit per meal (prep + cook): {minutes} minutes
Preferred cuisine: {cuisine}

{meal_count_rule}
Align every meal with the goal of {goal} and size portions for the daily energy needs above.
Avoid any and all of the listed dietary restrictions and allergies, including as minor ingredients or garnishes.
Keep prepTimeMinutes plus cookTimeMinutes at or below {minutes} minutes for every meal.
List every ingredient with a quantity and unit, for example \"150 g chicken breast\".
Write simple, step-by-step cooking instructions that include food safety guidance such as safe internal temperatures and proper handling of raw ingredients where relevant.
Give a realistic estimatedPriceUsd for each meal based on typical US grocery prices for the listed ingredients.

Return ONLY a JSON object in exactly this format, replacing the placeholder values to describe each meal. Do not include any text before or after the JSON:
{template}",
        plan_label = plan_label,
        bmr = preferences.basal_metabolic_rate,
        goal = goal,
        restrictions = preferences.restrictions_text(),
        minutes = minutes,
        cuisine = preferences.preferred_cuisine,
        meal_count_rule = meal_count_rule,
        template = output_template(request.plan_type),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ActivityLevel;
    use chrono::Utc;
    use uuid::Uuid;

    fn profile() -> Profile {
        Profile {
            id: Uuid::new_v4(),
            email: None,
            height_cm: Some(170.0),
            weight_kg: Some(70.0),
            sex: None,
            age: Some(35),
            basal_metabolic_rate: Some(1800),
            goal: Some(Goal::WeightLoss),
            allergies: vec!["peanuts".into()],
            dietary_restrictions: vec![],
            preferred_cooking_time_minutes: Some(30),
            activity_level: Some(ActivityLevel::Light),
            is_onboarded: true,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn daily_prompt_interpolates_profile() {
        let prefs = PlanPreferences::from_profile(&profile(), "Middle Eastern");
        let prompt = build_prompt(&prefs, &MealPlanRequest::new(PlanType::Daily));

        assert!(prompt.contains("1800"));
        assert!(prompt.contains("weight loss"));
        assert!(prompt.contains("peanuts"));
        assert!(prompt.contains("30 minutes"));
        assert!(prompt.contains("Middle Eastern"));
        assert!(prompt.contains("exactly 3 meals for day1"));
        assert!(prompt.contains("\"day1\""));
        assert!(!prompt.contains("\"day2\""));
        assert!(prompt.trim_end().ends_with('}'));
    }

    #[test]
    fn weekly_prompt_has_seven_day_keys() {
        let prefs = PlanPreferences::from_profile(&profile(), "Thai");
        let prompt = build_prompt(&prefs, &MealPlanRequest::new(PlanType::Weekly));

        for day in 1..=7 {
            assert!(prompt.contains(&format!("\"day{}\"", day)));
        }
        assert!(!prompt.contains("\"day8\""));
        assert!(prompt.contains("21 meals in total"));
        assert!(prompt.contains("\"planType\": \"weekly\""));
    }

    #[test]
    fn template_is_valid_json() {
        for plan_type in [PlanType::Daily, PlanType::Weekly] {
            let value: serde_json::Value =
                serde_json::from_str(&output_template(plan_type)).unwrap();
            let days = value["days"].as_object().unwrap();
            assert_eq!(days.len(), plan_type.day_count());
        }
    }

    #[test]
    fn empty_restrictions_render_as_none() {
        let mut p = profile();
        p.allergies.clear();
        let prefs = PlanPreferences::from_profile(&p, "Italian");
        assert_eq!(prefs.restrictions_text(), "none");
        let prompt = build_prompt(&prefs, &MealPlanRequest::new(PlanType::Daily));
        assert!(prompt.contains("Dietary restrictions / allergies: none"));
    }

    #[test]
    fn merges_allergies_and_restrictions() {
        let mut p = profile();
        p.allergies = vec!["Peanuts".into(), "shellfish".into()];
        p.dietary_restrictions = vec!["peanuts".into(), "pork".into(), " ".into()];
        let prefs = PlanPreferences::from_profile(&p, "Italian");
        assert_eq!(prefs.restrictions_text(), "Peanuts, shellfish, pork");
    }

    #[test]
    fn falls_back_when_profile_is_sparse() {
        let mut p = profile();
        p.basal_metabolic_rate = None;
        p.goal = None;
        p.preferred_cooking_time_minutes = None;
        let prefs = PlanPreferences::from_profile(&p, "Italian");
        assert_eq!(prefs.basal_metabolic_rate, FALLBACK_BMR);
        assert_eq!(prefs.goal, Goal::HealthyEating);
        assert_eq!(prefs.cooking_time_minutes, FALLBACK_COOKING_TIME_MINUTES);
    }
}
