//! Profile domain types
//!
//! Physiological and preference attributes collected during onboarding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Nutrition goal selected during onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Goal {
    WeightLoss,
    WeightGain,
    HealthyEating,
    MuscleGain,
}

impl Goal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WeightLoss => "WEIGHT_LOSS",
            Self::WeightGain => "WEIGHT_GAIN",
            Self::HealthyEating => "HEALTHY_EATING",
            Self::MuscleGain => "MUSCLE_GAIN",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "WEIGHT_LOSS" => Some(Self::WeightLoss),
            "WEIGHT_GAIN" => Some(Self::WeightGain),
            "HEALTHY_EATING" => Some(Self::HealthyEating),
            "MUSCLE_GAIN" => Some(Self::MuscleGain),
            _ => None,
        }
    }

    /// Natural-language phrasing used in prompts.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::WeightLoss => "weight loss",
            Self::WeightGain => "healthy weight gain",
            Self::HealthyEating => "healthy, balanced eating",
            Self::MuscleGain => "muscle gain",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sedentary => "SEDENTARY",
            Self::Light => "LIGHT",
            Self::Moderate => "MODERATE",
            Self::Active => "ACTIVE",
            Self::VeryActive => "VERY_ACTIVE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SEDENTARY" => Some(Self::Sedentary),
            "LIGHT" => Some(Self::Light),
            "MODERATE" => Some(Self::Moderate),
            "ACTIVE" => Some(Self::Active),
            "VERY_ACTIVE" => Some(Self::VeryActive),
            _ => None,
        }
    }

    pub fn multiplier(&self) -> f64 {
        match self {
            Self::Sedentary => 1.2,
            Self::Light => 1.375,
            Self::Moderate => 1.55,
            Self::Active => 1.725,
            Self::VeryActive => 1.9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sex {
    Male,
    Female,
    Other,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "MALE",
            Self::Female => "FEMALE",
            Self::Other => "OTHER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "MALE" => Some(Self::Male),
            "FEMALE" => Some(Self::Female),
            "OTHER" => Some(Self::Other),
            _ => None,
        }
    }
}

/// User profile entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    pub email: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub sex: Option<Sex>,
    pub age: Option<i32>,
    pub basal_metabolic_rate: Option<i32>,
    pub goal: Option<Goal>,
    pub allergies: Vec<String>,
    pub dietary_restrictions: Vec<String>,
    pub preferred_cooking_time_minutes: Option<i32>,
    pub activity_level: Option<ActivityLevel>,
    pub is_onboarded: bool,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for completing onboarding.
///
/// Required fields are optional here so that a missing field produces a
/// readable 400 instead of a deserialization rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingRequest {
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub sex: Option<Sex>,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    #[serde(default)]
    pub preferred_cooking_time: Option<i32>,
    #[serde(default)]
    pub activity_level: Option<ActivityLevel>,
    #[serde(default)]
    pub goal: Option<Goal>,
}

/// Validated onboarding data ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct OnboardingProfile {
    pub height_cm: f64,
    pub weight_kg: f64,
    pub sex: Sex,
    pub age: i32,
    pub allergies: Vec<String>,
    pub dietary_restrictions: Vec<String>,
    pub preferred_cooking_time_minutes: Option<i32>,
    pub activity_level: ActivityLevel,
    pub goal: Option<Goal>,
    pub basal_metabolic_rate: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OnboardingError {
    MissingFields,
    NonPositive,
}

impl std::fmt::Display for OnboardingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingFields => write!(
                f,
                "Missing required fields: height, weight, sex, age, and activityLevel are required"
            ),
            Self::NonPositive => write!(f, "Height, weight, and age must be positive numbers"),
        }
    }
}

impl OnboardingRequest {
    pub fn validate(self) -> Result<OnboardingProfile, OnboardingError> {
        let (Some(height), Some(weight), Some(sex), Some(age), Some(activity_level)) =
            (self.height, self.weight, self.sex, self.age, self.activity_level)
        else {
            return Err(OnboardingError::MissingFields);
        };

        if height <= 0.0 || weight <= 0.0 || age <= 0 {
            return Err(OnboardingError::NonPositive);
        }

        let basal_metabolic_rate =
            activity_adjusted_bmr(weight, height, age, sex, activity_level);

        Ok(OnboardingProfile {
            height_cm: height,
            weight_kg: weight,
            sex,
            age,
            allergies: clean_list(self.allergies),
            dietary_restrictions: clean_list(self.dietary_restrictions),
            preferred_cooking_time_minutes: self.preferred_cooking_time.filter(|m| *m > 0),
            activity_level,
            goal: self.goal,
            basal_metabolic_rate,
        })
    }
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Mifflin-St Jeor basal metabolic rate scaled by activity level.
///
/// `Other` uses the mean of the male and female equations.
pub fn activity_adjusted_bmr(
    weight_kg: f64,
    height_cm: f64,
    age: i32,
    sex: Sex,
    activity_level: ActivityLevel,
) -> i32 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age);
    let bmr = match sex {
        Sex::Male => base + 5.0,
        Sex::Female => base - 161.0,
        Sex::Other => ((base + 5.0) + (base - 161.0)) / 2.0,
    };
    (bmr * activity_level.multiplier()).round() as i32
}

/// Onboarding response body
#[derive(Debug, Clone, Serialize)]
pub struct OnboardingResponse {
    pub user: Profile,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> OnboardingRequest {
        OnboardingRequest {
            height: Some(180.0),
            weight: Some(80.0),
            sex: Some(Sex::Male),
            age: Some(30),
            allergies: vec!["peanuts".into(), "  ".into()],
            dietary_restrictions: vec![" pork ".into()],
            preferred_cooking_time: Some(30),
            activity_level: Some(ActivityLevel::Moderate),
            goal: Some(Goal::WeightLoss),
        }
    }

    #[test]
    fn bmr_follows_mifflin_st_jeor() {
        // 10*80 + 6.25*180 - 5*30 + 5 = 1780; * 1.2 = 2136
        assert_eq!(
            activity_adjusted_bmr(80.0, 180.0, 30, Sex::Male, ActivityLevel::Sedentary),
            2136
        );
        // 1780 - 166 = 1614; * 1.9 = 3066.6
        assert_eq!(
            activity_adjusted_bmr(80.0, 180.0, 30, Sex::Female, ActivityLevel::VeryActive),
            3067
        );
        // mean of 1780 and 1614 = 1697; * 1.55 = 2630.35
        assert_eq!(
            activity_adjusted_bmr(80.0, 180.0, 30, Sex::Other, ActivityLevel::Moderate),
            2630
        );
    }

    #[test]
    fn validate_cleans_lists_and_computes_bmr() {
        let profile = request().validate().unwrap();
        assert_eq!(profile.allergies, vec!["peanuts".to_string()]);
        assert_eq!(profile.dietary_restrictions, vec!["pork".to_string()]);
        assert_eq!(profile.basal_metabolic_rate, 2759);
    }

    #[test]
    fn validate_rejects_missing_and_non_positive() {
        let missing = OnboardingRequest {
            activity_level: None,
            ..request()
        };
        assert_eq!(missing.validate(), Err(OnboardingError::MissingFields));

        let negative = OnboardingRequest {
            age: Some(0),
            ..request()
        };
        assert_eq!(negative.validate(), Err(OnboardingError::NonPositive));
    }

    #[test]
    fn enums_use_screaming_snake_case() {
        let goal: Goal = serde_json::from_str("\"MUSCLE_GAIN\"").unwrap();
        assert_eq!(goal, Goal::MuscleGain);
        assert_eq!(
            serde_json::to_string(&ActivityLevel::VeryActive).unwrap(),
            "\"VERY_ACTIVE\""
        );
        assert_eq!(Sex::parse(Sex::Female.as_str()), Some(Sex::Female));
    }
}
