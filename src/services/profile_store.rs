//! Profile repository
//!
//! The pipeline only reads profiles; onboarding is the single writer.

use axum::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::profile::{OnboardingProfile, Profile};
use crate::domain::{ActivityLevel, Goal, Sex};
use crate::error::ApiError;

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, ApiError>;

    /// Persist onboarding data and mark the user onboarded.
    /// Returns `None` when the user does not exist.
    async fn complete_onboarding(
        &self,
        user_id: Uuid,
        onboarding: &OnboardingProfile,
    ) -> Result<Option<Profile>, ApiError>;

    async fn health_check(&self) -> bool;
}

/// Database row for a user profile
#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    email: Option<String>,
    height_cm: Option<f64>,
    weight_kg: Option<f64>,
    sex: Option<String>,
    age: Option<i32>,
    bmr: Option<i32>,
    goal: Option<String>,
    allergies: Vec<String>,
    dietary_restrictions: Vec<String>,
    preferred_cooking_time: Option<i32>,
    activity_level: Option<String>,
    is_onboarded: bool,
    updated_at: DateTime<Utc>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            height_cm: row.height_cm,
            weight_kg: row.weight_kg,
            sex: row.sex.as_deref().and_then(Sex::parse),
            age: row.age,
            basal_metabolic_rate: row.bmr,
            goal: row.goal.as_deref().and_then(Goal::parse),
            allergies: row.allergies,
            dietary_restrictions: row.dietary_restrictions,
            preferred_cooking_time_minutes: row.preferred_cooking_time,
            activity_level: row.activity_level.as_deref().and_then(ActivityLevel::parse),
            is_onboarded: row.is_onboarded,
            updated_at: row.updated_at,
        }
    }
}

const PROFILE_COLUMNS: &str = "id, email, height_cm, weight_kg, sex, age, bmr, goal, allergies, \
dietary_restrictions, preferred_cooking_time, activity_level, is_onboarded, updated_at";

#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, ApiError> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            PROFILE_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Profile::from))
    }

    async fn complete_onboarding(
        &self,
        user_id: Uuid,
        onboarding: &OnboardingProfile,
    ) -> Result<Option<Profile>, ApiError> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            r#"
            UPDATE users SET
                height_cm = $2,
                weight_kg = $3,
                sex = $4,
                age = $5,
                allergies = $6,
                dietary_restrictions = $7,
                preferred_cooking_time = $8,
                activity_level = $9,
                bmr = $10,
                goal = $11,
                is_onboarded = TRUE,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        ))
        .bind(user_id)
        .bind(onboarding.height_cm)
        .bind(onboarding.weight_kg)
        .bind(onboarding.sex.as_str())
        .bind(onboarding.age)
        .bind(&onboarding.allergies)
        .bind(&onboarding.dietary_restrictions)
        .bind(onboarding.preferred_cooking_time_minutes)
        .bind(onboarding.activity_level.as_str())
        .bind(onboarding.basal_metabolic_rate)
        .bind(onboarding.goal.map(|g| g.as_str()))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Profile::from))
    }

    async fn health_check(&self) -> bool {
        crate::db::health_check(&self.pool).await
    }
}
