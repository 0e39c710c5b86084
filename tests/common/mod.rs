//! Shared fixtures for router-level tests: in-memory profile store, scripted
//! completion and nutrition providers, and session token minting.

#![allow(dead_code)]

use axum::{
    async_trait,
    body::{to_bytes, Body},
    http::{Request, Response},
    Router,
};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use mealplanner_backend::{
    app::{create_app, AppState},
    auth::Claims,
    config::{Environment, Settings},
    domain::{
        profile::{OnboardingProfile, Profile},
        ActivityLevel, Goal, Macros, NutritionDetails, PlanType,
    },
    error::ApiError,
    services::{
        nutrition::{NutritionError, NutritionFacts},
        CompletionProvider, CompletionRequest, NutritionProvider, ProfileStore,
    },
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

pub const SESSION_SECRET: &str = "test-session-secret";

pub fn settings_for(env: Environment) -> Settings {
    Settings {
        env,
        server_addr: "127.0.0.1:0".into(),
        database_url: "postgres://localhost/unused".into(),
        database_max_connections: 1,
        cors_allow_origins: vec!["http://localhost:3000".into()],
        session_jwt_secret: SESSION_SECRET.into(),
        session_jwt_issuer: None,
        openai_api_key: "unused".into(),
        openai_base_url: "http://localhost:1".into(),
        openai_model: "test-model".into(),
        openai_timeout_seconds: 5,
        edamam_app_id: "unused".into(),
        edamam_app_key: "unused".into(),
        edamam_base_url: "http://localhost:1".into(),
        nutrition_timeout_seconds: 2,
        nutrition_concurrency: 2,
        nutrition_requests_per_second: 100.0,
        nutrition_burst: 10,
        preferred_cuisine: "Middle Eastern".into(),
    }
}

pub fn session_token(user_id: Uuid) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: Some(now),
        exp: now + 3600,
        iss: None,
        email: Some("cook@example.com".into()),
        name: Some("Cook".into()),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SESSION_SECRET.as_bytes()),
    )
    .expect("encode session token")
}

pub fn onboarded_profile(id: Uuid) -> Profile {
    Profile {
        id,
        email: Some("cook@example.com".into()),
        height_cm: Some(165.0),
        weight_kg: Some(68.0),
        sex: None,
        age: Some(34),
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

pub fn new_user(id: Uuid) -> Profile {
    Profile {
        height_cm: None,
        weight_kg: None,
        age: None,
        basal_metabolic_rate: None,
        goal: None,
        allergies: vec![],
        preferred_cooking_time_minutes: None,
        activity_level: None,
        is_onboarded: false,
        ..onboarded_profile(id)
    }
}

#[derive(Default)]
pub struct InMemoryProfiles {
    pub profiles: Mutex<HashMap<Uuid, Profile>>,
}

impl InMemoryProfiles {
    pub fn with(profiles: Vec<Profile>) -> Arc<Self> {
        Arc::new(Self {
            profiles: Mutex::new(profiles.into_iter().map(|p| (p.id, p)).collect()),
        })
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfiles {
    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, ApiError> {
        Ok(self.profiles.lock().get(&user_id).cloned())
    }

    async fn complete_onboarding(
        &self,
        user_id: Uuid,
        onboarding: &OnboardingProfile,
    ) -> Result<Option<Profile>, ApiError> {
        let mut profiles = self.profiles.lock();
        let Some(profile) = profiles.get_mut(&user_id) else {
            return Ok(None);
        };
        profile.height_cm = Some(onboarding.height_cm);
        profile.weight_kg = Some(onboarding.weight_kg);
        profile.sex = Some(onboarding.sex);
        profile.age = Some(onboarding.age);
        profile.allergies = onboarding.allergies.clone();
        profile.dietary_restrictions = onboarding.dietary_restrictions.clone();
        profile.preferred_cooking_time_minutes = onboarding.preferred_cooking_time_minutes;
        profile.activity_level = Some(onboarding.activity_level);
        profile.basal_metabolic_rate = Some(onboarding.basal_metabolic_rate);
        profile.goal = onboarding.goal;
        profile.is_onboarded = true;
        profile.updated_at = Utc::now();
        Ok(Some(profile.clone()))
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    RateLimited,
    Unavailable,
}

/// Completion provider that returns a fixed reply and records prompts.
pub struct ScriptedCompletion {
    reply: Reply,
    pub prompts: Mutex<Vec<String>>,
    pub systems: Mutex<Vec<String>>,
}

impl ScriptedCompletion {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            prompts: Mutex::new(Vec::new()),
            systems: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().len()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedCompletion {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, ApiError> {
        self.prompts.lock().push(request.prompt.to_string());
        self.systems.lock().push(request.system.to_string());
        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::RateLimited => Err(ApiError::RateLimited("429 from upstream".into())),
            Reply::Unavailable => Err(ApiError::UpstreamUnavailable("connection refused".into())),
        }
    }

    async fn health_check(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Nutrition provider that fails for ingredient lists containing "unknown".
#[derive(Default)]
pub struct FakeNutrition {
    pub calls: Mutex<usize>,
}

#[async_trait]
impl NutritionProvider for FakeNutrition {
    fn source(&self) -> &'static str {
        "edamam"
    }

    async fn analyze(&self, ingredients: &[String]) -> Result<NutritionFacts, NutritionError> {
        *self.calls.lock() += 1;
        if ingredients.iter().any(|i| i.contains("unknown")) {
            return Err(NutritionError::Http {
                status: 555,
                message: "Insufficient quality to process".into(),
            });
        }
        Ok(NutritionFacts {
            macros: Macros {
                calories: 450,
                protein_grams: 35,
                carbs_grams: 40,
                fat_grams: 15,
            },
            details: NutritionDetails {
                fiber: 6.5,
                sodium: 410.0,
                sugar: 5.2,
                cholesterol: 80.0,
                servings: 1.0,
                total_weight: 380.0,
            },
        })
    }
}

pub fn meal_json(name: &str, first_ingredient: &str) -> Value {
    json!({
        "name": name,
        "ingredients": [first_ingredient, "1 tbsp olive oil", "1/2 lemon, juiced"],
        "prepTimeMinutes": 10,
        "cookTimeMinutes": 15,
        "instructions": [
            "Step 1: Wash hands and prep ingredients",
            "Step 2: Cook chicken to an internal temperature of 74C",
            "Step 3: Plate and serve"
        ],
        "estimatedPriceUsd": 5.25
    })
}

/// Completion output for a plan of the given type with `meals_per_day`
/// uniquely named meals per day.
pub fn plan_json(plan_type: PlanType, meals_per_day: usize) -> String {
    let days: serde_json::Map<String, Value> = plan_type
        .day_keys()
        .into_iter()
        .map(|day| {
            let meals: Vec<Value> = (1..=meals_per_day)
                .map(|n| meal_json(&format!("{} dish {}", day, n), "150 g chicken breast"))
                .collect();
            (day, Value::Array(meals))
        })
        .collect();

    json!({ "planType": plan_type.as_str(), "days": days }).to_string()
}

pub struct TestApp {
    pub router: Router,
    pub profiles: Arc<InMemoryProfiles>,
    pub completion: Arc<ScriptedCompletion>,
    pub nutrition: Arc<FakeNutrition>,
}

pub fn test_app(profiles: Vec<Profile>, reply: Reply) -> TestApp {
    test_app_in(Environment::Staging, profiles, reply)
}

pub fn test_app_in(env: Environment, profiles: Vec<Profile>, reply: Reply) -> TestApp {
    let profiles = InMemoryProfiles::with(profiles);
    let completion = ScriptedCompletion::new(reply);
    let nutrition = Arc::new(FakeNutrition::default());

    let state = AppState::new(
        settings_for(env),
        profiles.clone(),
        completion.clone(),
        nutrition.clone(),
    );

    TestApp {
        router: create_app(state),
        profiles,
        completion,
        nutrition,
    }
}

pub fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("build request")
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).expect("build request")
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}
