//! Nutrition analysis client (Edamam nutrition-details API).
//!
//! Outbound requests are paced by a token bucket and transient failures
//! (429, 5xx, network) are retried with exponential backoff.

use anyhow::{Context, Result};
use axum::async_trait;
use backoff::ExponentialBackoffBuilder;
use reqwest::{header::RETRY_AFTER, Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use super::rate_limit::TokenBucket;
use crate::domain::{Macros, NutritionDetails};

/// Measured nutrition for one meal's ingredient list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NutritionFacts {
    pub macros: Macros,
    pub details: NutritionDetails,
}

#[derive(Debug, Error)]
pub enum NutritionError {
    #[error("nutrition service rate limited the request")]
    RateLimited { retry_after: Option<Duration> },

    #[error("nutrition service returned {status}: {message}")]
    Http { status: u16, message: String },

    #[error("nutrition service unreachable: {0}")]
    Network(String),

    #[error("invalid nutrition response: {0}")]
    Parse(String),

    #[error("nutrition service could not analyze the ingredients")]
    NoData,
}

impl NutritionError {
    fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Network(_) => true,
            Self::Http { status, .. } => *status >= 500 && *status != 555,
            Self::Parse(_) | Self::NoData => false,
        }
    }
}

#[async_trait]
pub trait NutritionProvider: Send + Sync {
    /// Identifier recorded on enriched meals.
    fn source(&self) -> &'static str;

    async fn analyze(&self, ingredients: &[String]) -> Result<NutritionFacts, NutritionError>;
}

/// Edamam nutrient codes
mod codes {
    pub const ENERGY: &str = "ENERC_KCAL";
    pub const PROTEIN: &str = "PROCNT";
    pub const CARBS: &str = "CHOCDF";
    pub const FAT: &str = "FAT";
    pub const FIBER: &str = "FIBTG";
    pub const SODIUM: &str = "NA";
    pub const SUGAR: &str = "SUGAR";
    pub const CHOLESTEROL: &str = "CHOLE";
}

#[derive(Debug, Deserialize)]
struct Nutrient {
    #[serde(default)]
    quantity: f64,
}

/// Subset of the nutrition-details response that enrichment uses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NutritionAnalysis {
    #[serde(default)]
    calories: Option<f64>,
    #[serde(default)]
    total_weight: Option<f64>,
    #[serde(rename = "yield", default)]
    servings: Option<f64>,
    #[serde(default)]
    total_nutrients: HashMap<String, Nutrient>,
}

fn round_whole(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round() as u32
    } else {
        0
    }
}

fn round_tenth(value: f64) -> f64 {
    if value.is_finite() {
        (value * 10.0).round() / 10.0
    } else {
        0.0
    }
}

impl NutritionAnalysis {
    fn nutrient(&self, code: &str) -> f64 {
        self.total_nutrients
            .get(code)
            .map(|n| n.quantity)
            .unwrap_or(0.0)
    }

    fn into_facts(self) -> Result<NutritionFacts, NutritionError> {
        let calories = self
            .calories
            .unwrap_or_else(|| self.nutrient(codes::ENERGY));
        let total_weight = self.total_weight.unwrap_or(0.0);

        if calories <= 0.0 && total_weight <= 0.0 {
            return Err(NutritionError::NoData);
        }

        Ok(NutritionFacts {
            macros: Macros {
                calories: round_whole(calories),
                protein_grams: round_whole(self.nutrient(codes::PROTEIN)),
                carbs_grams: round_whole(self.nutrient(codes::CARBS)),
                fat_grams: round_whole(self.nutrient(codes::FAT)),
            },
            details: NutritionDetails {
                fiber: round_tenth(self.nutrient(codes::FIBER)),
                sodium: round_tenth(self.nutrient(codes::SODIUM)),
                sugar: round_tenth(self.nutrient(codes::SUGAR)),
                cholesterol: round_tenth(self.nutrient(codes::CHOLESTEROL)),
                servings: self.servings.unwrap_or(1.0),
                total_weight: round_tenth(total_weight),
            },
        })
    }
}

/// Client for the Edamam nutrition-details endpoint.
#[derive(Clone)]
pub struct EdamamClient {
    client: Client,
    base_url: String,
    app_id: String,
    app_key: String,
    limiter: Arc<TokenBucket>,
    max_retry_elapsed: Duration,
}

impl EdamamClient {
    pub fn new(
        base_url: &str,
        app_id: &str,
        app_key: &str,
        timeout_seconds: u64,
        limiter: TokenBucket,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        tracing::info!(base_url = base_url, "Nutrition client initialized");

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            app_id: app_id.to_string(),
            app_key: app_key.to_string(),
            limiter: Arc::new(limiter),
            max_retry_elapsed: Duration::from_secs(timeout_seconds),
        })
    }

    async fn attempt(&self, ingredients: &[String]) -> Result<NutritionFacts, NutritionError> {
        #[derive(Serialize)]
        struct Request<'a> {
            ingr: &'a [String],
        }

        self.limiter.acquire().await;

        let url = format!("{}/api/nutrition-details", self.base_url);
        debug!(url = %url, ingredients = ingredients.len(), "Nutrition service request");

        let response = self
            .client
            .post(&url)
            .query(&[("app_id", &self.app_id), ("app_key", &self.app_key)])
            .json(&Request { ingr: ingredients })
            .send()
            .await
            .map_err(|e| NutritionError::Network(e.to_string()))?;

        Self::read_response(response).await
    }

    async fn read_response(response: Response) -> Result<NutritionFacts, NutritionError> {
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(NutritionError::RateLimited { retry_after });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message: String = body.chars().take(200).collect();
            return Err(NutritionError::Http {
                status: status.as_u16(),
                message: if message.is_empty() {
                    status.canonical_reason().unwrap_or("error").to_string()
                } else {
                    message
                },
            });
        }

        let analysis: NutritionAnalysis = response
            .json()
            .await
            .map_err(|e| NutritionError::Parse(e.to_string()))?;

        analysis.into_facts()
    }
}

#[async_trait]
impl NutritionProvider for EdamamClient {
    fn source(&self) -> &'static str {
        "edamam"
    }

    #[instrument(skip(self, ingredients), fields(ingredients = ingredients.len()))]
    async fn analyze(&self, ingredients: &[String]) -> Result<NutritionFacts, NutritionError> {
        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(250))
            .with_max_interval(Duration::from_secs(4))
            .with_max_elapsed_time(Some(self.max_retry_elapsed))
            .build();
        let started = Instant::now();

        backoff::future::retry(policy, move || async move {
            match self.attempt(ingredients).await {
                Ok(facts) => Ok(facts),
                Err(err) if err.is_transient() => match err {
                    // `retry_after` bypasses the policy's elapsed-time limit
                    NutritionError::RateLimited {
                        retry_after: Some(wait),
                    } => {
                        if started.elapsed() + wait > self.max_retry_elapsed {
                            warn!(
                                retry_after_secs = wait.as_secs(),
                                "Nutrition service rate limit outlasts the retry window"
                            );
                            Err(backoff::Error::permanent(err))
                        } else {
                            warn!(error = %err, "Nutrition service rate limited, retrying");
                            Err(backoff::Error::retry_after(err, wait))
                        }
                    }
                    _ => {
                        warn!(error = %err, "Transient nutrition service failure, retrying");
                        Err(backoff::Error::transient(err))
                    }
                },
                Err(err) => Err(backoff::Error::permanent(err)),
            }
        })
        .await
    }
}
