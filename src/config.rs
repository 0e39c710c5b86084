use anyhow::{Context, Result};
use std::env;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }

    pub fn is_prod(&self) -> bool {
        matches!(self, Self::Prod)
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,
    pub server_addr: String,

    // Database
    pub database_url: String,
    pub database_max_connections: u32,

    // CORS
    pub cors_allow_origins: Vec<String>,

    // Session verification
    pub session_jwt_secret: String,
    pub session_jwt_issuer: Option<String>,

    // Completion service (OpenAI Responses API)
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub openai_timeout_seconds: u64,

    // Nutrition service (Edamam)
    pub edamam_app_id: String,
    pub edamam_app_key: String,
    pub edamam_base_url: String,
    pub nutrition_timeout_seconds: u64,
    pub nutrition_concurrency: usize,
    pub nutrition_requests_per_second: f64,
    pub nutrition_burst: u32,

    // Meal planning
    pub preferred_cuisine: String,
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn base_url(key: &str, default: &str) -> Result<String> {
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).with_context(|| format!("{} is not a valid URL", key))?;
    Ok(raw.trim_end_matches('/').to_string())
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let env = Environment::from_str(&env::var("ENV").unwrap_or_else(|_| "dev".to_string()));
        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        // Database
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let database_max_connections = parse_or("DATABASE_MAX_CONNECTIONS", 10);

        // CORS
        let cors_allow_origins = env::var("CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        // Sessions
        let session_jwt_secret =
            env::var("SESSION_JWT_SECRET").context("SESSION_JWT_SECRET must be set")?;
        let session_jwt_issuer = env::var("SESSION_JWT_ISSUER")
            .ok()
            .filter(|s| !s.is_empty());

        // Completion service
        let openai_api_key = env::var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?;
        let openai_base_url = base_url("OPENAI_BASE_URL", "https://api.openai.com/v1")?;
        let openai_model = env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-5-mini".to_string());
        // LLM calls for a full week can take a while
        let openai_timeout_seconds = parse_or("OPENAI_TIMEOUT_SECONDS", 180);

        // Nutrition service
        let edamam_app_id = env::var("EDAMAM_APP_ID").context("EDAMAM_APP_ID must be set")?;
        let edamam_app_key = env::var("EDAMAM_APP_KEY").context("EDAMAM_APP_KEY must be set")?;
        let edamam_base_url = base_url("EDAMAM_BASE_URL", "https://api.edamam.com")?;
        let nutrition_timeout_seconds = parse_or("NUTRITION_TIMEOUT_SECONDS", 15);
        let nutrition_concurrency = parse_or::<usize>("NUTRITION_CONCURRENCY", 4).max(1);
        let nutrition_requests_per_second =
            parse_or::<f64>("NUTRITION_REQUESTS_PER_SECOND", 10.0).max(0.1);
        let nutrition_burst = parse_or::<u32>("NUTRITION_BURST", 5).max(1);

        let preferred_cuisine =
            env::var("PREFERRED_CUISINE").unwrap_or_else(|_| "Middle Eastern".to_string());

        Ok(Settings {
            env,
            server_addr,
            database_url,
            database_max_connections,
            cors_allow_origins,
            session_jwt_secret,
            session_jwt_issuer,
            openai_api_key,
            openai_base_url,
            openai_model,
            openai_timeout_seconds,
            edamam_app_id,
            edamam_app_key,
            edamam_base_url,
            nutrition_timeout_seconds,
            nutrition_concurrency,
            nutrition_requests_per_second,
            nutrition_burst,
            preferred_cuisine,
        })
    }
}
