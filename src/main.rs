use anyhow::Result;
use std::sync::Arc;

use mealplanner_backend::services::{
    CompletionProvider, EdamamClient, OpenAiClient, PgProfileStore, TokenBucket,
};
use mealplanner_backend::{app, config, db, logging};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = config::Settings::from_env()?;

    // Initialize logging
    logging::init_logging(&settings.env)?;

    tracing::info!(
        env = ?settings.env,
        server_addr = %settings.server_addr,
        "Starting meal planner backend"
    );

    // Create database pool
    let pool = db::create_pool(&settings).await?;
    db::run_migrations(&pool).await;

    // Completion service client
    let completion = OpenAiClient::new(
        &settings.openai_base_url,
        &settings.openai_api_key,
        &settings.openai_model,
        settings.openai_timeout_seconds,
    )?;

    // Optionally check the completion service (non-blocking)
    tokio::spawn({
        let completion = completion.clone();
        async move {
            match completion.health_check().await {
                Ok(()) => tracing::info!("AI service is healthy"),
                Err(e) => tracing::warn!(error = %e, "AI service health check failed - will retry on first request"),
            }
        }
    });

    // Nutrition service client
    let nutrition = EdamamClient::new(
        &settings.edamam_base_url,
        &settings.edamam_app_id,
        &settings.edamam_app_key,
        settings.nutrition_timeout_seconds,
        TokenBucket::new(
            settings.nutrition_requests_per_second,
            settings.nutrition_burst,
        ),
    )?;

    // Create application state
    let state = app::AppState::new(
        settings.clone(),
        Arc::new(PgProfileStore::new(pool)),
        Arc::new(completion),
        Arc::new(nutrition),
    );

    // Build application
    let app = app::create_app(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&settings.server_addr).await?;
    tracing::info!("Listening on {}", settings.server_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
