use axum::{http::HeaderValue, Router};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::auth::SessionVerifier;
use crate::config::Settings;
use crate::error;
use crate::middleware::request_id_layer;
use crate::routes;
use crate::services::{
    CompletionProvider, MealPlanGenerator, NutritionEnricher, NutritionProvider, ProfileStore,
};

/// Request bodies are small JSON documents
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Shared application state
pub struct AppState {
    pub settings: Settings,
    pub sessions: SessionVerifier,
    pub profiles: Arc<dyn ProfileStore>,
    pub completion: Arc<dyn CompletionProvider>,
    pub generator: MealPlanGenerator,
    pub enricher: NutritionEnricher,
}

impl AppState {
    pub fn new(
        settings: Settings,
        profiles: Arc<dyn ProfileStore>,
        completion: Arc<dyn CompletionProvider>,
        nutrition: Arc<dyn NutritionProvider>,
    ) -> Arc<Self> {
        let sessions = SessionVerifier::new(
            &settings.session_jwt_secret,
            settings.session_jwt_issuer.as_deref(),
        );
        let generator = MealPlanGenerator::new(completion.clone());
        let enricher = NutritionEnricher::new(
            nutrition,
            settings.nutrition_concurrency,
            Duration::from_secs(settings.nutrition_timeout_seconds),
        );

        Arc::new(Self {
            settings,
            sessions,
            profiles,
            completion,
            generator,
            enricher,
        })
    }
}

/// Build the complete application with all middleware
pub fn create_app(state: Arc<AppState>) -> Router {
    let cors = build_cors_layer(&state.settings);

    // Use DEBUG for spans to reduce overhead at INFO level
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::DEBUG));

    let (set_request_id, propagate_request_id) = request_id_layer();

    let mut router = Router::new().merge(routes::api_router());

    // Error diagnostics are only ever returned in development
    if state.settings.env.is_dev() {
        router = router.layer(axum::middleware::map_response(error::expose_error_details));
    }

    router
        // Middleware stack (applied bottom-up)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(propagate_request_id)
        .layer(trace_layer)
        .layer(set_request_id)
        .layer(cors)
        .with_state(state)
}

fn build_cors_layer(settings: &Settings) -> CorsLayer {
    let origins: Vec<HeaderValue> = settings
        .cors_allow_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let max_age = if settings.env.is_dev() {
        Duration::from_secs(86400)
    } else {
        Duration::from_secs(3600)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::list([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
            axum::http::HeaderName::from_static("x-request-id"),
        ]))
        .allow_credentials(true)
        .max_age(max_age)
}
