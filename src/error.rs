//! Unified API error handling
//!
//! Provides consistent error responses across all endpoints.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Onboarding required")]
    OnboardingRequired,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Meal plan generation failed: {0}")]
    Generation(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::OnboardingRequired | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Generation(_) | Self::Internal(_) | Self::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::OnboardingRequired => "ONBOARDING_REQUIRED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::RateLimited(_) => "RATE_LIMITED",
            Self::UpstreamUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Generation(_) => "GENERATION_FAILED",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::Unauthorized(msg) => msg.clone(),
            Self::OnboardingRequired => "Please complete onboarding first".to_string(),
            Self::NotFound(msg) => msg.clone(),
            Self::BadRequest(msg) => msg.clone(),
            Self::RateLimited(_) => {
                "Too many requests. Please wait a moment and try again.".to_string()
            }
            Self::UpstreamUnavailable(_) => {
                "AI service temporarily unavailable. Please try again.".to_string()
            }
            Self::Generation(_) => "Failed to generate meal plan. Please try again.".to_string(),
            // Don't leak internal error details
            Self::Internal(_) | Self::Database(_) => "An internal error occurred".to_string(),
        }
    }

    fn diagnostic(&self) -> Option<String> {
        match self {
            Self::RateLimited(msg) | Self::UpstreamUnavailable(msg) | Self::Generation(msg) => {
                Some(msg.clone())
            }
            Self::Internal(e) => Some(format!("{:#}", e)),
            Self::Database(e) => Some(e.to_string()),
            _ => None,
        }
    }

    pub fn to_body(&self, expose_details: bool) -> ErrorResponse {
        ErrorResponse {
            error: self.public_message(),
            code: self.error_code().to_string(),
            details: if expose_details { self.diagnostic() } else { None },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Internal(e) => {
                tracing::error!(error = ?e, "Internal server error");
            }
            Self::Database(e) => {
                tracing::error!(error = ?e, "Database error");
            }
            Self::Generation(msg) | Self::UpstreamUnavailable(msg) => {
                tracing::error!(error = %msg, code = self.error_code(), "Upstream failure");
            }
            _ => {
                tracing::warn!(error = %self, "API error");
            }
        }

        let mut response = (self.status_code(), Json(self.to_body(false))).into_response();
        if self.diagnostic().is_some() {
            response
                .extensions_mut()
                .insert(ErrorDetails(self.to_body(true)));
        }
        response
    }
}

/// Error body with diagnostics, carried on the response for
/// [`expose_error_details`].
#[derive(Debug, Clone)]
struct ErrorDetails(ErrorResponse);

/// Response mapper that swaps error bodies for their detailed form.
/// Installed only for the development environment.
pub async fn expose_error_details(mut response: Response) -> Response {
    match response.extensions_mut().remove::<ErrorDetails>() {
        Some(ErrorDetails(body)) => {
            let (parts, _) = response.into_parts();
            (parts, Json(body)).into_response()
        }
        None => response,
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_upstream_failures() {
        assert_eq!(
            ApiError::RateLimited("slow down".into()).status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::UpstreamUnavailable("down".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::Generation("bad json".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::OnboardingRequired.status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn details_only_when_exposed() {
        let err = ApiError::Generation("expected value at line 1 column 1".into());

        let hidden = err.to_body(false);
        assert_eq!(hidden.code, "GENERATION_FAILED");
        assert!(hidden.details.is_none());

        let shown = err.to_body(true);
        assert_eq!(
            shown.details.as_deref(),
            Some("expected value at line 1 column 1")
        );
        assert_eq!(shown.error, hidden.error);
    }

    async fn body_of(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn responses_hide_details_until_exposed() {
        let err = || ApiError::UpstreamUnavailable("connection reset".into());

        let plain = err().into_response();
        assert_eq!(plain.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(body_of(plain).await.get("details").is_none());

        let exposed = expose_error_details(err().into_response()).await;
        assert_eq!(exposed.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_of(exposed).await;
        assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
        assert_eq!(body["details"], "connection reset");
    }

    #[tokio::test]
    async fn exposing_leaves_other_responses_alone() {
        let response = ApiError::bad_request("planType is required").into_response();
        let mapped = expose_error_details(response).await;
        let body = body_of(mapped).await;
        assert_eq!(body["error"], "planType is required");
        assert!(body.get("details").is_none());
    }

    #[test]
    fn client_errors_never_carry_details() {
        let body = ApiError::bad_request("planType is required").to_body(true);
        assert_eq!(body.error, "planType is required");
        assert!(body.details.is_none());
    }
}
