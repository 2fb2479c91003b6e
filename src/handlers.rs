// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the subscription gateway.
//!
//! The subscribe handler evaluates its checks in a strict order: method,
//! client identity, rate limit, JSON parse, email presence, email format,
//! provider credentials, provider call. Every branch answers with the
//! uniform `{success, message|error, data?}` body; nothing is ever thrown
//! to the runtime.

use crate::config::Config;
use crate::limiter::{RateLimitResult, RateLimiter};
use crate::metrics;
use crate::provider::{ProviderClient, ProviderError, SubscribeOutcome};
use crate::validator::{SubscriptionValidator, ValidationResult};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

/// Shared application state.
pub struct AppState {
    pub limiter: RateLimiter,
    pub validator: SubscriptionValidator,
    pub provider: ProviderClient,
    pub config: Config,
}

/// Incoming subscription request body.
#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub email: Option<String>,
    #[serde(default, rename = "firstName")]
    pub first_name: Option<String>,
}

/// Uniform response body for the subscribe endpoint.
#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl SubscribeResponse {
    fn success(message: &str) -> Self {
        Self {
            success: true,
            message: Some(message.to_string()),
            error: None,
            data: None,
        }
    }

    fn success_with_data(message: &str, data: Value) -> Self {
        Self {
            data: Some(data),
            ..Self::success(message)
        }
    }

    fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
            data: None,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub timestamp: String,
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let mut router = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route(
            "/subscribe",
            post(subscribe)
                .options(preflight)
                .fallback(method_not_allowed),
        );

    if state.config.metrics.enabled {
        router = router.route(&state.config.metrics.path, get(metrics::metrics));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "newsletter-gateway",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Preflight answer. Never reaches rate limiting or validation; the CORS
/// layer attaches the allow-* headers.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Any method other than POST/OPTIONS.
pub async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(SubscribeResponse::failure("Method not allowed. Use POST.")),
    )
}

/// Handle a newsletter subscription request.
pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    metrics::REQUESTS_TOTAL.inc();

    let client_id = client_identifier(&headers);

    let remaining = match state.limiter.check(&client_id).await {
        RateLimitResult::Limited { retry_after } => {
            metrics::RATE_LIMITED_TOTAL.inc();
            info!(
                client_id = %client_id,
                retry_after_secs = retry_after.as_secs(),
                "Subscription request rate limited"
            );
            return (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, retry_after.as_secs().max(1).to_string())],
                Json(SubscribeResponse::failure(
                    "Too many requests. Please try again in a minute.",
                )),
            )
                .into_response();
        }
        RateLimitResult::Allowed { remaining } => remaining,
    };

    let request: SubscribeRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            debug!(client_id = %client_id, error = %e, "Unparseable request body");
            return (
                StatusCode::BAD_REQUEST,
                Json(SubscribeResponse::failure("Invalid JSON in request body.")),
            )
                .into_response();
        }
    };

    let email = request.email.as_deref();
    if let ValidationResult::Invalid(err) = state.validator.validate_email(email) {
        info!(client_id = %client_id, error = %err, "Subscription validation failed");
        return (
            StatusCode::BAD_REQUEST,
            Json(SubscribeResponse::failure(err.to_string())),
        )
            .into_response();
    }
    // validate_email only passes Some(non-empty)
    let email = email.unwrap_or_default();
    let first_name = request.first_name.unwrap_or_default();

    match state.provider.subscribe(email, &first_name).await {
        Ok(SubscribeOutcome::Subscribed(subscription)) => {
            metrics::SUBSCRIPTIONS_TOTAL.inc();
            info!(client_id = %client_id, "Subscription created");
            (
                StatusCode::OK,
                [(
                    header::HeaderName::from_static("x-ratelimit-remaining"),
                    remaining.to_string(),
                )],
                Json(SubscribeResponse::success_with_data(
                    "Successfully subscribed to newsletter!",
                    json!({ "subscription": subscription }),
                )),
            )
                .into_response()
        }
        Ok(SubscribeOutcome::AlreadySubscribed) => {
            info!(client_id = %client_id, "Duplicate subscription treated as success");
            (
                StatusCode::OK,
                Json(SubscribeResponse::success(
                    "This email is already subscribed to our newsletter!",
                )),
            )
                .into_response()
        }
        Err(err) => provider_error_response(&client_id, err),
    }
}

/// Map a provider failure onto the client-facing contract. Internal detail
/// stays in the logs.
fn provider_error_response(client_id: &str, err: ProviderError) -> Response {
    metrics::PROVIDER_ERRORS_TOTAL.inc();

    match err {
        ProviderError::NotConfigured { missing } => {
            error!(client_id = %client_id, missing = ?missing, "Provider credentials missing");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SubscribeResponse::failure(
                    "Server configuration error. Please contact support.",
                )),
            )
                .into_response()
        }
        ProviderError::Rejected { status, message } => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            (
                status,
                Json(SubscribeResponse::failure(
                    message.unwrap_or_else(|| "Subscription failed.".to_string()),
                )),
            )
                .into_response()
        }
        ProviderError::Unreachable(e) => {
            warn!(client_id = %client_id, error = %e, "Provider unreachable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(SubscribeResponse::failure(
                    "Unable to connect to subscription service. Please try again later.",
                )),
            )
                .into_response()
        }
        ProviderError::UnexpectedBody(detail) => {
            error!(client_id = %client_id, detail = %detail, "Unexpected provider response");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SubscribeResponse::failure(
                    "An unexpected error occurred. Please try again.",
                )),
            )
                .into_response()
        }
    }
}

/// Resolve the rate-limit bucket for a request: `client-ip` if the fronting
/// proxy set it, then `x-forwarded-for`, else the shared sentinel.
fn client_identifier(headers: &HeaderMap) -> String {
    for name in ["client-ip", "x-forwarded-for"] {
        if let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) {
            let value = value.trim();
            if !value.is_empty() {
                return value.to_string();
            }
        }
    }
    "unknown".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_identifier_precedence() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.9".parse().unwrap());
        headers.insert("client-ip", "198.51.100.4".parse().unwrap());
        assert_eq!(client_identifier(&headers), "198.51.100.4");

        headers.remove("client-ip");
        assert_eq!(client_identifier(&headers), "203.0.113.9");

        headers.remove("x-forwarded-for");
        assert_eq!(client_identifier(&headers), "unknown");
    }

    #[test]
    fn test_response_omits_absent_fields() {
        let body = serde_json::to_value(SubscribeResponse::failure("nope")).unwrap();
        assert_eq!(body, json!({ "success": false, "error": "nope" }));

        let body = serde_json::to_value(SubscribeResponse::success("yes")).unwrap();
        assert_eq!(body, json!({ "success": true, "message": "yes" }));
    }

    #[test]
    fn test_first_name_accepts_camel_case() {
        let request: SubscribeRequest =
            serde_json::from_str(r#"{"email":"a@b.c","firstName":"Ada"}"#).unwrap();
        assert_eq!(request.first_name.as_deref(), Some("Ada"));
    }
}
