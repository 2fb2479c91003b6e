// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus counters for the subscription endpoint.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use lazy_static::lazy_static;
use prometheus::{register_counter, Counter, Encoder, TextEncoder};
use tracing::error;

lazy_static! {
    pub static ref REQUESTS_TOTAL: Counter = register_counter!(
        "newsletter_requests_total",
        "Total subscription requests received"
    )
    .unwrap();
    pub static ref RATE_LIMITED_TOTAL: Counter = register_counter!(
        "newsletter_rate_limited_total",
        "Requests rejected by the rate limiter"
    )
    .unwrap();
    pub static ref SUBSCRIPTIONS_TOTAL: Counter = register_counter!(
        "newsletter_subscriptions_total",
        "Subscriptions accepted by the provider"
    )
    .unwrap();
    pub static ref PROVIDER_ERRORS_TOTAL: Counter = register_counter!(
        "newsletter_provider_errors_total",
        "Provider calls that failed or were rejected"
    )
    .unwrap();
}

/// Prometheus text exposition endpoint.
pub async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    String::from_utf8_lossy(&buffer).into_owned().into_response()
}
