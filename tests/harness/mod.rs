// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test harness for the subscription gateway.
//!
//! Provides a scripted stand-in for the newsletter provider and helpers for
//! driving the router without a live listener.

pub mod provider;
pub mod requests;

use newsletter_gateway::{
    config::Config,
    handlers::{router, AppState},
    limiter::RateLimiter,
    provider::ProviderClient,
    validator::SubscriptionValidator,
};
use axum::Router;
use std::sync::Arc;

/// Build a gateway router with a fresh limiter for the given configuration.
pub fn gateway(config: Config) -> Router {
    let state = Arc::new(AppState {
        limiter: RateLimiter::new(config.rate_limit.clone()),
        validator: SubscriptionValidator::new(),
        provider: ProviderClient::new(config.provider.clone())
            .expect("provider client should build"),
        config,
    });
    router(state)
}
