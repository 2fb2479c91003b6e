// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Newsletter Subscription Gateway Service
//!
//! A credential-holding proxy between signup forms and the newsletter
//! provider:
//!
//! - 5 requests / 60s per client identifier (default)
//! - Permissive email validation before any provider traffic
//! - Uniform `{success, message|error}` JSON contract
//! - Provider responses normalized, duplicate signups reported as success
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables:
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `RATE_LIMIT_MAX`: Max requests per window per client (default: 5)
//! - `RATE_LIMIT_WINDOW_SECS`: Window length in seconds (default: 60)
//! - `NEWSLETTER_API_BASE`: Provider API base URL
//! - `NEWSLETTER_API_KEY`: Provider API key (required for forwarding)
//! - `NEWSLETTER_FORM_ID`: Provider form identifier (required for forwarding)
//! - `NEWSLETTER_TIMEOUT_SECS`: Outbound request timeout (default: 10)

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use newsletter_gateway::{
    config::{Config, ProviderConfig, RateLimitConfig},
    handlers::{router, AppState},
    limiter::RateLimiter,
    provider::ProviderClient,
    validator::SubscriptionValidator,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration
    let config = load_config();
    info!(
        bind_addr = %config.bind_addr,
        max_requests = config.rate_limit.max_requests,
        window_secs = config.rate_limit.window_secs,
        provider_timeout_secs = config.provider.timeout_secs,
        "Starting newsletter subscription gateway"
    );
    if config.provider.credentials().is_none() {
        // The service still starts; signups get a configuration error until
        // the operator supplies credentials.
        warn!(
            missing = ?config.provider.missing_settings(),
            "Provider credentials not configured"
        );
    }

    // Create application state
    let limiter = RateLimiter::new(config.rate_limit.clone());
    let validator = SubscriptionValidator::new();
    let provider = ProviderClient::new(config.provider.clone())?;

    let state = Arc::new(AppState {
        limiter,
        validator,
        provider,
        config: config.clone(),
    });

    // Spawn cleanup task
    let cleanup_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            cleanup_state.limiter.cleanup().await;
        }
    });

    // Build router
    let app = router(state);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Load configuration from environment variables.
fn load_config() -> Config {
    Config {
        bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        rate_limit: RateLimitConfig {
            max_requests: std::env::var("RATE_LIMIT_MAX")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            window_secs: std::env::var("RATE_LIMIT_WINDOW_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
        },
        provider: ProviderConfig {
            api_base: std::env::var("NEWSLETTER_API_BASE")
                .unwrap_or_else(|_| "https://api.convertkit.com/v3".to_string()),
            api_key: std::env::var("NEWSLETTER_API_KEY")
                .ok()
                .filter(|v| !v.is_empty()),
            form_id: std::env::var("NEWSLETTER_FORM_ID")
                .ok()
                .filter(|v| !v.is_empty()),
            timeout_secs: std::env::var("NEWSLETTER_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
        },
        ..Default::default()
    }
}
