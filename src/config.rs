// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the subscription gateway.
//!
//! Provider credentials are optional at load time: the service starts
//! without them and answers signup requests with a configuration error
//! until they are supplied.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the subscription gateway service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Newsletter provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Sliding-window rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum requests per window per client (default: 5)
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Window length in seconds (default: 60)
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

/// Newsletter provider configuration.
///
/// `api_key` and `form_id` are both required before any subscription can be
/// forwarded; their absence is a per-request configuration error, never a
/// silent default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the provider API (default: https://api.convertkit.com/v3)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Provider API key
    #[serde(default)]
    pub api_key: Option<String>,

    /// Provider form identifier the subscription is attached to
    #[serde(default)]
    pub form_id: Option<String>,

    /// Outbound request timeout in seconds (default: 10)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_max_requests() -> u32 {
    5
}

fn default_window_secs() -> u64 {
    60
}

fn default_api_base() -> String {
    "https://api.convertkit.com/v3".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            rate_limit: RateLimitConfig::default(),
            provider: ProviderConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key: None,
            form_id: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl RateLimitConfig {
    /// Get the rate window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl ProviderConfig {
    /// Get the outbound request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Both credentials, when fully configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.api_key.as_deref(), self.form_id.as_deref()) {
            (Some(key), Some(form)) if !key.is_empty() && !form.is_empty() => Some((key, form)),
            _ => None,
        }
    }

    /// Names of the settings that are missing. Logged server-side only.
    pub fn missing_settings(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.api_key.as_deref().map_or(true, str::is_empty) {
            missing.push("provider.api_key");
        }
        if self.form_id.as_deref().map_or(true, str::is_empty) {
            missing.push("provider.form_id");
        }
        missing
    }
}
