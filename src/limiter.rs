// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Sliding-window rate limiter for the subscription endpoint.
//!
//! Each client identifier maps to the timestamps of its requests inside the
//! trailing window. Stale timestamps are pruned lazily on every check, and a
//! periodic sweep drops entries for clients that have gone idle.
//!
//! The window state is process-local. Under horizontal scale-out each
//! instance keeps an independent view, so the per-window bound holds per
//! process, not globally; a shared TTL store (Redis or similar) is the
//! upgrade path when that matters.

use crate::config::RateLimitConfig;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Result of a rate limit check.
#[derive(Debug, Clone)]
pub enum RateLimitResult {
    /// Request is allowed
    Allowed {
        /// Remaining requests in the current window
        remaining: u32,
    },
    /// Request is rate limited
    Limited {
        /// Time until the oldest in-window request expires
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }
}

/// Thread-safe sliding-window rate limiter, keyed by client identifier.
pub struct RateLimiter {
    /// Configuration
    config: RateLimitConfig,
    /// Per-client request timestamps, newest last
    windows: Arc<RwLock<HashMap<String, Vec<Instant>>>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Check the rate limit for a client at the current instant.
    pub async fn check(&self, client_id: &str) -> RateLimitResult {
        self.check_at(client_id, Instant::now()).await
    }

    /// Check the rate limit for a client at an explicit instant.
    ///
    /// The decision is a pure function of `now` and the recorded timestamps:
    /// timestamps older than the window are pruned, and the request is
    /// recorded only when allowed. A denied request leaves the window
    /// untouched, so there is no penalty beyond the window itself.
    pub async fn check_at(&self, client_id: &str, now: Instant) -> RateLimitResult {
        let window = self.config.window_duration();
        let mut windows = self.windows.write().await;
        let timestamps = windows.entry(client_id.to_string()).or_default();

        timestamps.retain(|t| now.duration_since(*t) < window);

        if (timestamps.len() as u32) < self.config.max_requests {
            timestamps.push(now);
            let remaining = self.config.max_requests - timestamps.len() as u32;
            debug!(client_id = %client_id, remaining, "Request allowed");
            RateLimitResult::Allowed { remaining }
        } else {
            // Timestamps are pushed in order, so the first is the oldest.
            let oldest = timestamps.first().copied().unwrap_or(now);
            let retry_after = (oldest + window).saturating_duration_since(now);
            debug!(
                client_id = %client_id,
                retry_after_secs = retry_after.as_secs(),
                "Request rate limited"
            );
            RateLimitResult::Limited { retry_after }
        }
    }

    /// Drop entries with no in-window timestamps (should be called
    /// periodically).
    ///
    /// Lazy pruning only touches clients that keep sending requests; this
    /// sweep is what bounds memory for clients that stop.
    pub async fn cleanup(&self) {
        let now = Instant::now();
        let window = self.config.window_duration();
        let mut windows = self.windows.write().await;
        let before = windows.len();

        windows.retain(|_, timestamps| {
            timestamps.retain(|t| now.duration_since(*t) < window);
            !timestamps.is_empty()
        });

        let swept = before - windows.len();
        if swept > 0 {
            debug!(swept, tracked = windows.len(), "Swept idle rate limit entries");
        }
    }

    /// Number of clients currently tracked.
    pub async fn tracked_clients(&self) -> usize {
        self.windows.read().await.len()
    }
}
