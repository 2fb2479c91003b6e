// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Newsletter Subscription Gateway
//!
//! This crate provides a thin proxy in front of a third-party newsletter
//! provider. It owns the only externally-observable state in the signup
//! path:
//!
//! - Per-client sliding-window rate limiting (5 requests / 60s default)
//! - Email payload validation
//! - Credential-holding provider forwarding with a bounded timeout
//! - Normalization of provider responses into a uniform JSON contract
//!
//! The provider API key never leaves the server; browsers talk to this
//! gateway instead of the provider directly.

pub mod config;
pub mod handlers;
pub mod limiter;
pub mod metrics;
pub mod provider;
pub mod validator;

pub use config::Config;
pub use limiter::{RateLimitResult, RateLimiter};
pub use provider::{ProviderClient, ProviderError, SubscribeOutcome};
pub use validator::{SubscriptionValidator, ValidationResult};
