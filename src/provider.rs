// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outbound client for the newsletter provider.
//!
//! One POST per subscription: `{api_key, email, first_name}` to
//! `<api_base>/forms/<form_id>/subscribe`, with a hard client timeout and no
//! automatic retry. Once issued, a call runs to completion, timeout, or
//! error. The caller decides whether to retry.

use crate::config::ProviderConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from a provider subscription attempt.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Required credentials are absent from configuration.
    #[error("provider credentials not configured (missing: {missing:?})")]
    NotConfigured { missing: Vec<&'static str> },

    /// The provider answered with an error status.
    #[error("provider rejected the subscription (status {status})")]
    Rejected {
        status: u16,
        message: Option<String>,
    },

    /// No response was received (connect failure or timeout).
    #[error("provider unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    /// The provider answered 2xx with a body we could not interpret.
    #[error("unexpected provider response body: {0}")]
    UnexpectedBody(String),
}

/// Successful outcome of a subscription attempt.
#[derive(Debug, Clone)]
pub enum SubscribeOutcome {
    /// A new subscription was created; carries the provider's subscription
    /// object verbatim.
    Subscribed(Value),
    /// The address was already on the list. Treated as success so duplicate
    /// signups never surface as user-facing errors.
    AlreadySubscribed,
}

#[derive(Debug, Serialize)]
struct SubscribePayload<'a> {
    api_key: &'a str,
    email: &'a str,
    first_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct SubscribeBody {
    #[serde(default)]
    subscription: Value,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Client for the newsletter provider API.
pub struct ProviderClient {
    http: reqwest::Client,
    config: ProviderConfig,
}

impl ProviderClient {
    /// Create a new provider client with a bounded request timeout.
    pub fn new(config: ProviderConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self { http, config })
    }

    /// Forward a validated subscription to the provider.
    pub async fn subscribe(
        &self,
        email: &str,
        first_name: &str,
    ) -> Result<SubscribeOutcome, ProviderError> {
        let (api_key, form_id) = self.config.credentials().ok_or_else(|| {
            ProviderError::NotConfigured {
                missing: self.config.missing_settings(),
            }
        })?;

        let url = self.endpoint_url(form_id);
        let payload = SubscribePayload {
            api_key,
            email,
            first_name,
        };

        debug!(form_id = %form_id, "Forwarding subscription to provider");

        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(ProviderError::Unreachable)?;

        let status = response.status();

        if status.is_success() {
            let body: SubscribeBody = response
                .json()
                .await
                .map_err(|e| ProviderError::UnexpectedBody(e.to_string()))?;
            return Ok(SubscribeOutcome::Subscribed(body.subscription));
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.message);

        // Duplicate signup: the provider reports it as a 400, we report it
        // as success.
        if status == reqwest::StatusCode::BAD_REQUEST {
            if let Some(msg) = &message {
                if msg.contains("already subscribed") {
                    debug!("Provider reports address already subscribed");
                    return Ok(SubscribeOutcome::AlreadySubscribed);
                }
            }
        }

        warn!(
            status = status.as_u16(),
            message = message.as_deref().unwrap_or("<none>"),
            "Provider rejected subscription"
        );
        Err(ProviderError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    fn endpoint_url(&self, form_id: &str) -> String {
        format!(
            "{}/forms/{}/subscribe",
            self.config.api_base.trim_end_matches('/'),
            form_id
        )
    }
}
