// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Scripted newsletter-provider stand-in.
//!
//! Each call to [`spawn_provider`] binds an ephemeral port and serves the
//! provider's subscribe endpoint with one fixed behavior, so gateway tests
//! can exercise every normalization branch.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::time::Duration;

/// Behavior of the scripted provider.
#[derive(Debug, Clone)]
pub enum ProviderMode {
    /// 2xx with a subscription object.
    Success { subscription_id: u64 },
    /// 400 with the provider's duplicate-signup message.
    AlreadySubscribed,
    /// An arbitrary error status with a message body.
    Rejected { status: u16, message: &'static str },
    /// An error status with no usable body.
    RejectedNoBody { status: u16 },
    /// 2xx with a body that is not JSON.
    SuccessInvalidBody,
    /// Accepts the connection and never answers in time.
    Hang,
}

/// Spawn the scripted provider; returns its base URL.
pub async fn spawn_provider(mode: ProviderMode) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");

    let app = Router::new()
        .route("/forms/:form_id/subscribe", post(respond))
        .with_state(mode);

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve provider");
    });

    format!("http://{addr}")
}

/// A base URL nothing is listening on.
pub async fn unreachable_base() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}")
}

async fn respond(State(mode): State<ProviderMode>, Json(payload): Json<Value>) -> Response {
    match mode {
        ProviderMode::Success { subscription_id } => Json(json!({
            "subscription": {
                "id": subscription_id,
                "state": "active",
                "subscriber": { "email_address": payload["email"] }
            }
        }))
        .into_response(),
        ProviderMode::AlreadySubscribed => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "status": 400,
                "message": "Email address is already subscribed to this form"
            })),
        )
            .into_response(),
        ProviderMode::Rejected { status, message } => (
            StatusCode::from_u16(status).expect("valid status"),
            Json(json!({ "status": status, "message": message })),
        )
            .into_response(),
        ProviderMode::RejectedNoBody { status } => StatusCode::from_u16(status)
            .expect("valid status")
            .into_response(),
        ProviderMode::SuccessInvalidBody => "subscribed, probably".into_response(),
        ProviderMode::Hang => {
            tokio::time::sleep(Duration::from_secs(30)).await;
            StatusCode::OK.into_response()
        }
    }
}
