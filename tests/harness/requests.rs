// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Request builders and response readers for router-level tests.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, Response};
use serde_json::Value;

/// A subscribe POST from the given client identifier.
pub fn subscribe_post(client_ip: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/subscribe")
        .header(header::CONTENT_TYPE, "application/json")
        .header("client-ip", client_ip)
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

/// A subscribe request with an arbitrary method and no client headers.
pub fn subscribe_bare(method: Method) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri("/subscribe")
        .body(Body::empty())
        .expect("request should build")
}

/// Collect and parse a JSON response body.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should collect");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}
