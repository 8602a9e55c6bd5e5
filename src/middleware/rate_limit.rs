// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Rate-limit middleware for inbound API requests.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Header identifying the calling credential.
const API_KEY_HEADER: &str = "x-api-key";

/// Credential used when no API key header is present.
const ANONYMOUS_CREDENTIAL: &str = "anonymous";

/// Middleware that consults the fixed-window rate limiter before the
/// request proceeds. Blocked requests get a 429 with reset information;
/// allowed requests carry `x-ratelimit-*` headers.
pub async fn enforce_rate_limit(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let credential = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or(ANONYMOUS_CREDENTIAL)
        .to_string();

    let decision = state
        .rate_limiter
        .check(&credential, state.config.api_rate_limit);

    let reset = crate::time_utils::format_utc_rfc3339(decision.reset_time);

    if decision.blocked {
        // The reset header tells the caller when to retry.
        let mut response = AppError::RateLimited.into_response();
        apply_headers(&mut response, decision.limit, decision.remaining, &reset);
        return response;
    }

    let mut response = next.run(request).await;
    apply_headers(&mut response, decision.limit, decision.remaining, &reset);
    response
}

fn apply_headers(response: &mut Response, limit: u32, remaining: u32, reset: &str) {
    let headers = response.headers_mut();
    headers.insert(
        "x-ratelimit-limit",
        HeaderValue::from_str(&limit.to_string()).unwrap_or(HeaderValue::from_static("0")),
    );
    headers.insert(
        "x-ratelimit-remaining",
        HeaderValue::from_str(&remaining.to_string()).unwrap_or(HeaderValue::from_static("0")),
    );
    if let Ok(value) = HeaderValue::from_str(reset) {
        headers.insert("x-ratelimit-reset", value);
    }
}
