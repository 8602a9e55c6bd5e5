// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Administrative surface: monitor lifecycle, diagnostic scans, and
//! rate-limit resets.

use crate::error::Result;
use crate::models::DeadlineMonitorSettings;
use crate::services::monitor::ScanReport;
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/monitor", get(monitor_status))
        .route("/admin/monitor/start", post(start_monitor))
        .route("/admin/monitor/stop", post(stop_monitor))
        .route("/admin/monitor/scan", post(trigger_scan))
        .route("/admin/rate-limit/reset", post(reset_rate_limit))
}

/// Current monitor settings with `monitoring_active` reflecting the live
/// timer handle.
async fn monitor_status(
    State(state): State<Arc<AppState>>,
) -> Json<DeadlineMonitorSettings> {
    Json(state.monitor.status().await)
}

/// Start deadline monitoring (cancels and replaces any existing timer).
async fn start_monitor(
    State(state): State<Arc<AppState>>,
) -> Json<DeadlineMonitorSettings> {
    Json(state.monitor.start().await)
}

/// Stop deadline monitoring; stopping twice is a no-op.
async fn stop_monitor(State(state): State<Arc<AppState>>) -> Json<DeadlineMonitorSettings> {
    Json(state.monitor.stop().await)
}

/// Run one immediate scan and return the report. Diagnostic entry point;
/// unlike the timer path, enumeration failures surface here.
async fn trigger_scan(State(state): State<Arc<AppState>>) -> Result<Json<ScanReport>> {
    let report = state.monitor.check_upcoming_deadlines().await?;
    Ok(Json(report))
}

#[derive(Deserialize)]
struct RateLimitResetRequest {
    credential: String,
}

#[derive(Serialize)]
pub struct RateLimitResetResponse {
    pub cleared: bool,
}

/// Clear a single credential's rate-limit window outright.
async fn reset_rate_limit(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RateLimitResetRequest>,
) -> Json<RateLimitResetResponse> {
    let cleared = state.rate_limiter.reset(&request.credential);
    Json(RateLimitResetResponse { cleared })
}
