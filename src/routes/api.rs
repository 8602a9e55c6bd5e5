// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for the notification & engagement engine.

use crate::error::{AppError, Result};
use crate::models::{
    Achievement, AchievementStats, NotificationRecord, NotificationSettings,
    NotificationSettingsPatch, NotificationStats,
};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use validator::Validate;

/// API routes (rate-limit middleware is applied in routes/mod.rs).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/settings/{user_id}",
            get(get_settings).patch(update_settings),
        )
        .route("/api/settings/{user_id}/reset", post(reset_settings))
        .route("/api/notifications/{user_id}", get(get_feed))
        .route(
            "/api/notifications/{user_id}/stats",
            get(get_notification_stats),
        )
        .route("/api/notifications/{user_id}/test", post(send_test))
        .route(
            "/api/notifications/{user_id}/{record_id}/read",
            patch(mark_read),
        )
        .route(
            "/api/tasks/{user_id}/{task_id}/complete",
            post(complete_task),
        )
        .route("/api/achievements/{user_id}", get(get_achievements))
        .route(
            "/api/achievements/{user_id}/stats",
            get(get_achievement_stats),
        )
}

// ─── Settings ────────────────────────────────────────────────

/// Get notification settings; a user without a settings document gets the
/// defaults.
async fn get_settings(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Json<NotificationSettings> {
    Json(state.settings.get(&user_id).await)
}

/// Apply a typed partial update. Unknown keys fail deserialization;
/// invalid values (e.g. a malformed quiet-hours time) are rejected here.
async fn update_settings(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(patch): Json<NotificationSettingsPatch>,
) -> Result<Json<NotificationSettings>> {
    patch
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let merged = state.settings.update(&user_id, &patch).await?;
    Ok(Json(merged))
}

/// Restore the full default settings object.
async fn reset_settings(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<NotificationSettings>> {
    Ok(Json(state.settings.reset(&user_id).await?))
}

// ─── Notification Feed ───────────────────────────────────────

#[derive(Serialize)]
pub struct FeedResponse {
    pub records: Vec<NotificationRecord>,
}

/// Get the notification feed, newest first.
async fn get_feed(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<FeedResponse>> {
    let feed = state
        .db
        .get_notification_feed(&user_id)
        .await?
        .unwrap_or_default();
    Ok(Json(FeedResponse {
        records: feed.records,
    }))
}

/// Get dispatch stats.
async fn get_notification_stats(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<NotificationStats>> {
    let stats = state
        .db
        .get_notification_stats(&user_id)
        .await?
        .unwrap_or_default();
    Ok(Json(stats))
}

#[derive(Serialize)]
pub struct MarkReadResponse {
    pub updated: bool,
}

/// Mark a feed record read.
async fn mark_read(
    State(state): State<Arc<AppState>>,
    Path((user_id, record_id)): Path<(String, String)>,
) -> Result<Json<MarkReadResponse>> {
    let updated = state.notifier.mark_read(&user_id, &record_id).await?;
    Ok(Json(MarkReadResponse { updated }))
}

#[derive(Serialize)]
pub struct TestNotificationResponse {
    pub sent: bool,
    pub record_id: Option<String>,
}

/// Foreground test send. Unlike background dispatches, failures here are
/// surfaced to the caller.
async fn send_test(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<TestNotificationResponse>> {
    let record_id = state.notifier.send_test(&user_id).await?;
    Ok(Json(TestNotificationResponse {
        sent: record_id.is_some(),
        record_id,
    }))
}

// ─── Task Completion ─────────────────────────────────────────

#[derive(Serialize)]
pub struct CompleteTaskResponse {
    pub already_completed: bool,
    pub unlocked: Vec<Achievement>,
}

/// Mark a task completed and run the streak & achievement engine.
///
/// Completing an already-completed task is idempotent: the stats are not
/// re-counted and no achievements are re-evaluated.
async fn complete_task(
    State(state): State<Arc<AppState>>,
    Path((user_id, task_id)): Path<(String, String)>,
) -> Result<Json<CompleteTaskResponse>> {
    let mut task = state
        .db
        .get_task(&user_id, &task_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Task {} not found", task_id)))?;

    if task.completed {
        return Ok(Json(CompleteTaskResponse {
            already_completed: true,
            unlocked: vec![],
        }));
    }

    task.completed = true;
    task.updated_at = Utc::now();
    state.db.upsert_task(&task).await?;

    let unlocked = state.streaks.process_completion(&user_id, &task).await?;

    Ok(Json(CompleteTaskResponse {
        already_completed: false,
        unlocked,
    }))
}

// ─── Achievements ────────────────────────────────────────────

#[derive(Serialize)]
pub struct AchievementsResponse {
    pub achievements: Vec<Achievement>,
}

/// All achievements unlocked by a user, newest first.
async fn get_achievements(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<AchievementsResponse>> {
    let achievements = state.db.get_achievements_for_user(&user_id).await?;
    Ok(Json(AchievementsResponse { achievements }))
}

/// Streak/goal aggregates for a user.
async fn get_achievement_stats(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<AchievementStats>> {
    let stats = state
        .db
        .get_achievement_stats(&user_id)
        .await?
        .unwrap_or_default();
    Ok(Json(stats))
}
