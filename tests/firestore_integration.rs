// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running
//! (set FIRESTORE_EMULATOR_HOST). The emulator provides a clean state
//! for each test run; user IDs are unique per test for isolation.

use chrono::{Duration, Utc};
use quadrant_tracker::config::Config;
use quadrant_tracker::models::{NotificationSettingsPatch, Quadrant, Task, User};
use quadrant_tracker::services::MemoryChannel;
use std::sync::Arc;

mod common;
use common::{build_state, test_db};

/// Generate a unique user ID for test isolation.
fn unique_user_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    format!(
        "user-{}",
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    )
}

fn test_user(user_id: &str) -> User {
    User {
        user_id: user_id.to_string(),
        display_name: Some("Test User".to_string()),
        created_at: Utc::now(),
    }
}

fn test_task(user_id: &str, task_id: &str) -> Task {
    Task {
        id: task_id.to_string(),
        user_id: user_id.to_string(),
        title: format!("Task {}", task_id),
        completed: false,
        due_date: None,
        quadrant: Quadrant::UrgentImportant,
        updated_at: Utc::now(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SETTINGS TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_settings_nested_merge_persists_siblings() {
    require_emulator!();

    let db = test_db().await;
    let state = build_state(Config::test_default(), db, Arc::new(MemoryChannel::new()));
    let user_id = unique_user_id();

    // Enable quiet hours, then patch only the start time.
    let enable = serde_json::from_value::<NotificationSettingsPatch>(serde_json::json!({
        "quiet_hours": {"enabled": true}
    }))
    .unwrap();
    state.settings.update(&user_id, &enable).await.unwrap();

    let move_start = serde_json::from_value::<NotificationSettingsPatch>(serde_json::json!({
        "quiet_hours": {"start": "21:00"}
    }))
    .unwrap();
    state.settings.update(&user_id, &move_start).await.unwrap();

    let settings = state.settings.get(&user_id).await;
    assert!(settings.quiet_hours.enabled, "sibling field must survive");
    assert_eq!(settings.quiet_hours.start, "21:00");
    assert_eq!(settings.quiet_hours.end, "07:00");
}

#[tokio::test]
async fn test_settings_reset_restores_defaults() {
    require_emulator!();

    let db = test_db().await;
    let state = build_state(Config::test_default(), db, Arc::new(MemoryChannel::new()));
    let user_id = unique_user_id();

    let patch = serde_json::from_value::<NotificationSettingsPatch>(serde_json::json!({
        "deadline_alerts": false,
        "quiet_hours": {"enabled": true}
    }))
    .unwrap();
    state.settings.update(&user_id, &patch).await.unwrap();

    let reset = state.settings.reset(&user_id).await.unwrap();
    assert!(reset.deadline_alerts);
    assert!(!reset.quiet_hours.enabled);
}

// ═══════════════════════════════════════════════════════════════════════════
// STREAK & ACHIEVEMENT TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_first_completion_unlocks_first_task_achievement() {
    require_emulator!();

    let db = test_db().await;
    let channel = Arc::new(MemoryChannel::new());
    let state = build_state(Config::test_default(), db, channel.clone());
    let user_id = unique_user_id();

    state.db.upsert_user(&test_user(&user_id)).await.unwrap();
    let task = test_task(&user_id, "t1");
    state.db.upsert_task(&task).await.unwrap();

    let unlocked = state
        .streaks
        .process_completion(&user_id, &task)
        .await
        .unwrap();

    assert!(unlocked.iter().any(|a| a.id == "total-1"));

    let stats = state
        .db
        .get_achievement_stats(&user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stats.total_completed, 1);
    assert_eq!(stats.current_streak, 1);

    // The unlock was announced through the channel.
    assert!(channel
        .delivered()
        .iter()
        .any(|(_, _, tag)| tag == "achievement-total-1"));
}

#[tokio::test]
async fn test_achievement_is_not_reemitted_on_replay() {
    require_emulator!();

    let db = test_db().await;
    let state = build_state(Config::test_default(), db, Arc::new(MemoryChannel::new()));
    let user_id = unique_user_id();

    state.db.upsert_user(&test_user(&user_id)).await.unwrap();

    let first = state
        .streaks
        .process_completion(&user_id, &test_task(&user_id, "t1"))
        .await
        .unwrap();
    assert!(first.iter().any(|a| a.id == "total-1"));

    // A second completion the same day satisfies the same milestone but
    // must not unlock it again.
    let second = state
        .streaks
        .process_completion(&user_id, &test_task(&user_id, "t2"))
        .await
        .unwrap();
    assert!(!second.iter().any(|a| a.id == "total-1"));

    let history = state.db.get_achievements_for_user(&user_id).await.unwrap();
    assert_eq!(history.iter().filter(|a| a.id == "total-1").count(), 1);
}

// ═══════════════════════════════════════════════════════════════════════════
// DEADLINE SCAN TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_scan_alerts_on_urgent_and_overdue_tasks() {
    require_emulator!();

    let db = test_db().await;
    let channel = Arc::new(MemoryChannel::new());
    let state = build_state(Config::test_default(), db, channel.clone());
    let user_id = unique_user_id();
    let now = Utc::now();

    state.db.upsert_user(&test_user(&user_id)).await.unwrap();

    let mut due_soon = test_task(&user_id, "soon");
    due_soon.due_date = Some(now + Duration::hours(12));
    state.db.upsert_task(&due_soon).await.unwrap();

    let mut overdue = test_task(&user_id, "late");
    overdue.due_date = Some(now - Duration::hours(2));
    state.db.upsert_task(&overdue).await.unwrap();

    let mut done = test_task(&user_id, "done");
    done.due_date = Some(now - Duration::hours(2));
    done.completed = true;
    state.db.upsert_task(&done).await.unwrap();

    let mut undated = test_task(&user_id, "undated");
    undated.due_date = None;
    state.db.upsert_task(&undated).await.unwrap();

    let report = state.monitor.check_upcoming_deadlines().await.unwrap();
    assert!(report.users_scanned >= 1);
    assert_eq!(report.users_failed, 0);

    let tags: Vec<String> = channel
        .delivered()
        .into_iter()
        .map(|(_, _, tag)| tag)
        .collect();
    assert!(tags.contains(&"deadline-soon-urgent".to_string()));
    assert!(tags.contains(&"deadline-late-overdue".to_string()));
    assert!(!tags.iter().any(|t| t.contains("done")));
    assert!(!tags.iter().any(|t| t.contains("undated")));
}

#[tokio::test]
async fn test_scan_fans_out_across_users() {
    require_emulator!();

    let db = test_db().await;
    let channel = Arc::new(MemoryChannel::new());
    let state = build_state(Config::test_default(), db, channel.clone());
    let now = Utc::now();

    // Three users, one urgent task each; the scan must cover all of them.
    let mut user_ids = Vec::new();
    for i in 0..3 {
        let user_id = unique_user_id();
        state.db.upsert_user(&test_user(&user_id)).await.unwrap();

        let mut task = test_task(&user_id, &format!("fanout-{}", i));
        task.due_date = Some(now + Duration::hours(6));
        state.db.upsert_task(&task).await.unwrap();
        user_ids.push(user_id);
    }

    let report = state.monitor.check_upcoming_deadlines().await.unwrap();
    assert!(report.users_scanned >= 3);
    assert_eq!(report.users_failed, 0);

    let tags: Vec<String> = channel
        .delivered()
        .into_iter()
        .map(|(_, _, tag)| tag)
        .collect();
    for i in 0..3 {
        assert!(tags.contains(&format!("deadline-fanout-{}-urgent", i)));
    }
}

#[tokio::test]
async fn test_dispatch_appends_feed_and_bumps_stats() {
    require_emulator!();

    let db = test_db().await;
    let state = build_state(Config::test_default(), db, Arc::new(MemoryChannel::new()));
    let user_id = unique_user_id();

    let record_id = state.notifier.send_test(&user_id).await.unwrap();
    assert!(record_id.is_some());

    let feed = state
        .db
        .get_notification_feed(&user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(feed.records.len(), 1);
    assert!(!feed.records[0].read);

    let stats = state
        .db
        .get_notification_stats(&user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stats.total_sent, 1);
    assert_eq!(stats.counts_by_category.get("task-reminder"), Some(&1));

    // Mark read round-trips.
    let updated = state
        .notifier
        .mark_read(&user_id, &feed.records[0].id)
        .await
        .unwrap();
    assert!(updated);
}
