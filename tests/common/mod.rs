// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use quadrant_tracker::config::Config;
use quadrant_tracker::db::FirestoreDb;
use quadrant_tracker::routes::create_router;
use quadrant_tracker::services::{
    DeadlineMonitor, MemoryChannel, NotificationDispatcher, RateLimiter, SettingsStore,
    StreakEngine,
};
use quadrant_tracker::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Build app state around a database and recording channel.
#[allow(dead_code)]
pub fn build_state(
    config: Config,
    db: FirestoreDb,
    channel: Arc<MemoryChannel>,
) -> Arc<AppState> {
    let settings = SettingsStore::new(db.clone());
    let notifier = Arc::new(NotificationDispatcher::new(
        db.clone(),
        settings.clone(),
        channel,
    ));
    let streaks = StreakEngine::new(db.clone(), Arc::clone(&notifier));
    let monitor = Arc::new(DeadlineMonitor::new(
        db.clone(),
        settings.clone(),
        Arc::clone(&notifier),
    ));

    Arc::new(AppState {
        config,
        db,
        settings,
        notifier,
        streaks,
        monitor,
        rate_limiter: Arc::new(RateLimiter::new()),
    })
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_config(Config::test_default())
}

/// Create a test app with offline mock dependencies and a custom config.
#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config) -> (axum::Router, Arc<AppState>) {
    let state = build_state(config, test_db_offline(), Arc::new(MemoryChannel::new()));
    (create_router(state.clone()), state)
}
