// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Quadrant-Tracker: notification & engagement engine for an
//! Eisenhower-matrix task manager.
//!
//! This crate provides the backend that watches task deadlines, dispatches
//! settings-aware notifications, tracks completion streaks and
//! achievements, and rate-limits the inbound API.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{DeadlineMonitor, NotificationDispatcher, RateLimiter, SettingsStore, StreakEngine};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub settings: SettingsStore,
    pub notifier: Arc<NotificationDispatcher>,
    pub streaks: StreakEngine,
    pub monitor: Arc<DeadlineMonitor>,
    pub rate_limiter: Arc<RateLimiter>,
}
