// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod achievement;
pub mod monitor;
pub mod notification;
pub mod settings;
pub mod task;

pub use achievement::{Achievement, AchievementKind, AchievementStats};
pub use monitor::DeadlineMonitorSettings;
pub use notification::{
    NotificationCategory, NotificationFeed, NotificationRecord, NotificationStats,
    NotificationTemplate,
};
pub use settings::{NotificationSettings, NotificationSettingsPatch};
pub use task::{Quadrant, Task, User};
