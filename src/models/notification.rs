// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Notification feed records, dispatch templates, and delivery stats.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Maximum number of records retained in a user's feed.
pub const FEED_RETENTION: usize = 50;

/// Category a notification belongs to, gated by the matching settings toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationCategory {
    TaskReminder,
    DeadlineAlert,
    WeeklyUpdate,
    Achievement,
}

impl NotificationCategory {
    /// Stable identifier used as a stats map key.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationCategory::TaskReminder => "task-reminder",
            NotificationCategory::DeadlineAlert => "deadline-alert",
            NotificationCategory::WeeklyUpdate => "weekly-update",
            NotificationCategory::Achievement => "achievement",
        }
    }
}

/// What to send; the dispatcher decides whether it may be sent.
#[derive(Debug, Clone)]
pub struct NotificationTemplate {
    pub category: NotificationCategory,
    pub title: String,
    pub body: String,
    /// Deterministic delivery tag; repeated dispatches of the same logical
    /// alert share a tag so the platform channel can coalesce them.
    pub tag: String,
    pub payload: serde_json::Value,
}

/// A delivered notification as it appears in the user's feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: String,
    pub category: NotificationCategory,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub read: bool,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// A user's notification feed document, newest first, capped at
/// [`FEED_RETENTION`] records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationFeed {
    #[serde(default)]
    pub records: Vec<NotificationRecord>,
}

impl NotificationFeed {
    /// Prepend a record, evicting the oldest beyond the retention cap.
    pub fn push(&mut self, record: NotificationRecord) {
        self.records.insert(0, record);
        self.records.truncate(FEED_RETENTION);
    }

    /// Mark a record read by id. Returns false if the id is unknown
    /// (possibly already evicted).
    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.read = true;
                true
            }
            None => false,
        }
    }
}

/// Per-user dispatch bookkeeping. Counters only grow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationStats {
    #[serde(default)]
    pub total_sent: u64,
    #[serde(default)]
    pub last_sent_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub counts_by_category: HashMap<String, u64>,
}

impl NotificationStats {
    /// Record one successful dispatch.
    pub fn record_sent(&mut self, category: NotificationCategory, now: DateTime<Utc>) {
        self.total_sent += 1;
        self.last_sent_at = Some(now);
        *self
            .counts_by_category
            .entry(category.as_str().to_string())
            .or_insert(0) += 1;
    }
}
