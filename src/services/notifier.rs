// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Notification dispatcher.
//!
//! Every dispatch runs the same short-circuiting pipeline: category toggle,
//! channel availability, quiet hours. A gate miss is a normal `None`
//! outcome, not an error. On success the notification is delivered, a feed
//! record is appended (capped history), and per-category stats are bumped.

use crate::db::FirestoreDb;
use crate::error::Result;
use crate::models::notification::{NotificationRecord, NotificationTemplate};
use crate::models::{NotificationCategory, NotificationSettings};
use crate::services::channel::DeliveryChannel;
use crate::services::settings::SettingsStore;
use crate::time_utils;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Why a dispatch was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchSkip {
    CategoryDisabled,
    ChannelUnavailable,
    QuietHours,
}

/// Validates settings, resolves quiet-hours suppression, and performs
/// channel delivery plus feed/stats bookkeeping.
pub struct NotificationDispatcher {
    db: FirestoreDb,
    settings: SettingsStore,
    channel: Arc<dyn DeliveryChannel>,
}

impl NotificationDispatcher {
    pub fn new(db: FirestoreDb, settings: SettingsStore, channel: Arc<dyn DeliveryChannel>) -> Self {
        Self {
            db,
            settings,
            channel,
        }
    }

    /// Dispatch a notification now.
    ///
    /// Returns the feed record ID, or `None` when a gate suppressed the
    /// dispatch. Delivery and persistence failures are errors; background
    /// callers catch and log them, foreground callers surface them.
    pub async fn dispatch(
        &self,
        user_id: &str,
        template: NotificationTemplate,
    ) -> Result<Option<String>> {
        self.dispatch_at(user_id, template, Utc::now()).await
    }

    /// [`dispatch`](Self::dispatch) with an explicit clock for
    /// deterministic quiet-hours tests.
    pub async fn dispatch_at(
        &self,
        user_id: &str,
        template: NotificationTemplate,
        now: DateTime<Utc>,
    ) -> Result<Option<String>> {
        let settings = self.settings.get(user_id).await;

        if let Some(skip) = self.skip_reason(&settings, template.category, now) {
            tracing::debug!(
                user_id,
                category = template.category.as_str(),
                reason = ?skip,
                "Notification suppressed"
            );
            return Ok(None);
        }

        self.channel
            .deliver(&template.title, &template.body, &template.tag)
            .await?;

        let record = NotificationRecord {
            id: uuid::Uuid::new_v4().to_string(),
            category: template.category,
            title: template.title,
            body: template.body,
            created_at: now,
            read: false,
            payload: template.payload,
        };
        let record_id = record.id.clone();

        // Feed and stats reads tolerate transient failures and corrupt
        // blobs by starting from defaults; the append/increment must not
        // be lost to a bad read.
        let mut feed = match self.db.get_notification_feed(user_id).await {
            Ok(feed) => feed.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Feed read failed; starting fresh");
                Default::default()
            }
        };
        feed.push(record);
        self.db.set_notification_feed(user_id, &feed).await?;

        let mut stats = match self.db.get_notification_stats(user_id).await {
            Ok(stats) => stats.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Stats read failed; starting fresh");
                Default::default()
            }
        };
        stats.record_sent(template.category, now);
        self.db.set_notification_stats(user_id, &stats).await?;

        tracing::info!(
            user_id,
            record_id = %record_id,
            category = template.category.as_str(),
            "Notification dispatched"
        );

        Ok(Some(record_id))
    }

    /// Which gate, if any, suppresses a dispatch for these settings.
    pub fn skip_reason(
        &self,
        settings: &NotificationSettings,
        category: NotificationCategory,
        now: DateTime<Utc>,
    ) -> Option<DispatchSkip> {
        if !settings.category_enabled(category) {
            return Some(DispatchSkip::CategoryDisabled);
        }
        if !self.channel.is_available() {
            return Some(DispatchSkip::ChannelUnavailable);
        }
        if settings.quiet_hours.suppresses(time_utils::minutes_of_day(now)) {
            return Some(DispatchSkip::QuietHours);
        }
        None
    }

    /// Advisory cancellation by delivery tag.
    ///
    /// Channels that have already rendered the notification may be unable
    /// to retract it; a `false` return is a documented limitation, not an
    /// error.
    pub fn cancel(&self, tag: &str) -> bool {
        let retracted = self.channel.cancel(tag);
        tracing::debug!(tag, retracted, "Notification cancellation requested");
        retracted
    }

    /// Mark a feed record read. Returns false when the record is unknown
    /// (possibly already evicted from the capped feed).
    pub async fn mark_read(&self, user_id: &str, record_id: &str) -> Result<bool> {
        let Some(mut feed) = self.db.get_notification_feed(user_id).await? else {
            return Ok(false);
        };
        if !feed.mark_read(record_id) {
            return Ok(false);
        }
        self.db.set_notification_feed(user_id, &feed).await?;
        Ok(true)
    }

    /// Foreground test send; all gates still apply, and failures surface
    /// to the caller.
    pub async fn send_test(&self, user_id: &str) -> Result<Option<String>> {
        let template = NotificationTemplate {
            category: NotificationCategory::TaskReminder,
            title: "Test notification".to_string(),
            body: "Notifications are working.".to_string(),
            tag: "test-notification".to_string(),
            payload: serde_json::Value::Null,
        };
        self.dispatch(user_id, template).await
    }
}
