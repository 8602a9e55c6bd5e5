// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Settings store: persisted notification preferences per user.
//!
//! Reads never fail. A missing document, a read error, or a corrupt blob
//! all degrade to the documented defaults so notification gating always
//! has something to work with.

use crate::db::FirestoreDb;
use crate::error::Result;
use crate::models::{NotificationSettings, NotificationSettingsPatch};

/// Persisted user preference store.
#[derive(Clone)]
pub struct SettingsStore {
    db: FirestoreDb,
}

impl SettingsStore {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Get a user's notification settings, falling back to defaults.
    pub async fn get(&self, user_id: &str) -> NotificationSettings {
        match self.db.get_notification_settings(user_id).await {
            Ok(Some(settings)) => settings,
            Ok(None) => NotificationSettings::default(),
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Settings read failed; using defaults");
                NotificationSettings::default()
            }
        }
    }

    /// Merge a typed partial update into the stored settings.
    ///
    /// Nested objects merge key-by-key so patching one field never erases
    /// its siblings. Returns the merged settings.
    pub async fn update(
        &self,
        user_id: &str,
        patch: &NotificationSettingsPatch,
    ) -> Result<NotificationSettings> {
        let mut settings = self.get(user_id).await;
        settings.apply(patch);
        self.db
            .set_notification_settings(user_id, &settings)
            .await?;
        tracing::debug!(user_id, "Notification settings updated");
        Ok(settings)
    }

    /// Restore the full default settings object.
    pub async fn reset(&self, user_id: &str) -> Result<NotificationSettings> {
        let settings = NotificationSettings::default();
        self.db
            .set_notification_settings(user_id, &settings)
            .await?;
        tracing::info!(user_id, "Notification settings reset to defaults");
        Ok(settings)
    }
}
