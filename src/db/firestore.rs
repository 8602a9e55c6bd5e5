// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users and their tasks
//! - Notification settings, feeds, and dispatch stats
//! - Achievement stats and unlocked achievements
//! - The deadline-monitor settings singleton

use crate::db::collections;
use crate::error::AppError;
use crate::models::{
    Achievement, AchievementKind, AchievementStats, DeadlineMonitorSettings, NotificationFeed,
    NotificationSettings, NotificationStats, Task, User,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Document ID of the deadline-monitor settings singleton.
const MONITOR_SETTINGS_DOC: &str = "deadline-monitor";

/// Stored achievement row.
///
/// The document ID is `{user_id}_{achievement_id}`, so a dedupe key can
/// exist at most once per user; `user_id` is duplicated into the body for
/// per-user queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AchievementDoc {
    user_id: String,
    achievement_id: String,
    kind: AchievementKind,
    title: String,
    body: String,
    unlocked_at: DateTime<Utc>,
}

impl AchievementDoc {
    fn from_achievement(user_id: &str, achievement: &Achievement) -> Self {
        Self {
            user_id: user_id.to_string(),
            achievement_id: achievement.id.clone(),
            kind: achievement.kind,
            title: achievement.title.clone(),
            body: achievement.body.clone(),
            unlocked_at: achievement.unlocked_at,
        }
    }

    fn into_achievement(self) -> Achievement {
        Achievement {
            id: self.achievement_id,
            kind: self.kind,
            title: self.title,
            body: self.body,
            unlocked_at: self.unlocked_at,
        }
    }
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Composite document ID for per-user records.
    fn scoped_id(user_id: &str, suffix: &str) -> String {
        format!("{}_{}", user_id, suffix)
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Create or update a user.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.user_id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Enumerate all known user IDs (task collection owners).
    pub async fn list_user_ids(&self) -> Result<Vec<String>, AppError> {
        let users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(users.into_iter().map(|u| u.user_id).collect())
    }

    // ─── Task Operations ─────────────────────────────────────────

    /// Get a single task.
    pub async fn get_task(&self, user_id: &str, task_id: &str) -> Result<Option<Task>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::TASKS)
            .obj()
            .one(&Self::scoped_id(user_id, task_id))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get all tasks for a user.
    pub async fn get_tasks_for_user(&self, user_id: &str) -> Result<Vec<Task>, AppError> {
        let owner = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::TASKS)
            .filter(move |q| q.for_all([q.field("user_id").eq(owner.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a task.
    pub async fn upsert_task(&self, task: &Task) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::TASKS)
            .document_id(Self::scoped_id(&task.user_id, &task.id))
            .object(task)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Notification Settings ───────────────────────────────────

    /// Get notification settings for a user.
    ///
    /// `None` means no settings document exists yet; callers treat that as
    /// the documented default.
    pub async fn get_notification_settings(
        &self,
        user_id: &str,
    ) -> Result<Option<NotificationSettings>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::NOTIFICATION_SETTINGS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store notification settings for a user.
    pub async fn set_notification_settings(
        &self,
        user_id: &str,
        settings: &NotificationSettings,
    ) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::NOTIFICATION_SETTINGS)
            .document_id(user_id)
            .object(settings)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Notification Feed & Stats ───────────────────────────────

    /// Get a user's notification feed document.
    pub async fn get_notification_feed(
        &self,
        user_id: &str,
    ) -> Result<Option<NotificationFeed>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::NOTIFICATION_FEEDS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store a user's notification feed document.
    pub async fn set_notification_feed(
        &self,
        user_id: &str,
        feed: &NotificationFeed,
    ) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::NOTIFICATION_FEEDS)
            .document_id(user_id)
            .object(feed)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get a user's dispatch stats.
    pub async fn get_notification_stats(
        &self,
        user_id: &str,
    ) -> Result<Option<NotificationStats>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::NOTIFICATION_STATS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store a user's dispatch stats.
    pub async fn set_notification_stats(
        &self,
        user_id: &str,
        stats: &NotificationStats,
    ) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::NOTIFICATION_STATS)
            .document_id(user_id)
            .object(stats)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Achievement Stats & Unlocks ─────────────────────────────

    /// Get a user's streak/goal aggregates.
    pub async fn get_achievement_stats(
        &self,
        user_id: &str,
    ) -> Result<Option<AchievementStats>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::ACHIEVEMENT_STATS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store a user's streak/goal aggregates.
    pub async fn set_achievement_stats(
        &self,
        user_id: &str,
        stats: &AchievementStats,
    ) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::ACHIEVEMENT_STATS)
            .document_id(user_id)
            .object(stats)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get all achievements unlocked by a user, newest first.
    pub async fn get_achievements_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<Achievement>, AppError> {
        let owner = user_id.to_string();
        let docs: Vec<AchievementDoc> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::ACHIEVEMENTS)
            .filter(move |q| q.for_all([q.field("user_id").eq(owner.clone())]))
            .order_by([(
                "unlocked_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(docs.into_iter().map(AchievementDoc::into_achievement).collect())
    }

    /// Persist an unlocked achievement.
    ///
    /// The document ID is derived from the dedupe key, so replaying the
    /// same unlock overwrites rather than duplicates.
    pub async fn insert_achievement(
        &self,
        user_id: &str,
        achievement: &Achievement,
    ) -> Result<(), AppError> {
        let doc = AchievementDoc::from_achievement(user_id, achievement);
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::ACHIEVEMENTS)
            .document_id(Self::scoped_id(user_id, &achievement.id))
            .object(&doc)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Deadline Monitor Settings ───────────────────────────────

    /// Get the deadline-monitor settings singleton.
    pub async fn get_monitor_settings(
        &self,
    ) -> Result<Option<DeadlineMonitorSettings>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::SYSTEM)
            .obj()
            .one(MONITOR_SETTINGS_DOC)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store the deadline-monitor settings singleton.
    pub async fn set_monitor_settings(
        &self,
        settings: &DeadlineMonitorSettings,
    ) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::SYSTEM)
            .document_id(MONITOR_SETTINGS_DOC)
            .object(settings)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
