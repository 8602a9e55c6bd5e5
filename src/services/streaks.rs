// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Streak & achievement engine.
//!
//! Consumes task-completion events, folds them into the per-user
//! aggregates, and emits newly unlocked achievements exactly once per
//! dedupe key. Each unlock is persisted before its announcement is
//! attempted; announcement failure never rolls back the unlock.
//!
//! Concurrent completions for the same user race last-write-wins on the
//! stats document. The single-process tokio runtime serializes the common
//! case; a multi-instance deployment would need a per-user transaction.

use crate::db::FirestoreDb;
use crate::error::Result;
use crate::models::achievement::evaluate_milestones;
use crate::models::notification::NotificationTemplate;
use crate::models::{Achievement, NotificationCategory, Task};
use crate::services::notifier::NotificationDispatcher;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;

/// Streak/goal counter and milestone engine.
pub struct StreakEngine {
    db: FirestoreDb,
    notifier: Arc<NotificationDispatcher>,
}

impl StreakEngine {
    pub fn new(db: FirestoreDb, notifier: Arc<NotificationDispatcher>) -> Self {
        Self { db, notifier }
    }

    /// Process a task transitioning to completed.
    ///
    /// Returns only achievements unlocked by this event.
    pub async fn process_completion(&self, user_id: &str, task: &Task) -> Result<Vec<Achievement>> {
        self.process_completion_at(user_id, task, Utc::now()).await
    }

    /// [`process_completion`](Self::process_completion) with an explicit
    /// clock for deterministic streak tests.
    pub async fn process_completion_at(
        &self,
        user_id: &str,
        task: &Task,
        now: DateTime<Utc>,
    ) -> Result<Vec<Achievement>> {
        // Read-modify-write of the stats blob as one logical unit.
        let mut stats = self
            .db
            .get_achievement_stats(user_id)
            .await?
            .unwrap_or_default();
        stats.record_completion(task.quadrant, now);
        self.db.set_achievement_stats(user_id, &stats).await?;

        // Milestones are gated against the full historical set, so a
        // replayed completion cannot re-emit an unlock.
        let unlocked: HashSet<String> = self
            .db
            .get_achievements_for_user(user_id)
            .await?
            .into_iter()
            .map(|a| a.id)
            .collect();

        let fresh = evaluate_milestones(&stats, &unlocked, now);

        for achievement in &fresh {
            self.db.insert_achievement(user_id, achievement).await?;
            tracing::info!(
                user_id,
                achievement = %achievement.id,
                "Achievement unlocked"
            );
            self.announce(user_id, achievement).await;
        }

        tracing::debug!(
            user_id,
            task_id = %task.id,
            total = stats.total_completed,
            streak = stats.current_streak,
            unlocked = fresh.len(),
            "Completion processed"
        );

        Ok(fresh)
    }

    /// Announce an unlock through the dispatcher. Best-effort: the unlock
    /// is already persisted, so a failed or suppressed announcement is
    /// only logged.
    async fn announce(&self, user_id: &str, achievement: &Achievement) {
        let template = NotificationTemplate {
            category: NotificationCategory::Achievement,
            title: format!("Achievement unlocked: {}", achievement.title),
            body: achievement.body.clone(),
            tag: format!("achievement-{}", achievement.id),
            payload: serde_json::json!({ "achievement_id": achievement.id }),
        };

        match self.notifier.dispatch(user_id, template).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                tracing::debug!(
                    user_id,
                    achievement = %achievement.id,
                    "Achievement announcement suppressed"
                );
            }
            Err(e) => {
                tracing::warn!(
                    user_id,
                    achievement = %achievement.id,
                    error = %e,
                    "Achievement announcement failed (unlock kept)"
                );
            }
        }
    }
}
