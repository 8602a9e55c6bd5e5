//! Streak/goal aggregates and achievement unlock records.
//!
//! These aggregates are pre-computed when completions are processed,
//! reducing dashboard Firestore reads from O(tasks) to O(1). Milestone
//! evaluation is pure so it can be replayed deterministically in tests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::models::task::Quadrant;
use crate::time_utils;

/// Completion-count milestones, ascending.
pub const TOTAL_MILESTONES: [u32; 8] = [1, 5, 10, 25, 50, 100, 250, 500];

/// Consecutive-day streak milestones, ascending.
pub const STREAK_MILESTONES: [u32; 6] = [3, 7, 14, 30, 60, 100];

/// Per-quadrant completion milestones, ascending.
pub const QUADRANT_MILESTONES: [u32; 3] = [10, 25, 50];

const ALL_QUADRANTS: [Quadrant; 4] = [
    Quadrant::UrgentImportant,
    Quadrant::NotUrgentImportant,
    Quadrant::UrgentNotImportant,
    Quadrant::NotUrgentNotImportant,
];

/// Pre-computed completion statistics for a user.
///
/// Stored in the `achievement_stats` collection, keyed by user ID, and
/// read-modify-written as one logical unit per completion event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementStats {
    // ─── Totals ──────────────────────────────────────────────────
    #[serde(default)]
    pub total_completed: u32,
    /// Completion count per quadrant
    #[serde(default)]
    pub completed_by_quadrant: HashMap<String, u32>,

    // ─── Streaks ─────────────────────────────────────────────────
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub longest_streak: u32,
    #[serde(default)]
    pub last_completion_date: Option<DateTime<Utc>>,

    // ─── Goal Windows ────────────────────────────────────────────
    #[serde(default = "default_weekly_goal")]
    pub weekly_goal: u32,
    #[serde(default)]
    pub weekly_completed: u32,
    #[serde(default = "default_monthly_goal")]
    pub monthly_goal: u32,
    #[serde(default)]
    pub monthly_completed: u32,

    // ─── Metadata ────────────────────────────────────────────────
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_weekly_goal() -> u32 {
    10
}

fn default_monthly_goal() -> u32 {
    30
}

impl Default for AchievementStats {
    fn default() -> Self {
        Self {
            total_completed: 0,
            completed_by_quadrant: HashMap::new(),
            current_streak: 0,
            longest_streak: 0,
            last_completion_date: None,
            weekly_goal: default_weekly_goal(),
            weekly_completed: 0,
            monthly_goal: default_monthly_goal(),
            monthly_completed: 0,
            updated_at: None,
        }
    }
}

impl AchievementStats {
    /// Fold one task completion into the aggregates.
    ///
    /// Streak rules are calendar-date based: a second completion on the
    /// same date leaves the streak unchanged, a completion on the date
    /// after the last one extends it, and anything else restarts it at 1.
    pub fn record_completion(&mut self, quadrant: Quadrant, now: DateTime<Utc>) {
        match self.last_completion_date {
            Some(last) if time_utils::same_calendar_day(last, now) => {
                // Streak unchanged; multiple completions in one day don't stack.
            }
            Some(last) if time_utils::is_previous_calendar_day(last, now) => {
                self.current_streak += 1;
            }
            _ => {
                self.current_streak = 1;
            }
        }
        self.longest_streak = self.longest_streak.max(self.current_streak);

        self.weekly_completed = match self.last_completion_date {
            Some(last) if time_utils::same_iso_week(last, now) => self.weekly_completed + 1,
            _ => 1,
        };
        self.monthly_completed = match self.last_completion_date {
            Some(last) if time_utils::same_calendar_month(last, now) => self.monthly_completed + 1,
            _ => 1,
        };

        self.total_completed += 1;
        *self
            .completed_by_quadrant
            .entry(quadrant.as_str().to_string())
            .or_insert(0) += 1;

        self.last_completion_date = Some(now);
        self.updated_at = Some(now);
    }

    fn quadrant_count(&self, quadrant: Quadrant) -> u32 {
        self.completed_by_quadrant
            .get(quadrant.as_str())
            .copied()
            .unwrap_or(0)
    }
}

/// Kind of milestone an achievement marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AchievementKind {
    CompletionCount,
    Streak,
    Goal,
    QuadrantMilestone,
}

/// An unlocked achievement.
///
/// `id` doubles as the dedupe key: the Firestore document ID is derived
/// from it, so a given milestone can exist at most once per user, ever.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub kind: AchievementKind,
    pub title: String,
    pub body: String,
    pub unlocked_at: DateTime<Utc>,
}

/// Evaluate every milestone against the current aggregates, returning only
/// achievements whose dedupe keys are absent from `unlocked`.
///
/// Pure and replay-safe: re-running with stats that already satisfy a
/// milestone emits nothing new once the key is in history.
pub fn evaluate_milestones(
    stats: &AchievementStats,
    unlocked: &HashSet<String>,
    now: DateTime<Utc>,
) -> Vec<Achievement> {
    let mut fresh = Vec::new();
    let mut push = |id: String, kind: AchievementKind, title: String, body: String| {
        if !unlocked.contains(&id) && !fresh.iter().any(|a: &Achievement| a.id == id) {
            fresh.push(Achievement {
                id,
                kind,
                title,
                body,
                unlocked_at: now,
            });
        }
    };

    for milestone in TOTAL_MILESTONES {
        if stats.total_completed >= milestone {
            let (title, body) = if milestone == 1 {
                (
                    "First task done!".to_string(),
                    "You completed your first task.".to_string(),
                )
            } else {
                (
                    format!("{} tasks completed", milestone),
                    format!("You have completed {} tasks in total.", milestone),
                )
            };
            push(
                format!("total-{}", milestone),
                AchievementKind::CompletionCount,
                title,
                body,
            );
        }
    }

    for milestone in STREAK_MILESTONES {
        if stats.current_streak >= milestone {
            push(
                format!("streak-{}", milestone),
                AchievementKind::Streak,
                format!("{}-day streak", milestone),
                format!(
                    "You completed tasks on {} consecutive days.",
                    milestone
                ),
            );
        }
    }

    if stats.weekly_goal > 0 && stats.weekly_completed >= stats.weekly_goal {
        push(
            "weekly-goal".to_string(),
            AchievementKind::Goal,
            "Weekly goal reached".to_string(),
            format!("You hit your goal of {} tasks in a week.", stats.weekly_goal),
        );
    }
    if stats.monthly_goal > 0 && stats.monthly_completed >= stats.monthly_goal {
        push(
            "monthly-goal".to_string(),
            AchievementKind::Goal,
            "Monthly goal reached".to_string(),
            format!(
                "You hit your goal of {} tasks in a month.",
                stats.monthly_goal
            ),
        );
    }

    for quadrant in ALL_QUADRANTS {
        let count = stats.quadrant_count(quadrant);
        for milestone in QUADRANT_MILESTONES {
            if count >= milestone {
                push(
                    format!("quadrant-{}-{}", quadrant.as_str(), milestone),
                    AchievementKind::QuadrantMilestone,
                    format!("{} x{}", quadrant.label(), milestone),
                    format!(
                        "You completed {} tasks in the {} quadrant.",
                        milestone,
                        quadrant.label()
                    ),
                );
            }
        }
    }

    fresh
}
