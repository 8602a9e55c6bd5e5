// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Background deadline monitor.
//!
//! A periodic timer scans every known user's tasks, classifies each task's
//! distance to its due date, and hands alerts to the dispatcher. Nothing
//! in the scan path is allowed to escape across the timer boundary: a
//! per-user failure is logged and isolated, and a whole-scan failure only
//! means the next tick retries.

use crate::db::FirestoreDb;
use crate::error::Result;
use crate::models::notification::NotificationTemplate;
use crate::models::{DeadlineMonitorSettings, NotificationCategory, Task};
use crate::services::notifier::NotificationDispatcher;
use crate::services::settings::SettingsStore;
use crate::time_utils;
use chrono::{DateTime, Utc};
use futures_util::{stream, StreamExt};
use std::sync::{Arc, Mutex};

/// Per-user scans fan out concurrently, bounded to avoid overloading
/// Firestore.
const MAX_CONCURRENT_USER_SCANS: usize = 8;

/// Classification of a dated, uncompleted task relative to now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineClass {
    /// Due date has passed; magnitude uses ceiling semantics, so 2 hours
    /// late is already 1 day overdue.
    Overdue { days_overdue: i64 },
    /// Due date is ahead; `days_until` uses ceiling semantics, so 23
    /// hours out is 1 day away.
    Upcoming { days_until: i64 },
}

/// Classify a due date against the current time.
pub fn classify_deadline(due: DateTime<Utc>, now: DateTime<Utc>) -> DeadlineClass {
    if due < now {
        DeadlineClass::Overdue {
            days_overdue: time_utils::days_overdue(due, now),
        }
    } else {
        DeadlineClass::Upcoming {
            days_until: time_utils::days_until(due, now),
        }
    }
}

/// Outcome of one full scan, for diagnostics and admin responses.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ScanReport {
    pub users_scanned: u32,
    pub users_failed: u32,
    pub alerts_sent: u32,
    pub alerts_suppressed: u32,
}

/// Periodic deadline scanner. `Stopped -> Running -> Stopped`, nothing in
/// between.
pub struct DeadlineMonitor {
    db: FirestoreDb,
    settings: SettingsStore,
    notifier: Arc<NotificationDispatcher>,
    timer: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl DeadlineMonitor {
    pub fn new(
        db: FirestoreDb,
        settings: SettingsStore,
        notifier: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            db,
            settings,
            notifier,
            timer: Mutex::new(None),
        }
    }

    /// Whether a timer handle is currently live.
    ///
    /// This is the source of truth for `monitoring_active`; the persisted
    /// flag merely mirrors it and can lag after a crash.
    pub fn is_active(&self) -> bool {
        self.timer
            .lock()
            .unwrap()
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Start monitoring: cancel any existing timer, run one immediate
    /// scan, then arm the periodic timer.
    pub async fn start(self: &Arc<Self>) -> DeadlineMonitorSettings {
        self.abort_timer();

        let mut settings = self.load_settings().await;
        settings.enabled = true;

        self.run_scan().await;
        settings.last_check_at = Some(Utc::now());

        let interval_minutes = settings.check_interval_minutes.max(1);
        let monitor = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(std::time::Duration::from_secs(
                u64::from(interval_minutes) * 60,
            ));
            // First tick is immediate and the immediate scan already ran.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                monitor.run_scan().await;
            }
        });
        *self.timer.lock().unwrap() = Some(handle);

        settings.monitoring_active = true;
        self.persist_settings(&settings).await;

        tracing::info!(
            interval_minutes,
            "Deadline monitoring started"
        );
        settings
    }

    /// Stop monitoring. Idempotent: stopping an already-stopped monitor is
    /// a no-op.
    pub async fn stop(&self) -> DeadlineMonitorSettings {
        self.abort_timer();

        let mut settings = self.load_settings().await;
        settings.enabled = false;
        settings.monitoring_active = false;
        self.persist_settings(&settings).await;

        tracing::info!("Deadline monitoring stopped");
        settings
    }

    /// Current persisted settings with `monitoring_active` resynchronized
    /// to the live timer handle.
    pub async fn status(&self) -> DeadlineMonitorSettings {
        let mut settings = self.load_settings().await;
        settings.monitoring_active = self.is_active();
        settings
    }

    /// One scan pass with all failures contained, used by the timer.
    pub async fn run_scan(&self) {
        match self.check_upcoming_deadlines().await {
            Ok(report) => {
                tracing::info!(
                    users = report.users_scanned,
                    failed = report.users_failed,
                    alerts = report.alerts_sent,
                    suppressed = report.alerts_suppressed,
                    "Deadline scan complete"
                );
            }
            Err(e) => {
                // The periodic timer stays armed; the next tick retries.
                tracing::warn!(error = %e, "Deadline scan failed");
            }
        }
    }

    /// Scan all users' tasks and dispatch deadline alerts.
    ///
    /// Foreground entry point for the admin trigger; errors enumerate the
    /// user list only. Per-user failures are isolated into the report.
    pub async fn check_upcoming_deadlines(&self) -> Result<ScanReport> {
        self.check_upcoming_deadlines_at(Utc::now()).await
    }

    async fn check_upcoming_deadlines_at(&self, now: DateTime<Utc>) -> Result<ScanReport> {
        let user_ids = self.db.list_user_ids().await?;
        let mut report = ScanReport::default();

        let outcomes: Vec<(String, Result<(u32, u32)>)> = stream::iter(user_ids)
            .map(|user_id| async move {
                let outcome = self.scan_user(&user_id, now).await;
                (user_id, outcome)
            })
            .buffer_unordered(MAX_CONCURRENT_USER_SCANS)
            .collect()
            .await;

        for (user_id, outcome) in outcomes {
            report.users_scanned += 1;
            match outcome {
                Ok((sent, suppressed)) => {
                    report.alerts_sent += sent;
                    report.alerts_suppressed += suppressed;
                }
                Err(e) => {
                    // One user's failure must not abort the sweep.
                    report.users_failed += 1;
                    tracing::warn!(user_id = %user_id, error = %e, "Per-user deadline scan failed");
                }
            }
        }

        let mut settings = self.load_settings().await;
        settings.last_check_at = Some(now);
        self.persist_settings(&settings).await;

        Ok(report)
    }

    async fn scan_user(&self, user_id: &str, now: DateTime<Utc>) -> Result<(u32, u32)> {
        let lead_days = self.settings.get(user_id).await.deadline_lead_time.days();
        let tasks = self.db.get_tasks_for_user(user_id).await?;

        let mut sent = 0;
        let mut suppressed = 0;
        for task in &tasks {
            let Some(due) = task.due_date else { continue };
            if task.completed {
                continue;
            }

            let Some(template) = deadline_alert(task, classify_deadline(due, now), lead_days)
            else {
                continue;
            };

            match self.notifier.dispatch_at(user_id, template, now).await {
                Ok(Some(_)) => sent += 1,
                Ok(None) => suppressed += 1,
                Err(e) => {
                    // Dispatch failure for one task doesn't stop the rest.
                    tracing::warn!(
                        user_id,
                        task_id = %task.id,
                        error = %e,
                        "Deadline alert dispatch failed"
                    );
                }
            }
        }

        Ok((sent, suppressed))
    }

    async fn load_settings(&self) -> DeadlineMonitorSettings {
        match self.db.get_monitor_settings().await {
            Ok(Some(settings)) => settings,
            Ok(None) => DeadlineMonitorSettings::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Monitor settings read failed; using defaults");
                DeadlineMonitorSettings::default()
            }
        }
    }

    /// Best-effort persistence. Losing a settings write leaves
    /// `monitoring_active` stale until the next start/stop, which is the
    /// documented desync behavior.
    async fn persist_settings(&self, settings: &DeadlineMonitorSettings) {
        if let Err(e) = self.db.set_monitor_settings(settings).await {
            tracing::warn!(error = %e, "Monitor settings write failed");
        }
    }

    fn abort_timer(&self) {
        if let Some(handle) = self.timer.lock().unwrap().take() {
            handle.abort();
        }
    }
}

/// Build the alert for a task, if its classification warrants one.
///
/// Returns `None` for tasks outside the user's lead time. The tag is
/// deterministic per task and alert kind so repeated scans coalesce at the
/// channel instead of stacking duplicates.
fn deadline_alert(
    task: &Task,
    class: DeadlineClass,
    lead_days: i64,
) -> Option<NotificationTemplate> {
    let (title, body, kind) = match class {
        DeadlineClass::Overdue { days_overdue } => (
            format!("Overdue: {}", task.title),
            if days_overdue <= 1 {
                format!("\"{}\" went past its deadline today.", task.title)
            } else {
                format!("\"{}\" is {} days overdue.", task.title, days_overdue)
            },
            "overdue",
        ),
        DeadlineClass::Upcoming { days_until } => {
            if days_until < 1 || days_until > lead_days {
                return None;
            }
            if days_until <= 1 {
                (
                    format!("Due soon: {}", task.title),
                    format!("\"{}\" is due within a day.", task.title),
                    "urgent",
                )
            } else {
                (
                    format!("Upcoming deadline: {}", task.title),
                    format!("\"{}\" is due in {} days.", task.title, days_until),
                    "warning",
                )
            }
        }
    };

    Some(NotificationTemplate {
        category: NotificationCategory::DeadlineAlert,
        title,
        body,
        tag: format!("deadline-{}-{}", task.id, kind),
        payload: serde_json::json!({ "task_id": task.id, "kind": kind }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Quadrant;
    use crate::services::channel::MemoryChannel;
    use chrono::Duration;

    fn at(raw: &str) -> DateTime<Utc> {
        raw.parse().expect("valid RFC3339 timestamp")
    }

    fn monitor_offline() -> Arc<DeadlineMonitor> {
        let db = FirestoreDb::new_mock();
        let settings = SettingsStore::new(db.clone());
        let notifier = Arc::new(NotificationDispatcher::new(
            db.clone(),
            settings.clone(),
            Arc::new(MemoryChannel::new()),
        ));
        Arc::new(DeadlineMonitor::new(db, settings, notifier))
    }

    fn task_due(id: &str, due: Option<DateTime<Utc>>, completed: bool) -> Task {
        Task {
            id: id.to_string(),
            user_id: "user-1".to_string(),
            title: "Quarterly report".to_string(),
            completed,
            due_date: due,
            quadrant: Quadrant::UrgentImportant,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn due_in_23_hours_is_urgent_pre_due_day_one() {
        let now = at("2026-08-25T12:00:00Z");
        let class = classify_deadline(now + Duration::hours(23), now);
        assert_eq!(class, DeadlineClass::Upcoming { days_until: 1 });

        let task = task_due("t1", Some(now + Duration::hours(23)), false);
        let alert = deadline_alert(&task, class, 1).expect("alert within lead time");
        assert_eq!(alert.tag, "deadline-t1-urgent");
    }

    #[test]
    fn due_two_hours_ago_is_one_day_overdue() {
        let now = at("2026-08-25T12:00:00Z");
        let class = classify_deadline(now - Duration::hours(2), now);
        assert_eq!(class, DeadlineClass::Overdue { days_overdue: 1 });

        let task = task_due("t1", Some(now - Duration::hours(2)), false);
        let alert = deadline_alert(&task, class, 1).expect("overdue always alerts");
        assert_eq!(alert.tag, "deadline-t1-overdue");
    }

    #[test]
    fn beyond_lead_time_produces_no_alert() {
        let now = at("2026-08-25T12:00:00Z");
        let task = task_due("t1", Some(now + Duration::days(5)), false);
        let class = classify_deadline(now + Duration::days(5), now);

        // One-day lead: five days out is silent.
        assert!(deadline_alert(&task, class, 1).is_none());
        // One-week lead: five days out is a warning.
        let alert = deadline_alert(&task, class, 7).expect("within one-week lead");
        assert_eq!(alert.tag, "deadline-t1-warning");
    }

    #[test]
    fn two_days_out_with_three_day_lead_is_warning_not_urgent() {
        let now = at("2026-08-25T12:00:00Z");
        let class = classify_deadline(now + Duration::days(2), now);
        let task = task_due("t1", Some(now + Duration::days(2)), false);

        let alert = deadline_alert(&task, class, 3).unwrap();
        assert_eq!(alert.tag, "deadline-t1-warning");
        assert!(alert.body.contains("2 days"));
    }

    #[tokio::test]
    async fn stop_twice_is_a_noop() {
        let monitor = monitor_offline();

        monitor.stop().await;
        let settings = monitor.stop().await;

        assert!(!settings.monitoring_active);
        assert!(!monitor.is_active());
    }

    #[tokio::test]
    async fn start_arms_timer_and_stop_disarms_it() {
        let monitor = monitor_offline();

        let started = monitor.start().await;
        assert!(started.monitoring_active);
        assert!(monitor.is_active());

        let stopped = monitor.stop().await;
        assert!(!stopped.monitoring_active);
        assert!(!monitor.is_active());
    }

    #[tokio::test]
    async fn restart_replaces_existing_timer() {
        let monitor = monitor_offline();

        monitor.start().await;
        monitor.start().await;
        assert!(monitor.is_active());

        monitor.stop().await;
        assert!(!monitor.is_active());
    }

    #[tokio::test]
    async fn offline_scan_reports_error_without_panicking() {
        let monitor = monitor_offline();
        // run_scan must contain the failure; reaching the assert is the test.
        monitor.run_scan().await;
        assert!(!monitor.is_active());
    }
}
