// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-user notification settings and their typed partial updates.
//!
//! A missing settings document always deserializes to [`NotificationSettings::default`];
//! absence is never an error. Partial updates are strongly typed per nested
//! object and merge key-by-key, so patching one field of `quiet_hours` never
//! erases its siblings. Unknown keys are rejected at the boundary.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::notification::NotificationCategory;
use crate::time_utils;

/// How far before a due date the deadline alert should fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeadlineLeadTime {
    OneDay,
    ThreeDays,
    OneWeek,
}

impl DeadlineLeadTime {
    /// Lead time expressed in whole days.
    pub fn days(&self) -> i64 {
        match self {
            DeadlineLeadTime::OneDay => 1,
            DeadlineLeadTime::ThreeDays => 3,
            DeadlineLeadTime::OneWeek => 7,
        }
    }
}

/// Local-time window during which delivery is suppressed.
///
/// `start` may be numerically greater than `end`, in which case the window
/// spans midnight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuietHours {
    pub enabled: bool,
    /// "HH:MM"
    pub start: String,
    /// "HH:MM"
    pub end: String,
}

impl Default for QuietHours {
    fn default() -> Self {
        Self {
            enabled: false,
            start: "22:00".to_string(),
            end: "07:00".to_string(),
        }
    }
}

impl QuietHours {
    /// Whether a clock time (minutes since midnight) is suppressed.
    ///
    /// An unparseable boundary disables suppression rather than failing:
    /// corrupt settings must never block delivery outright.
    pub fn suppresses(&self, current_minutes: u32) -> bool {
        if !self.enabled {
            return false;
        }
        match (
            time_utils::parse_clock_time(&self.start),
            time_utils::parse_clock_time(&self.end),
        ) {
            (Some(start), Some(end)) => time_utils::in_clock_window(current_minutes, start, end),
            _ => {
                tracing::warn!(start = %self.start, end = %self.end, "Unparseable quiet hours; ignoring");
                false
            }
        }
    }
}

/// Notification sound preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundSettings {
    pub enabled: bool,
    pub kind: String,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            kind: "default".to_string(),
        }
    }
}

/// Per-user notification settings document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSettings {
    #[serde(default = "default_true")]
    pub task_reminders: bool,
    #[serde(default = "default_true")]
    pub deadline_alerts: bool,
    #[serde(default = "default_true")]
    pub weekly_updates: bool,
    #[serde(default = "default_true")]
    pub achievements: bool,
    #[serde(default)]
    pub email: bool,
    #[serde(default = "default_true")]
    pub push: bool,
    #[serde(default = "default_true")]
    pub vibration: bool,
    #[serde(default)]
    pub quiet_hours: QuietHours,
    #[serde(default = "default_lead_time")]
    pub deadline_lead_time: DeadlineLeadTime,
    #[serde(default)]
    pub sound: SoundSettings,
}

fn default_true() -> bool {
    true
}

fn default_lead_time() -> DeadlineLeadTime {
    DeadlineLeadTime::OneDay
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            task_reminders: true,
            deadline_alerts: true,
            weekly_updates: true,
            achievements: true,
            email: false,
            push: true,
            vibration: true,
            quiet_hours: QuietHours::default(),
            deadline_lead_time: default_lead_time(),
            sound: SoundSettings::default(),
        }
    }
}

impl NotificationSettings {
    /// Whether the toggle for a notification category is on.
    pub fn category_enabled(&self, category: NotificationCategory) -> bool {
        match category {
            NotificationCategory::TaskReminder => self.task_reminders,
            NotificationCategory::DeadlineAlert => self.deadline_alerts,
            NotificationCategory::WeeklyUpdate => self.weekly_updates,
            NotificationCategory::Achievement => self.achievements,
        }
    }

    /// Merge a typed partial update into this settings object.
    ///
    /// Nested objects merge key-by-key; absent fields are left untouched.
    pub fn apply(&mut self, patch: &NotificationSettingsPatch) {
        if let Some(v) = patch.task_reminders {
            self.task_reminders = v;
        }
        if let Some(v) = patch.deadline_alerts {
            self.deadline_alerts = v;
        }
        if let Some(v) = patch.weekly_updates {
            self.weekly_updates = v;
        }
        if let Some(v) = patch.achievements {
            self.achievements = v;
        }
        if let Some(v) = patch.email {
            self.email = v;
        }
        if let Some(v) = patch.push {
            self.push = v;
        }
        if let Some(v) = patch.vibration {
            self.vibration = v;
        }
        if let Some(quiet) = &patch.quiet_hours {
            if let Some(v) = quiet.enabled {
                self.quiet_hours.enabled = v;
            }
            if let Some(v) = &quiet.start {
                self.quiet_hours.start = v.clone();
            }
            if let Some(v) = &quiet.end {
                self.quiet_hours.end = v.clone();
            }
        }
        if let Some(v) = patch.deadline_lead_time {
            self.deadline_lead_time = v;
        }
        if let Some(sound) = &patch.sound {
            if let Some(v) = sound.enabled {
                self.sound.enabled = v;
            }
            if let Some(v) = &sound.kind {
                self.sound.kind = v.clone();
            }
        }
    }
}

/// Partial update for [`QuietHours`].
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct QuietHoursPatch {
    pub enabled: Option<bool>,
    #[validate(custom(function = "validate_clock_time"))]
    pub start: Option<String>,
    #[validate(custom(function = "validate_clock_time"))]
    pub end: Option<String>,
}

/// Partial update for [`SoundSettings`].
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SoundSettingsPatch {
    pub enabled: Option<bool>,
    #[validate(length(min = 1, max = 64))]
    pub kind: Option<String>,
}

/// Typed partial update for [`NotificationSettings`].
///
/// Unknown keys fail deserialization instead of being silently dropped.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NotificationSettingsPatch {
    pub task_reminders: Option<bool>,
    pub deadline_alerts: Option<bool>,
    pub weekly_updates: Option<bool>,
    pub achievements: Option<bool>,
    pub email: Option<bool>,
    pub push: Option<bool>,
    pub vibration: Option<bool>,
    #[validate(nested)]
    pub quiet_hours: Option<QuietHoursPatch>,
    pub deadline_lead_time: Option<DeadlineLeadTime>,
    #[validate(nested)]
    pub sound: Option<SoundSettingsPatch>,
}

/// Validate an "HH:MM" clock time string.
fn validate_clock_time(raw: &str) -> Result<(), ValidationError> {
    time_utils::parse_clock_time(raw)
        .map(|_| ())
        .ok_or_else(|| ValidationError::new("clock_time"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patching_one_quiet_hours_field_keeps_siblings() {
        let mut settings = NotificationSettings::default();
        settings.quiet_hours = QuietHours {
            enabled: true,
            start: "22:00".to_string(),
            end: "07:00".to_string(),
        };

        let patch = NotificationSettingsPatch {
            quiet_hours: Some(QuietHoursPatch {
                start: Some("21:30".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        settings.apply(&patch);

        assert_eq!(settings.quiet_hours.start, "21:30");
        assert_eq!(settings.quiet_hours.end, "07:00");
        assert!(settings.quiet_hours.enabled);
    }

    #[test]
    fn patching_toggle_keeps_other_toggles() {
        let mut settings = NotificationSettings::default();

        let patch = NotificationSettingsPatch {
            weekly_updates: Some(false),
            ..Default::default()
        };
        settings.apply(&patch);

        assert!(!settings.weekly_updates);
        assert!(settings.task_reminders);
        assert!(settings.deadline_alerts);
        assert!(settings.achievements);
    }

    #[test]
    fn patching_sound_kind_keeps_enabled() {
        let mut settings = NotificationSettings::default();

        let patch = NotificationSettingsPatch {
            sound: Some(SoundSettingsPatch {
                kind: Some("chime".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        settings.apply(&patch);

        assert_eq!(settings.sound.kind, "chime");
        assert!(settings.sound.enabled);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = serde_json::from_str::<NotificationSettingsPatch>(r#"{"snooze": true}"#);
        assert!(err.is_err());

        let err =
            serde_json::from_str::<NotificationSettingsPatch>(r#"{"quiet_hours": {"begin": "08:00"}}"#);
        assert!(err.is_err());
    }

    #[test]
    fn patch_validation_rejects_bad_clock_time() {
        let patch = NotificationSettingsPatch {
            quiet_hours: Some(QuietHoursPatch {
                start: Some("25:00".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn quiet_hours_midnight_wrap() {
        let quiet = QuietHours {
            enabled: true,
            start: "22:00".to_string(),
            end: "07:00".to_string(),
        };

        assert!(quiet.suppresses(crate::time_utils::parse_clock_time("23:30").unwrap()));
        assert!(quiet.suppresses(crate::time_utils::parse_clock_time("02:00").unwrap()));
        assert!(!quiet.suppresses(crate::time_utils::parse_clock_time("12:00").unwrap()));
    }

    #[test]
    fn quiet_hours_disabled_never_suppresses() {
        let quiet = QuietHours::default();
        assert!(!quiet.suppresses(0));
        assert!(!quiet.suppresses(1439));
    }

    #[test]
    fn quiet_hours_corrupt_boundary_never_suppresses() {
        let quiet = QuietHours {
            enabled: true,
            start: "garbage".to_string(),
            end: "07:00".to_string(),
        };
        assert!(!quiet.suppresses(120));
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let settings: NotificationSettings = serde_json::from_str("{}").unwrap();
        assert!(settings.push);
        assert!(!settings.email);
        assert_eq!(settings.deadline_lead_time, DeadlineLeadTime::OneDay);
        assert_eq!(settings.quiet_hours, QuietHours::default());
    }
}
