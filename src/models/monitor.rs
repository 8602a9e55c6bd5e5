// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Deadline monitor settings document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted deadline-monitor state.
///
/// `monitoring_active` mirrors whether a live timer handle exists, not
/// merely whether the user enabled monitoring; a crash leaves the two out
/// of sync until the next `start()`/`stop()` resynchronizes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadlineMonitorSettings {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_check_interval")]
    pub check_interval_minutes: u32,
    #[serde(default)]
    pub last_check_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub monitoring_active: bool,
}

fn default_enabled() -> bool {
    true
}

fn default_check_interval() -> u32 {
    60
}

impl Default for DeadlineMonitorSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            check_interval_minutes: default_check_interval(),
            last_check_at: None,
            monitoring_active: false,
        }
    }
}
