// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Task model shared with the mobile client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Eisenhower-matrix quadrant a task is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Quadrant {
    UrgentImportant,
    NotUrgentImportant,
    UrgentNotImportant,
    NotUrgentNotImportant,
}

impl Quadrant {
    /// Stable wire/storage identifier, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Quadrant::UrgentImportant => "urgent-important",
            Quadrant::NotUrgentImportant => "not-urgent-important",
            Quadrant::UrgentNotImportant => "urgent-not-important",
            Quadrant::NotUrgentNotImportant => "not-urgent-not-important",
        }
    }

    /// Human-readable label used in achievement copy.
    pub fn label(&self) -> &'static str {
        match self {
            Quadrant::UrgentImportant => "Do First",
            Quadrant::NotUrgentImportant => "Schedule",
            Quadrant::UrgentNotImportant => "Delegate",
            Quadrant::NotUrgentNotImportant => "Eliminate",
        }
    }
}

/// Stored task record in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Task ID (also used as document ID, composed with the owner)
    pub id: String,
    /// Owning user ID
    pub user_id: String,
    /// Task title
    pub title: String,
    /// Whether the task has been completed
    pub completed: bool,
    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,
    /// Eisenhower quadrant
    pub quadrant: Quadrant,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// Minimal user record; existence marks a task collection owner for the
/// deadline monitor's per-user sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}
