//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const TASKS: &str = "tasks";
    /// Notification settings (keyed by user_id)
    pub const NOTIFICATION_SETTINGS: &str = "notification_settings";
    /// Capped notification feed documents (keyed by user_id)
    pub const NOTIFICATION_FEEDS: &str = "notification_feeds";
    /// Dispatch stats aggregates (keyed by user_id)
    pub const NOTIFICATION_STATS: &str = "notification_stats";
    /// Streak/goal aggregates (keyed by user_id)
    pub const ACHIEVEMENT_STATS: &str = "achievement_stats";
    /// Unlocked achievements (keyed by user_id + dedupe key)
    pub const ACHIEVEMENTS: &str = "achievements";
    /// Singleton deadline-monitor settings document
    pub const SYSTEM: &str = "system";
}
