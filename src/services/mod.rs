// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Service layer: the notification & engagement engine.

pub mod channel;
pub mod monitor;
pub mod notifier;
pub mod rate_limit;
pub mod settings;
pub mod streaks;

pub use channel::{DeliveryChannel, MemoryChannel, PushGatewayChannel};
pub use monitor::DeadlineMonitor;
pub use notifier::NotificationDispatcher;
pub use rate_limit::{RateLimitDecision, RateLimiter};
pub use settings::SettingsStore;
pub use streaks::StreakEngine;
