// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fixed-window API rate limiter keyed by credential.
//!
//! Approximate by design: the counter resets entirely at window
//! boundaries, so bursts straddling an edge can briefly exceed the limit.
//! That trade-off buys O(1) memory per credential and no sorted-structure
//! maintenance. A coarse periodic sweep, independent of request traffic,
//! drops expired windows to bound memory.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;

/// Fixed window length.
const WINDOW: Duration = Duration::hours(1);

/// How often the background sweep runs.
const SWEEP_INTERVAL_SECS: u64 = 60 * 60;

/// One credential's counter for the current window.
#[derive(Debug, Clone)]
struct RateLimitWindow {
    count: u32,
    window_reset_at: DateTime<Utc>,
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub limit: u32,
    pub remaining: u32,
    pub reset_time: DateTime<Utc>,
    pub blocked: bool,
}

/// Process-wide rate limiter.
///
/// The window map is only mutated through [`check_at`](Self::check_at),
/// [`reset`](Self::reset), and the sweep.
#[derive(Default)]
pub struct RateLimiter {
    windows: DashMap<String, RateLimitWindow>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            windows: DashMap::new(),
        }
    }

    /// Check a request against the credential's current window.
    pub fn check(&self, credential: &str, limit: u32) -> RateLimitDecision {
        self.check_at(credential, limit, Utc::now())
    }

    /// [`check`](Self::check) with an explicit clock, for deterministic
    /// time-travel tests.
    pub fn check_at(&self, credential: &str, limit: u32, now: DateTime<Utc>) -> RateLimitDecision {
        let mut window = self
            .windows
            .entry(credential.to_string())
            .or_insert_with(|| RateLimitWindow {
                count: 0,
                window_reset_at: now + WINDOW,
            });

        if now >= window.window_reset_at {
            // Expired: the window is replaced, not incremented.
            window.count = 1;
            window.window_reset_at = now + WINDOW;
        } else {
            window.count += 1;
        }

        let decision = RateLimitDecision {
            limit,
            remaining: limit.saturating_sub(window.count),
            reset_time: window.window_reset_at,
            blocked: window.count > limit,
        };

        if decision.blocked {
            tracing::warn!(
                credential,
                count = window.count,
                limit,
                "Rate limit exceeded"
            );
        }

        decision
    }

    /// Administrative reset: clear a single credential's window outright.
    pub fn reset(&self, credential: &str) -> bool {
        let removed = self.windows.remove(credential).is_some();
        if removed {
            tracing::info!(credential, "Rate limit window reset");
        }
        removed
    }

    /// Drop windows whose reset time has passed. Returns how many were
    /// removed.
    pub fn sweep_expired_at(&self, now: DateTime<Utc>) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, window| now < window.window_reset_at);
        before - self.windows.len()
    }

    /// Number of live windows (for diagnostics).
    pub fn tracked_credentials(&self) -> usize {
        self.windows.len()
    }
}

/// Spawn the hourly sweep task. The returned handle can be aborted without
/// affecting any other timer.
pub fn spawn_sweeper(limiter: Arc<RateLimiter>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker =
            tokio::time::interval(std::time::Duration::from_secs(SWEEP_INTERVAL_SECS));
        // The first tick fires immediately; skip it so the sweep runs on
        // the trailing edge.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = limiter.sweep_expired_at(Utc::now());
            if removed > 0 {
                tracing::debug!(removed, "Swept expired rate-limit windows");
            }
        }
    })
}
