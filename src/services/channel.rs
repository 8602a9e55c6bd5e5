// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Delivery channel seam between the dispatcher and the platform.
//!
//! The dispatcher only ever asks two questions: "can you deliver right
//! now?" and "deliver this". Unavailability is a normal negative branch,
//! not an error; delivery failures are errors the caller decides how to
//! surface.

use crate::error::AppError;
use async_trait::async_trait;
use std::sync::Mutex;

/// Platform-level notification delivery primitive.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    /// Whether the channel can currently deliver (permission granted,
    /// endpoint configured, ...).
    fn is_available(&self) -> bool;

    /// Deliver a notification. `tag` lets the platform coalesce repeats
    /// of the same logical alert.
    async fn deliver(&self, title: &str, body: &str, tag: &str) -> Result<(), AppError>;

    /// Advisory cancellation: a channel that already rendered the
    /// notification may be unable to retract it. Returns whether anything
    /// was retracted.
    fn cancel(&self, tag: &str) -> bool {
        let _ = tag;
        false
    }
}

/// Push channel that forwards notifications to a configured gateway.
///
/// Reports unavailable when no gateway URL is configured, which makes a
/// bare local deployment degrade to feed-only behavior.
pub struct PushGatewayChannel {
    http: reqwest::Client,
    gateway_url: Option<String>,
}

impl PushGatewayChannel {
    pub fn new(gateway_url: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            gateway_url,
        }
    }
}

#[async_trait]
impl DeliveryChannel for PushGatewayChannel {
    fn is_available(&self) -> bool {
        self.gateway_url.is_some()
    }

    async fn deliver(&self, title: &str, body: &str, tag: &str) -> Result<(), AppError> {
        let url = self
            .gateway_url
            .as_deref()
            .ok_or_else(|| AppError::Channel("Push gateway not configured".to_string()))?;

        let payload = serde_json::json!({
            "title": title,
            "body": body,
            "tag": tag,
        });

        let response = self
            .http
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Channel(format!("Push gateway request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Channel(format!(
                "Push gateway returned {}",
                response.status()
            )));
        }

        tracing::debug!(tag, "Notification delivered via push gateway");
        Ok(())
    }
}

/// In-memory channel that records deliveries.
///
/// Used by tests and by local development runs where no gateway exists but
/// delivery behavior still needs to be observable.
#[derive(Default)]
pub struct MemoryChannel {
    available: bool,
    delivered: Mutex<Vec<(String, String, String)>>,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self {
            available: true,
            delivered: Mutex::new(Vec::new()),
        }
    }

    /// A channel that reports itself unavailable.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            delivered: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of `(title, body, tag)` triples delivered so far.
    pub fn delivered(&self) -> Vec<(String, String, String)> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeliveryChannel for MemoryChannel {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn deliver(&self, title: &str, body: &str, tag: &str) -> Result<(), AppError> {
        self.delivered
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string(), tag.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_channel_without_gateway_is_unavailable() {
        let channel = PushGatewayChannel::new(None);
        assert!(!channel.is_available());
    }

    #[test]
    fn push_channel_with_gateway_is_available() {
        let channel = PushGatewayChannel::new(Some("http://localhost:9999/push".to_string()));
        assert!(channel.is_available());
    }

    #[tokio::test]
    async fn memory_channel_records_deliveries() {
        let channel = MemoryChannel::new();
        channel.deliver("Title", "Body", "tag-1").await.unwrap();

        let delivered = channel.delivered();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].2, "tag-1");
    }

    #[test]
    fn cancel_is_advisory_by_default() {
        let channel = MemoryChannel::new();
        assert!(!channel.cancel("tag-1"));
    }
}
