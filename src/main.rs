// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Quadrant-Tracker API Server
//!
//! Backend engine for an Eisenhower-matrix task manager: deadline
//! monitoring, settings-aware notification dispatch, streak/achievement
//! tracking, and API rate limiting.

use quadrant_tracker::{
    config::Config,
    db::FirestoreDb,
    services::{
        rate_limit, DeadlineMonitor, DeliveryChannel, NotificationDispatcher, PushGatewayChannel,
        RateLimiter, SettingsStore, StreakEngine,
    },
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Quadrant-Tracker API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Delivery channel: push gateway if configured, otherwise degrade to
    // feed-only behavior (the channel reports unavailable).
    let channel: Arc<dyn DeliveryChannel> =
        Arc::new(PushGatewayChannel::new(config.push_gateway_url.clone()));
    if config.push_gateway_url.is_some() {
        tracing::info!("Push gateway channel configured");
    } else {
        tracing::warn!("No push gateway configured; notifications will be feed-only");
    }

    let settings = SettingsStore::new(db.clone());
    let notifier = Arc::new(NotificationDispatcher::new(
        db.clone(),
        settings.clone(),
        channel,
    ));
    let streaks = StreakEngine::new(db.clone(), Arc::clone(&notifier));
    let monitor = Arc::new(DeadlineMonitor::new(
        db.clone(),
        settings.clone(),
        Arc::clone(&notifier),
    ));

    // Process-wide rate limiter plus its independent hourly sweep.
    let rate_limiter = Arc::new(RateLimiter::new());
    let _sweeper = rate_limit::spawn_sweeper(Arc::clone(&rate_limiter));
    tracing::info!(limit = config.api_rate_limit, "Rate limiter initialized");

    // Resume monitoring if it was enabled before the last shutdown.
    let monitor_settings = monitor.status().await;
    if monitor_settings.enabled {
        monitor.start().await;
    } else {
        tracing::info!("Deadline monitoring disabled; not starting timer");
    }

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        settings,
        notifier,
        streaks,
        monitor,
        rate_limiter,
    });

    // Build router
    let app = quadrant_tracker::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quadrant_tracker=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
