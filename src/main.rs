//! ClaimPool server: allocation engine for a finite pool of units.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

use claimpool_api::AppState;
use claimpool_core::config::AppConfig;
use claimpool_core::error::AppError;
use claimpool_core::traits::SystemClock;
use claimpool_database::StoreSet;
use claimpool_service::ReservationEngine;
use claimpool_worker::{CronScheduler, SweepJobHandler};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from `config/` and the environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let dir = std::env::var("CLAIMPOOL_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let env = std::env::var("CLAIMPOOL_ENV").unwrap_or_else(|_| "development".to_string());

    let config = AppConfig::load_from(&dir, &env)?;
    config.validate()?;
    Ok(config)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting ClaimPool v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Storage backend ──────────────────────────────────
    tracing::info!("Opening {:?} store...", config.store.backend);
    let stores = StoreSet::open(&config).await?;

    // ── Step 2: Reservation engine ───────────────────────────────
    let engine = ReservationEngine::from_stores(
        &stores,
        Arc::new(SystemClock),
        config.reservation.clone(),
    );
    tracing::info!(
        timeout_seconds = config.reservation.timeout_seconds,
        grace_period_seconds = config.reservation.grace_period_seconds,
        "Reservation engine initialized"
    );

    // ── Step 3: Background sweep ─────────────────────────────────
    let scheduler = if config.worker.enabled {
        tracing::info!("Starting background sweep...");
        let scheduler = CronScheduler::new().await?;
        scheduler
            .register(
                &config.worker.sweep_schedule,
                Arc::new(SweepJobHandler::new(engine.clone())),
            )
            .await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::info!("Background sweep disabled");
        None
    };

    // ── Step 4: Build and start HTTP server ──────────────────────
    let addr = config.server.bind_address();
    let shutdown_grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let state = AppState::new(Arc::new(config), stores.clone(), engine);
    let app = claimpool_api::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("ClaimPool server listening on {}", addr);

    // ── Step 5: Graceful shutdown ────────────────────────────────
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    if let Some(scheduler) = scheduler {
        match tokio::time::timeout(shutdown_grace, scheduler.shutdown()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!("Scheduler shutdown failed: {}", e),
            Err(_) => tracing::warn!("Scheduler shutdown timed out"),
        }
    }
    stores.close().await;

    tracing::info!("ClaimPool server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
