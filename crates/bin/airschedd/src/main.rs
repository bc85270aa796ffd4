//! # airschedd — airsched daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct the repository, job store, and device adapter
//! - Rehydrate pending jobs and re-arm every stored profile
//! - Build the axum router, injecting the profile service
//! - Bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::time::Duration;

use airsched_adapter_device_skyfi::client as skyfi;
use airsched_adapter_http_axum::state::AppState;
use airsched_adapter_jobs_tokio::{RetryPolicy, TokioJobScheduler};
use airsched_adapter_storage_sqlite_sqlx::{
    Config as StorageConfig, SqliteJobStore, SqliteProfileRepository,
};
use airsched_adapter_virtual::SimulatedAircon;
use airsched_app::executor::ScheduleExecutor;
use airsched_app::ports::{AlwaysOnline, DeviceControl, SystemClock};
use airsched_app::services::profile_service::ProfileService;
use airsched_app::sweep::FallbackSweep;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // The device port is not object-safe, so the backend is picked here and
    // the rest of the wiring is generic over it.
    match config.device.base_url.clone() {
        Some(base_url) => {
            let device = skyfi::Config {
                base_url: base_url.clone(),
                timeout: Duration::from_secs(config.device.timeout_secs),
            }
            .build()?;
            tracing::info!(%base_url, "using SkyFi controller");
            run(config, device).await
        }
        None => {
            tracing::info!("no device URL configured, using simulated aircon");
            run(config, SimulatedAircon::default()).await
        }
    }
}

async fn run<D>(config: Config, device: D) -> anyhow::Result<()>
where
    D: DeviceControl + Clone + 'static,
{
    // Database
    let db = StorageConfig {
        database_url: config.database.url.clone(),
    }
    .build()
    .await?;
    let pool = db.pool().clone();

    let repo = SqliteProfileRepository::new(pool.clone());
    repo.refresh().await?;
    let job_store = SqliteJobStore::new(pool);

    // Durable job path: executor runs fired jobs, scheduler owns the timers.
    let executor = ScheduleExecutor::new(repo.clone(), device.clone());
    let jobs = TokioJobScheduler::new(
        job_store,
        AlwaysOnline,
        executor,
        SystemClock,
        RetryPolicy::default(),
    );
    let rehydrated = jobs.rehydrate().await?;
    tracing::info!(jobs = rehydrated, "rehydrated pending jobs");

    // Services; rearm recomputes every occurrence from current profile state.
    let service = ProfileService::new(repo.clone(), jobs, SystemClock);
    service.rearm_all().await?;

    // Fallback sweep
    if config.scheduler.sweep_enabled {
        let sweep = FallbackSweep::new(
            repo,
            device,
            SystemClock,
            Duration::from_secs(config.scheduler.sweep_interval_secs),
        );
        tokio::spawn(sweep.run());
    }

    // HTTP
    let app = airsched_adapter_http_axum::router::build(AppState::new(service));

    let bind_addr = config.bind_addr();
    tracing::info!(%bind_addr, "airschedd listening");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install ctrl-c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => tracing::error!(error = %err, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
