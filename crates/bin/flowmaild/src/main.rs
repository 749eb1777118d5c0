//! # flowmaild — flowmail daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Initialize logging
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct repository and mailer implementations (adapters)
//! - Construct the execution engine and application services
//! - Build the axum router, injecting application services
//! - Bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT), cancelling live test runs
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use flowmail_adapter_http_axum::state::AppState;
use flowmail_adapter_storage_sqlite_sqlx::{
    Config as StorageConfig, SqliteAutomationRepository, SqliteTestRunRepository,
};
use flowmail_app::execution_engine::ExecutionEngine;
use flowmail_app::run_registry::RunRegistry;
use flowmail_app::services::automation_service::AutomationService;
use flowmail_app::services::test_run_service::TestRunService;

use crate::config::Config;

const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    let filter = EnvFilter::try_new(&config.logging.filter)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Database
    let db = StorageConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let pool = db.pool().clone();

    // Repositories
    let automation_repo = Arc::new(SqliteAutomationRepository::new(pool.clone()));
    let test_run_repo = Arc::new(SqliteTestRunRepository::new(pool));

    // Mail + engine
    let mailer = config.smtp().build()?;
    let engine = Arc::new(ExecutionEngine::new(
        mailer,
        Arc::clone(&test_run_repo),
        config.engine(),
    ));
    let registry = Arc::new(RunRegistry::new());

    // Services
    let automation_service = AutomationService::new(Arc::clone(&automation_repo));
    let test_run_service = TestRunService::new(
        automation_repo,
        test_run_repo,
        engine,
        Arc::clone(&registry),
    );

    // HTTP
    let state = AppState::new(automation_service, test_run_service);
    let app = flowmail_adapter_http_axum::router::build(
        state,
        config.server.frontend_dir.as_deref(),
    );

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(address = %bind_addr, "flowmaild listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    drain(&registry).await;
    db.close().await;
    tracing::info!("flowmaild stopped");

    Ok(())
}

/// Cancel every live run and give their tasks a moment to record it.
async fn drain(registry: &RunRegistry) {
    if registry.is_empty() {
        return;
    }
    tracing::info!(live = registry.len(), "cancelling live test runs");
    registry.cancel_all();
    let waited = tokio::time::timeout(DRAIN_TIMEOUT, async {
        while !registry.is_empty() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;
    if waited.is_err() {
        tracing::warn!(live = registry.len(), "test runs still live at shutdown");
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
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
