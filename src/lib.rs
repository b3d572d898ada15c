pub mod aggregation; // Doctor/patient roster views
pub mod api; // HTTP API
pub mod assignment; // Assignment engine
pub mod config;
pub mod core_state;
pub mod db;
pub mod error;
pub mod identifier;
pub mod models;
pub mod registry; // Doctor & patient records
pub mod validation;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("Failed to open database: {0}")]
    Core(#[from] core_state::CoreError),
    #[error("{0}")]
    Server(String),
}

/// Process entry point: logging, database, HTTP server until Ctrl-C.
pub fn run() -> Result<(), RunError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let db_path = config::database_path();
    let core = Arc::new(core_state::CoreState::open(&db_path, config::busy_timeout())?);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let mut server = api::start_api_server(core, config::bind_addr())
            .await
            .map_err(RunError::Server)?;

        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Cannot listen for Ctrl-C, shutting down: {e}");
        }
        server.shutdown();
        server.wait().await;
        Ok(())
    })
}
