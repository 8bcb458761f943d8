//! # Quill Server
//!
//! Entry point for the Quill feed service.

use quill_config::{AppConfig, ConfigLoader, ObservabilityConfig};
use quill_core::{QuillError, QuillResult};
use quill_repository::{DatabasePool, MySqlIdentityProvider, MySqlPostRepository};
use quill_server::{
    app::{cache_backend, App},
    startup, telemetry,
};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let config = match ConfigLoader::from_default_location() {
        Ok(loader) => loader.get().await,
        Err(e) => {
            telemetry::init_logging(&ObservabilityConfig::default());
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    telemetry::init_logging(&config.observability);
    startup::print_banner();
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", config.app.environment);

    if let Err(e) = run(config).await {
        error!("Application error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> QuillResult<()> {
    let metrics = telemetry::install_metrics(&config.observability)?;

    let pool = Arc::new(DatabasePool::new(&config.database).await?);
    if config.database.run_migrations {
        pool.run_migrations().await?;
    }

    let store = Arc::new(MySqlPostRepository::new(Arc::clone(&pool)));
    let identities = Arc::new(MySqlIdentityProvider::new(Arc::clone(&pool)));
    let backend = cache_backend(&config)?;

    if let Err(e) = backend.ping().await {
        warn!(error = %e, "Cache unreachable at startup; reads will use the store");
    }

    let app = App::wire(&config, store, identities, backend)?;
    let router = app.router(&config, metrics);

    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| QuillError::Internal(format!("Failed to bind {}: {}", addr, e)))?;

    startup::print_startup_info(&config);

    let served = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| QuillError::Internal(format!("REST server error: {}", e)));

    app.shutdown(config.cache.drain_timeout()).await;
    pool.close().await;

    info!("Server shutdown complete");
    served
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("Received terminate signal, initiating graceful shutdown...");
        }
    }
}
