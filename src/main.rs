use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use comanda::adapters::{postgres, MemoryStore};
use comanda::app::{App, Stores};
use comanda::config::{AppConfig, ConfigError, StorageBackend, ValidationError};
use comanda::domain::foundation::DomainError;

#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("database: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migrations: {0}")]
    Migrations(#[from] sqlx::migrate::MigrateError),

    #[error("bootstrap admin: {0}")]
    Bootstrap(#[from] DomainError),

    #[error("server: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("comanda: {}", e);
            std::process::exit(1);
        }
    };
    init_tracing(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Comanda stopped");
        std::process::exit(1);
    }
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if config.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run(config: AppConfig) -> Result<(), StartupError> {
    config.validate()?;
    let addr = config.server.socket_addr()?;

    let stores = match config.database.backend {
        StorageBackend::Postgres => {
            let pool = postgres::connect(&config.database).await?;
            tracing::info!("Database connection pool created");
            if config.database.run_migrations {
                postgres::run_migrations(&pool).await?;
                tracing::info!("Database migrations applied");
            }
            Stores::postgres(pool)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on restart");
            Stores::memory(MemoryStore::new())
        }
    };

    let app = App::build(&config, stores);
    if app.ensure_bootstrap_admin(&config).await? {
        tracing::info!("Log in with the bootstrap admin and create staff accounts");
    }
    tracing::info!(
        fail_open = config.lifecycle.daily_close_fail_open,
        guest_role = %config.realtime.guest_role,
        "Order lifecycle guard ready"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "Starting server");

    axum::serve(listener, app.router(&config))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let open = app.rooms.connection_count().await;
    tracing::info!(open_sockets = open, "Server stopped accepting connections");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Cannot listen for Ctrl-C");
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
                tracing::error!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl-C, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
