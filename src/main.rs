// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;
use std::sync::Arc;

use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use yoga_mat_server::{
    api::router,
    auth::{http_client, Authenticator},
    broadcast::Broadcaster,
    config::{Config, LogFormat, DEFAULT_LOG_FILTER},
    state::AppState,
    storage::{InMemoryUserStore, UserDatabase, UserRepository, UserStore},
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(config.log_format);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.bind_addr()?;

    let store: Arc<dyn UserStore> = match &config.user_db_path {
        Some(path) => {
            info!(path = %path.display(), "Opening user database");
            Arc::new(UserDatabase::open(path)?)
        }
        None => {
            info!("USER_DB_PATH not set, keeping users in memory");
            Arc::new(InMemoryUserStore::new())
        }
    };

    let http = http_client(config.http_timeout)?;
    let authenticator =
        Authenticator::from_config(&config.oidc, http, UserRepository::new(store));

    info!(
        issuer = %config.oidc.issuer,
        jwks_url = %config.oidc.jwks_url,
        token_endpoint = %config.oidc.token_endpoint,
        "Configuration loaded"
    );

    let app = router(AppState::new(authenticator, Broadcaster::default()));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Yoga mat server listening on http://{addr} (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, shutting down"),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, shutting down");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
