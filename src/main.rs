// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;
use std::time::Duration;

use axum_server::tls_rustls::RustlsConfig;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use tipjar_server::{
    api::router,
    auth::NonceReaper,
    config::{Config, LOG_FORMAT_ENV},
    state::AppState,
    storage::Database,
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Time given to open connections once shutdown starts.
const GRACEFUL_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    let json = std::env::var(LOG_FORMAT_ENV).is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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
    tracing::info!("Shutdown signal received");
}

async fn run() -> Result<(), BoxError> {
    let config = Config::from_env()?;
    if config.uses_default_secret() {
        tracing::warn!("JWT_SECRET is not set; using the insecure default secret");
    }

    let db = Database::open(&config.database_path())?;
    tracing::info!(path = %config.database_path().display(), "Database opened");

    let addr = config.bind_addr();
    let tls = config.tls.clone();
    let sweep_interval = config.nonce_sweep_interval;

    let state = AppState::new(config, db)?;
    state.media.ensure_upload_dir().await?;
    match &state.tipjars {
        Some(client) => tracing::info!(
            chain_id = client.chain_id(),
            factory = %client.factory_address(),
            "Tip jar reads enabled"
        ),
        None => tracing::warn!("RPC_URL or TIPJAR_FACTORY_ADDRESS not set; tip jar endpoints disabled"),
    }

    let shutdown = CancellationToken::new();
    let reaper = NonceReaper::new(state.auth.nonce_store()).with_interval(sweep_interval);
    let reaper_task = tokio::spawn(reaper.run(shutdown.clone()));

    let app = router(state);

    match tls {
        Some(paths) => {
            // Install the ring crypto provider for rustls (must be done before any TLS operations)
            if rustls::crypto::ring::default_provider().install_default().is_err() {
                tracing::debug!("rustls crypto provider already installed");
            }
            let tls_config = RustlsConfig::from_pem_file(&paths.cert, &paths.key).await?;

            let handle = axum_server::Handle::new();
            let shutdown_handle = handle.clone();
            tokio::spawn(async move {
                shutdown_signal().await;
                shutdown_handle.graceful_shutdown(Some(GRACEFUL_SHUTDOWN_TIMEOUT));
            });

            tracing::info!(%addr, "TipJar server listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            let listener = tokio::net::TcpListener::bind(addr).await?;
            tracing::info!(%addr, "TipJar server listening on http (docs at /docs)");
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
    }

    shutdown.cancel();
    if let Err(e) = reaper_task.await {
        tracing::warn!(error = %e, "Nonce reaper task failed");
    }
    tracing::info!("Server stopped");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}
