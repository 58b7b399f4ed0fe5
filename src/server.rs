//! HTTP server initialization and runtime setup.
//!
//! Opens the mapping store, serves the redirect and management listeners
//! concurrently, and closes the store after both have stopped.

use crate::config::Config;
use crate::infrastructure::persistence::open_store;
use crate::routes::{management_router, redirect_router};
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::watch;

/// Runs both listeners with the given configuration.
///
/// Initializes:
/// - Mapping store (redb or Redis)
/// - Redirect listener on `LISTEN`
/// - Management listener on `MGMT_LISTEN`
///
/// Both stop on Ctrl-C or SIGTERM. The store is closed once afterwards.
///
/// # Errors
///
/// Returns an error if:
/// - The store cannot be opened
/// - A listener cannot bind
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let store = open_store(&config)
        .await
        .context("Failed to open mapping store")?;

    match store.stats().await {
        Ok(stats) => tracing::info!(
            "Store ready ({}): {} mappings, {} bytes",
            store.backend(),
            stats.total_mappings,
            stats.disk_usage
        ),
        Err(e) => tracing::warn!("Failed to read store stats: {}", e),
    }

    let state = AppState::new(store.clone(), &config).context("Invalid key builder")?;

    let result = async {
        let redirect_listener = bind(&config.listen_addr).await?;
        let mgmt_listener = bind(&config.mgmt_listen_addr).await?;
        serve_until(state, redirect_listener, mgmt_listener, shutdown_signal()).await
    }
    .await;

    if let Err(e) = store.close().await {
        tracing::error!("Failed to close store: {}", e);
    }

    result
}

/// Serves both listeners until `shutdown` completes.
///
/// # Errors
///
/// Returns an error if either server fails while running.
pub async fn serve_until(
    state: AppState,
    redirect_listener: TcpListener,
    mgmt_listener: TcpListener,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    tracing::info!(
        "Listening for redirect requests on http://{}",
        redirect_listener.local_addr()?
    );
    tracing::info!(
        "Listening for management commands on http://{}",
        mgmt_listener.local_addr()?
    );

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown.await;
        tracing::info!("Shutdown signal received");
        let _ = stop_tx.send(true);
    });

    tokio::try_join!(
        serve(redirect_listener, redirect_router(state.clone()), stop_rx.clone()),
        serve(mgmt_listener, management_router(state), stop_rx),
    )?;

    tracing::info!("Servers stopped");
    Ok(())
}

async fn bind(addr: &str) -> Result<TcpListener> {
    let addr: SocketAddr = addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", addr))?;

    TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))
}

async fn serve(listener: TcpListener, app: Router, mut stop: watch::Receiver<bool>) -> Result<()> {
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        let _ = stop.wait_for(|stopped| *stopped).await;
    })
    .await?;

    Ok(())
}

/// Completes on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
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
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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
