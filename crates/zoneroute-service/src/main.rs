//! Zoneroute HTTP service entry point. See the library docs for endpoints and
//! configuration.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::signal;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

use zoneroute_service::{build_router_with_metrics, ServiceConfig};
use zoneroute_service_shared::{init_logging, init_metrics, AppState, LoggingConfig, MetricsConfig};

/// How long in-flight requests may run after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logging_config = LoggingConfig::from_env().with_service("zoneroute");
    init_logging(&logging_config);

    let metrics_config = MetricsConfig::from_env();
    if let Err(e) = init_metrics(&metrics_config) {
        warn!(error = %e, "failed to initialize metrics, continuing without metrics");
    }

    let config = ServiceConfig::from_env();
    info!(
        db_path = %config.db_path.display(),
        port = config.port,
        seed_path = ?config.seed_path,
        metrics_path = %metrics_config.path,
        "starting zoneroute service"
    );

    let state = AppState::open(&config.db_path).map_err(|e| {
        error!(error = %e, path = %config.db_path.display(), "failed to open zone store");
        e
    })?;

    if let Some(seed_path) = &config.seed_path {
        state.seed_if_empty(seed_path).map_err(|e| {
            error!(error = %e, path = %seed_path.display(), "failed to seed zone store");
            e
        })?;
    }

    let app = build_router_with_metrics(state, &metrics_config.path);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "listening");

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.await;
            })
            .await
    });

    tokio::select! {
        result = &mut server => {
            // Server stopped on its own, before any signal.
            result??;
            return Ok(());
        }
        _ = shutdown_signal() => {}
    }

    info!(grace_secs = SHUTDOWN_GRACE.as_secs(), "shutting down, draining in-flight requests");
    let _ = stop_tx.send(());
    match tokio::time::timeout(SHUTDOWN_GRACE, server).await {
        Ok(result) => {
            result??;
            info!("server stopped");
        }
        Err(_) => warn!("in-flight requests did not finish in time, forcing shutdown"),
    }

    Ok(())
}

/// Resolve on SIGINT (Ctrl+C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
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
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C"),
        _ = terminate => info!("received SIGTERM"),
    }
}
