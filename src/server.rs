//! HTTP server bootstrap.
//!
//! Binds the listener, serves the API router and shuts down gracefully once
//! the cancellation token fires. [`watch_signals`] fires it on Ctrl-C or
//! SIGTERM.

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Bind `addr`, logging the failure with the address.
pub async fn bind(addr: SocketAddr) -> std::io::Result<TcpListener> {
    TcpListener::bind(addr).await.map_err(|e| {
        log::error!("[server] Failed to bind to {}: {}", addr, e);
        e
    })
}

/// Serve `app` on `listener` until `shutdown` is cancelled.
///
/// In-flight requests are allowed to finish before this returns.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    log::info!("[server] Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
        })
        .await?;

    log::info!("[server] Server stopped");
    Ok(())
}

/// Cancel `token` on Ctrl-C or, on unix, SIGTERM.
pub async fn watch_signals(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("[server] Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::error!("[server] Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => log::info!("[server] Ctrl-C received, shutting down"),
        _ = terminate => log::info!("[server] SIGTERM received, shutting down"),
        _ = token.cancelled() => {}
    }
    token.cancel();
}
