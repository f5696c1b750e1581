//! TCP listener and accept loop.
//!
//! One independent task per accepted connection; sessions share only the
//! read-only [`ClientDirectory`] and the [`EventSink`]. A failed accept is
//! logged and the loop continues; only bind failures are fatal. Shutdown
//! (ctrl-c or an explicit channel) drains in-flight sessions for a bounded
//! grace period before exiting.

use crate::config::ServerConfig;
use crate::directory::ClientDirectory;
use crate::error::Result;
use crate::protocol::session::ConnectionSession;
use crate::utils::logging::EventSink;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, Mutex};
use tracing::{error, info, instrument, warn};

/// Bind the listening socket. A failure here is a fatal startup error.
pub async fn bind(address: &str) -> Result<TcpListener> {
    let listener = TcpListener::bind(address).await?;
    info!(address = %address, "Listening");
    Ok(listener)
}

/// Bind and serve until ctrl-c.
#[instrument(skip_all, fields(address = %config.server.address))]
pub async fn start_server(
    config: ServerConfig,
    directory: Arc<ClientDirectory>,
    sink: Arc<dyn EventSink>,
) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);

    let shutdown_tx_clone = shutdown_tx.clone();
    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            info!("Received CTRL+C signal, shutting down");
            let _ = shutdown_tx_clone.send(()).await;
        }
    });

    let listener = bind(&config.server.address).await?;
    serve_with_shutdown(listener, config, directory, sink, shutdown_rx).await
}

/// Serve an already-bound listener with an external shutdown channel.
pub async fn serve_with_shutdown(
    listener: TcpListener,
    config: ServerConfig,
    directory: Arc<ClientDirectory>,
    sink: Arc<dyn EventSink>,
    mut shutdown_rx: mpsc::Receiver<()>,
) -> Result<()> {
    let limits = config.limits;
    let grace = config.server.shutdown_grace();

    // Track active connections
    let active_connections = Arc::new(Mutex::new(0u32));

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                info!("Shutting down server. Waiting for connections to close...");

                let timeout = tokio::time::sleep(grace);
                tokio::pin!(timeout);

                loop {
                    tokio::select! {
                        _ = &mut timeout => {
                            warn!("Shutdown timeout reached, forcing exit");
                            break;
                        }
                        _ = tokio::time::sleep(Duration::from_millis(500)) => {
                            let connections = *active_connections.lock().await;
                            info!(connections = %connections, "Waiting for connections to close");
                            if connections == 0 {
                                info!("All connections closed, shutting down");
                                break;
                            }
                        }
                    }
                }

                return Ok(());
            }

            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer)) => {
                        info!(peer = %peer, "New connection established");
                        let directory = Arc::clone(&directory);
                        let sink = Arc::clone(&sink);
                        let active_connections = Arc::clone(&active_connections);

                        {
                            let mut count = active_connections.lock().await;
                            *count += 1;
                        }

                        tokio::spawn(async move {
                            let mut session =
                                ConnectionSession::new(stream, directory, sink, limits);
                            // Session errors are terminal for this connection
                            // only; run() has already logged them.
                            let _ = session.run().await;

                            let mut count = active_connections.lock().await;
                            *count -= 1;
                            info!(peer = %peer, "Connection closed");
                        });
                    }
                    Err(e) => {
                        error!(error = %e, "Error accepting connection");
                    }
                }
            }
        }
    }
}
