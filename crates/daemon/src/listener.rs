// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Accepts connections on the daemon's Unix socket, one spawned task per
//! connection, reading a single `Request`/writing a single `Response`
//! per accept per the wire crate's request-response framing. Grounded on
//! the teacher's listener accept loop, trimmed to the single local
//! socket this daemon actually exposes (no TCP, no auth handshake — a
//! single-operator tool talking over a socket only that operator's user
//! account can reach).

use std::path::Path;
use std::sync::Arc;

use taskd_wire::{read_request, write_response, ProtocolError};
use tokio::net::UnixListener;
use tracing::{debug, error, info};

use crate::coordinator::Coordinator;

#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("failed to bind unix socket at {path}: {source}")]
    Bind { path: std::path::PathBuf, source: std::io::Error },
}

/// Bind the socket (after removing a stale one from a prior crash — the
/// lock file is what actually prevents two daemons, this just keeps
/// `bind` from failing on a leftover inode) and accept connections until
/// the Coordinator reports shutdown.
pub async fn serve(socket_path: &Path, coordinator: Arc<Coordinator>) -> Result<(), ListenerError> {
    if socket_path.exists() {
        let _ = std::fs::remove_file(socket_path);
    }
    let listener = UnixListener::bind(socket_path)
        .map_err(|source| ListenerError::Bind { path: socket_path.to_path_buf(), source })?;
    info!(path = %socket_path.display(), "listening");

    loop {
        if coordinator.shutdown_requested() {
            info!("shutdown requested, no longer accepting connections");
            return Ok(());
        }

        match listener.accept().await {
            Ok((stream, _)) => {
                let coordinator = coordinator.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, &coordinator).await {
                        log_connection_error(e);
                    }
                });
            }
            Err(e) => error!("accept error: {e}"),
        }
    }
}

async fn handle_connection(
    mut stream: tokio::net::UnixStream,
    coordinator: &Arc<Coordinator>,
) -> Result<(), ProtocolError> {
    let request = read_request(&mut stream).await?;
    debug!(request = ?request, "received request");

    let response = coordinator.dispatch(request).await;
    write_response(&mut stream, &response).await?;
    Ok(())
}

fn log_connection_error(e: ProtocolError) {
    match e {
        ProtocolError::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::UnexpectedEof => {
            debug!("client disconnected before sending a full request");
        }
        other => error!("connection error: {other}"),
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
