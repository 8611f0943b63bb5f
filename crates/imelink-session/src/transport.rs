//! TCP transport: the listening socket and the outbound dial path.
//!
//! Transport has no protocol knowledge. It produces raw connections with
//! the link's socket options applied (keep-alive on, and `TCP_NODELAY` so
//! single-keystroke frames are not coalesced) and hands them to the
//! [`SessionArbiter`](crate::arbiter::SessionArbiter), which decides whether
//! to adopt them.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{error, info, warn};

use crate::arbiter::SessionArbiter;

/// Error type for transport operations.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The listener could not be bound.
    #[error("bind failed on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    /// The outbound connection attempt failed.
    #[error("connect to {addr} failed: {source}")]
    Dial {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    /// The outbound connection attempt did not complete within the timeout.
    #[error("connect to {addr} timed out after {timeout:?}")]
    DialTimeout { addr: SocketAddr, timeout: Duration },
}

/// Creates a socket of the right address family with the link options set.
fn link_socket(addr: SocketAddr) -> std::io::Result<TcpSocket> {
    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_keepalive(true)?;
    Ok(socket)
}

/// Binds the listening socket.
///
/// Keep-alive is set on the listening socket so accepted connections
/// inherit it; `SO_REUSEADDR` avoids rebind failures right after a restart.
///
/// # Errors
///
/// Returns [`TransportError::Bind`] if the socket cannot be created or bound.
pub async fn bind_listener(addr: SocketAddr) -> Result<TcpListener, TransportError> {
    let bind = |addr: SocketAddr| -> std::io::Result<TcpListener> {
        let socket = link_socket(addr)?;
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        socket.listen(16)
    };
    bind(addr).map_err(|source| TransportError::Bind { addr, source })
}

/// Attempts a single outbound connection, bounded by `timeout`.
///
/// No retry: reconnection is always caller-initiated.
///
/// # Errors
///
/// Returns [`TransportError::Dial`] on connection failure and
/// [`TransportError::DialTimeout`] when the attempt exceeds the bound.
pub async fn dial(addr: SocketAddr, timeout: Duration) -> Result<TcpStream, TransportError> {
    let socket = link_socket(addr).map_err(|source| TransportError::Dial { addr, source })?;
    match time::timeout(timeout, socket.connect(addr)).await {
        Ok(Ok(stream)) => {
            if let Err(e) = stream.set_nodelay(true) {
                warn!("could not set TCP_NODELAY on outbound connection: {e}");
            }
            Ok(stream)
        }
        Ok(Err(source)) => Err(TransportError::Dial { addr, source }),
        Err(_) => Err(TransportError::DialTimeout { addr, timeout }),
    }
}

/// Spawns the accept loop.
///
/// Each accepted connection is handed to the arbiter's inbound gate. An
/// accept error is logged and ends the loop: fatal for the listener only,
/// never for the process.
pub fn spawn_accept_loop(listener: TcpListener, arbiter: Arc<SessionArbiter>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, peer)) => {
                    if let Err(e) = stream.set_nodelay(true) {
                        warn!(%peer, "could not set TCP_NODELAY on inbound connection: {e}");
                    }
                    arbiter.adopt_inbound(stream, peer).await;
                }
                Err(e) => {
                    error!("accept failed, stopping listener: {e}");
                    break;
                }
            }
        }
        info!("accept loop ended");
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
