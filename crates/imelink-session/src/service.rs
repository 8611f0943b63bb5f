//! Host-facing facade over the session subsystem.
//!
//! A [`SessionService`] owns the arbiter, the dispatcher task, and the
//! optional listener task, and exposes the full host API: server lifecycle,
//! dialing, sending, activity state, and sink registration. No fault inside
//! the subsystem ever propagates as a panic or terminates the host; every
//! failure path ends with the arbiter in `Idle` or with the prior session
//! intact.

use std::net::SocketAddr;
use std::sync::Arc;

use imelink_core::Frame;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::arbiter::SessionArbiter;
use crate::config::SessionConfig;
use crate::dispatch::{DispatchItem, Dispatcher};
use crate::metrics::{MetricsSnapshot, SessionMetrics};
use crate::sink::{notice, AppSink, ImeSink, SinkRegistry};
use crate::state::ActivityFlags;

/// Capacity of the reader → dispatcher channel.
const DISPATCH_QUEUE: usize = 128;

/// Error type for host-initiated session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A dial was requested while a session is active. The existing session
    /// is kept; this is a policy rejection, not a fault.
    #[error("already connected")]
    AlreadyConnected,
    /// The transport failed to bind or dial.
    #[error(transparent)]
    Transport(#[from] crate::transport::TransportError),
}

/// The session/protocol subsystem, one instance per host process.
pub struct SessionService {
    config: SessionConfig,
    flags: Arc<ActivityFlags>,
    metrics: Arc<SessionMetrics>,
    sinks: Arc<SinkRegistry>,
    arbiter: Arc<SessionArbiter>,
    listener: std::sync::Mutex<Option<(SocketAddr, JoinHandle<()>)>>,
    dispatcher: JoinHandle<()>,
}

impl SessionService {
    /// Builds the subsystem and spawns its dispatcher task.
    ///
    /// Must be called within a Tokio runtime.
    pub fn new(config: SessionConfig) -> Self {
        let flags = Arc::new(ActivityFlags::default());
        let metrics = Arc::new(SessionMetrics::default());
        let sinks = Arc::new(SinkRegistry::default());

        let (dispatch_tx, dispatch_rx) = mpsc::channel::<DispatchItem>(DISPATCH_QUEUE);
        let dispatcher = Dispatcher::new(Arc::clone(&sinks), Arc::clone(&flags), Arc::clone(&metrics));
        let dispatcher = tokio::spawn(dispatcher.run(dispatch_rx));

        let arbiter = SessionArbiter::new(Arc::clone(&flags), Arc::clone(&metrics), dispatch_tx);

        Self {
            config,
            flags,
            metrics,
            sinks,
            arbiter,
            listener: std::sync::Mutex::new(None),
            dispatcher,
        }
    }

    // ── Server lifecycle ──────────────────────────────────────────────────────

    /// Binds the listener and starts accepting inbound connections.
    ///
    /// Returns the bound address (useful with port 0 in tests). Calling it
    /// while already listening returns the current address unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Transport`] if the bind fails.
    pub async fn start_server(&self) -> Result<SocketAddr, SessionError> {
        if let Ok(guard) = self.listener.lock() {
            if let Some((addr, _)) = guard.as_ref() {
                debug!(%addr, "listener already running");
                return Ok(*addr);
            }
        }

        let bind_addr = SocketAddr::new(self.config.bind_address, self.config.listen_port);
        let listener = crate::transport::bind_listener(bind_addr).await?;
        let addr = listener
            .local_addr()
            .map_err(|source| crate::transport::TransportError::Bind {
                addr: bind_addr,
                source,
            })?;

        let handle = crate::transport::spawn_accept_loop(listener, Arc::clone(&self.arbiter));
        if let Ok(mut guard) = self.listener.lock() {
            *guard = Some((addr, handle));
        }

        info!(%addr, "listening for inbound sessions");
        self.arbiter.notify(notice::LISTENING).await;
        Ok(addr)
    }

    /// Stops the listener. The current session, if any, stays up.
    pub async fn stop_server(&self) {
        let stopped = self
            .listener
            .lock()
            .ok()
            .and_then(|mut guard| guard.take());
        if let Some((addr, handle)) = stopped {
            handle.abort();
            info!(%addr, "listener stopped");
        }
    }

    // ── Dialing ───────────────────────────────────────────────────────────────

    /// Dials the peer and adopts the connection on success.
    ///
    /// Dial-intent gate: refused before any socket I/O while a session is
    /// active; the existing session is kept and the caller is told
    /// "already connected".
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::AlreadyConnected`] on the gate and
    /// [`SessionError::Transport`] when the dial fails or times out; the
    /// failure is also surfaced to the App sink as a "connect failed" notice.
    pub async fn connect(&self, addr: SocketAddr) -> Result<(), SessionError> {
        if self.arbiter.is_active().await {
            debug!(%addr, "dial refused, session already active");
            return Err(SessionError::AlreadyConnected);
        }

        match crate::transport::dial(addr, self.config.dial_timeout()).await {
            Ok(stream) => {
                self.arbiter.adopt_outbound(stream, addr).await;
                Ok(())
            }
            Err(e) => {
                self.arbiter.notify(notice::CONNECT_FAILED).await;
                Err(e.into())
            }
        }
    }

    /// Closes the current session, if any. Idempotent.
    pub async fn disconnect(&self) {
        if self.arbiter.is_active().await {
            self.arbiter.close("host disconnect").await;
            self.arbiter.notify(notice::DISCONNECTED).await;
        }
    }

    // ── Sending ───────────────────────────────────────────────────────────────

    /// Sends a `TEXT` frame. With no active session this is a silent,
    /// counted no-op; frames are never queued for a future connection.
    pub async fn send_text(&self, text: &str) {
        self.arbiter.send(&Frame::Text(text.to_string())).await;
    }

    /// Sends a `BACKSPACE` frame (no-op without a session).
    pub async fn send_backspace(&self) {
        self.arbiter.send(&Frame::Backspace).await;
    }

    /// Sends a `CLEAR` frame (no-op without a session).
    pub async fn send_clear(&self) {
        self.arbiter.send(&Frame::Clear).await;
    }

    // ── Activity state ────────────────────────────────────────────────────────

    /// The host's single setter for the local activity flag. A transition
    /// while connected sends the matching `STATE` frame to the peer.
    pub async fn set_local_active(&self, active: bool) {
        self.arbiter.set_local_active(active).await;
    }

    pub fn local_active(&self) -> bool {
        self.flags.local_active()
    }

    /// Last activity state reported by the peer. Informational only.
    pub fn remote_active(&self) -> bool {
        self.flags.remote_active()
    }

    // ── Sink registration ─────────────────────────────────────────────────────

    /// Registers, replaces, or clears the IME sink.
    pub fn register_ime_sink(&self, sink: Option<Arc<dyn ImeSink>>) {
        self.sinks.set_ime(sink);
    }

    /// Registers, replaces, or clears the App sink.
    pub fn register_app_sink(&self, sink: Option<Arc<dyn AppSink>>) {
        self.sinks.set_app(sink);
    }

    // ── Observability ─────────────────────────────────────────────────────────

    pub async fn is_connected(&self) -> bool {
        self.arbiter.is_active().await
    }

    pub async fn peer_addr(&self) -> Option<SocketAddr> {
        self.arbiter.peer_addr().await
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    // ── Shutdown ──────────────────────────────────────────────────────────────

    /// Stops the listener, tears down the session, and stops the dispatcher.
    /// Safe to call concurrently with an in-flight adopt: the slot mutex
    /// serializes them and the subsystem always ends `Idle`.
    pub async fn shutdown(&self) {
        self.stop_server().await;
        self.arbiter.close("shutdown").await;
        self.dispatcher.abort();
        info!("session subsystem shut down");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::IpAddr;

    fn loopback_config() -> SessionConfig {
        SessionConfig {
            listen_port: 0,
            bind_address: IpAddr::from([127, 0, 0, 1]),
            dial_timeout_ms: 2_000,
        }
    }

    #[tokio::test]
    async fn test_send_without_session_is_silent() {
        let service = SessionService::new(loopback_config());

        service.send_text("abc").await;
        service.send_backspace().await;
        service.send_clear().await;

        assert_eq!(service.metrics().sends_without_session, 3);
        assert!(!service.is_connected().await);
        service.shutdown().await;
    }

    #[tokio::test]
    async fn test_start_server_twice_returns_same_address() {
        let service = SessionService::new(loopback_config());

        let first = service.start_server().await.expect("bind");
        let second = service.start_server().await.expect("idempotent");
        assert_eq!(first, second);

        service.shutdown().await;
    }

    #[tokio::test]
    async fn test_connect_to_dead_port_reports_transport_error() {
        let service = SessionService::new(loopback_config());

        // Learn a closed port.
        let probe = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let dead = probe.local_addr().unwrap();
        drop(probe);

        let result = service.connect(dead).await;
        assert!(matches!(result, Err(SessionError::Transport(_))));
        assert!(!service.is_connected().await);

        service.shutdown().await;
    }

    #[tokio::test]
    async fn test_disconnect_when_idle_is_a_no_op() {
        let service = SessionService::new(loopback_config());
        service.disconnect().await;
        service.disconnect().await;
        assert!(!service.is_connected().await);
        service.shutdown().await;
    }

    #[tokio::test]
    async fn test_local_flag_round_trips_through_setter() {
        let service = SessionService::new(loopback_config());
        assert!(!service.local_active());
        service.set_local_active(true).await;
        assert!(service.local_active());
        service.set_local_active(false).await;
        assert!(!service.local_active());
        service.shutdown().await;
    }
}
