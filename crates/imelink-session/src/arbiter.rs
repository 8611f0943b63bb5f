//! Session arbiter: the single-session slot and its state machine.
//!
//! States: `Idle` (slot empty) → transient `Establishing` (inside an adopt,
//! under the slot lock) → `Active` (one session, one reader task) → back to
//! `Idle` on teardown. All slot mutations (adopt, close, send) serialize
//! on one `tokio::sync::Mutex`, so "read the current session", "replace it",
//! and "tear down the old one" are observed atomically by every caller,
//! including a shutdown racing an in-flight adopt. The lock is never held
//! across socket I/O other than the write call itself.
//!
//! Mutual-kick avoidance: whichever side already holds a session wins. An
//! inbound connection arriving while a session is active is closed without
//! being adopted, and the dial path refuses to start while a session is
//! active (see [`crate::service::SessionService::connect`]). A side with no
//! session either accepts inbound or dials out, never both destructively.

use std::net::SocketAddr;
use std::sync::Arc;

use imelink_core::{decode_frame, encode_frame, Frame, ImeState};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::dispatch::DispatchItem;
use crate::metrics::SessionMetrics;
use crate::sink::notice;
use crate::state::ActivityFlags;

/// How the current session was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Inbound,
    Outbound,
}

/// The one live connection.
struct ActiveSession {
    /// Generation tag: lets a finished reader tear down exactly the session
    /// it belonged to, never a replacement.
    id: Uuid,
    peer: SocketAddr,
    direction: Direction,
    writer: OwnedWriteHalf,
    reader: JoinHandle<()>,
}

/// Owns the single-session slot and all transitions on it.
pub struct SessionArbiter {
    slot: Mutex<Option<ActiveSession>>,
    flags: Arc<ActivityFlags>,
    metrics: Arc<SessionMetrics>,
    dispatch_tx: mpsc::Sender<DispatchItem>,
}

impl SessionArbiter {
    pub fn new(
        flags: Arc<ActivityFlags>,
        metrics: Arc<SessionMetrics>,
        dispatch_tx: mpsc::Sender<DispatchItem>,
    ) -> Arc<Self> {
        Arc::new(Self {
            slot: Mutex::new(None),
            flags,
            metrics,
            dispatch_tx,
        })
    }

    /// Inbound gate: adopts the connection unless a session is already
    /// active, in which case the new connection is closed immediately and
    /// the existing session is kept.
    pub async fn adopt_inbound(self: &Arc<Self>, stream: TcpStream, peer: SocketAddr) {
        self.adopt(stream, peer, Direction::Inbound).await;
    }

    /// Adopts a freshly dialed connection. The dial-intent gate runs before
    /// any socket I/O; this re-checks under the lock in case an inbound
    /// adoption won the race during the dial, keeping the existing session.
    pub async fn adopt_outbound(self: &Arc<Self>, stream: TcpStream, peer: SocketAddr) {
        self.adopt(stream, peer, Direction::Outbound).await;
    }

    async fn adopt(self: &Arc<Self>, stream: TcpStream, peer: SocketAddr, direction: Direction) {
        let mut slot = self.slot.lock().await;

        if let Some(current) = slot.as_ref() {
            match direction {
                Direction::Inbound => {
                    self.metrics.record_rejected_inbound();
                    info!(%peer, kept = %current.peer, "rejected inbound connection, session already active");
                }
                Direction::Outbound => {
                    warn!(%peer, kept = %current.peer, "discarding dialed connection, session adopted meanwhile");
                }
            }
            // Dropping the stream closes the socket.
            return;
        }

        let id = Uuid::new_v4();
        let (read_half, writer) = stream.into_split();
        let reader = tokio::spawn(read_loop(Arc::clone(self), id, read_half));
        let mut session = ActiveSession {
            id,
            peer,
            direction,
            writer,
            reader,
        };

        // The peer learns our activity state before any other frame.
        let state = Frame::State(ImeState::from(self.flags.local_active()));
        if let Err(e) = write_line(&mut session.writer, &state).await {
            warn!(%peer, "initial state write failed: {e}");
            self.metrics.record_write_fault();
            teardown(session).await;
            drop(slot);
            self.notify(notice::SEND_FAILED).await;
            return;
        }

        info!(%peer, ?direction, session = %id, "session established");
        *slot = Some(session);
        drop(slot);
        self.notify(notice::CONNECTED).await;
    }

    /// Encodes and writes one frame on the current session.
    ///
    /// With no session the frame is dropped: logged and counted, never an
    /// error to the caller, and never queued for a future connection. A
    /// write fault is treated as a peer disconnect: notify, then tear down.
    pub async fn send(&self, frame: &Frame) {
        let mut slot = self.slot.lock().await;

        let result = match slot.as_mut() {
            None => {
                self.metrics.record_send_without_session();
                debug!(kind = frame.kind(), "no active session, frame dropped");
                return;
            }
            Some(session) => write_line(&mut session.writer, frame).await,
        };

        if let Err(e) = result {
            self.metrics.record_write_fault();
            if let Some(session) = slot.take() {
                warn!(peer = %session.peer, "write fault, tearing down session: {e}");
                teardown(session).await;
            }
            drop(slot);
            self.notify(notice::SEND_FAILED).await;
        }
    }

    /// Tears down the current session and returns to `Idle`. Idempotent:
    /// closing with no session active is a no-op.
    pub async fn close(&self, reason: &str) {
        let mut slot = self.slot.lock().await;
        if let Some(session) = slot.take() {
            info!(peer = %session.peer, %reason, "closing session");
            teardown(session).await;
        }
    }

    /// The host's single setter for the local activity flag. On a value
    /// transition the matching `STATE` frame is sent to the peer (dropped
    /// silently if no session is active).
    pub async fn set_local_active(&self, active: bool) {
        let previous = self.flags.set_local(active);
        if previous != active {
            self.send(&Frame::State(ImeState::from(active))).await;
        }
    }

    /// Whether a session is currently active.
    pub async fn is_active(&self) -> bool {
        self.slot.lock().await.is_some()
    }

    /// Peer address of the current session, if any.
    pub async fn peer_addr(&self) -> Option<SocketAddr> {
        self.slot.lock().await.as_ref().map(|s| s.peer)
    }

    /// Direction of the current session, if any.
    pub async fn direction(&self) -> Option<Direction> {
        self.slot.lock().await.as_ref().map(|s| s.direction)
    }

    /// Reader-initiated teardown. The generation check makes a late reader
    /// harmless: it can only tear down the session it was spawned for.
    async fn close_if_current(&self, session_id: Uuid) -> bool {
        let mut slot = self.slot.lock().await;
        let matches = slot.as_ref().is_some_and(|s| s.id == session_id);
        if matches {
            if let Some(session) = slot.take() {
                debug!(peer = %session.peer, "reader ended, tearing down session");
                teardown(session).await;
            }
        }
        matches
    }

    /// Queues a connection-state notice for the dispatcher.
    pub(crate) async fn notify(&self, status: &str) {
        if self
            .dispatch_tx
            .send(DispatchItem::Notice(status.to_string()))
            .await
            .is_err()
        {
            debug!(%status, "dispatcher gone, notice dropped");
        }
    }
}

/// Writes one encoded frame line. The caller holds the slot lock for the
/// duration, which is the one place the lock spans socket I/O.
async fn write_line(writer: &mut OwnedWriteHalf, frame: &Frame) -> std::io::Result<()> {
    let mut line = encode_frame(frame);
    line.push('\n');
    writer.write_all(line.as_bytes()).await
}

/// Releases a session's resources: cancels the reader and closes the
/// writer best-effort (close failures are swallowed).
async fn teardown(mut session: ActiveSession) {
    session.reader.abort();
    let _ = session.writer.shutdown().await;
}

/// Per-session reader: consumes newline-delimited frames until end of
/// stream or a read error, then triggers teardown and the disconnect
/// notice. No idle timeout: a silent peer is not a disconnect.
async fn read_loop(arbiter: Arc<SessionArbiter>, session_id: Uuid, read_half: OwnedReadHalf) {
    let mut lines = BufReader::new(read_half).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let frame = decode_frame(&line);
                if arbiter
                    .dispatch_tx
                    .send(DispatchItem::Frame(frame))
                    .await
                    .is_err()
                {
                    debug!(session = %session_id, "dispatcher gone, stopping reader");
                    break;
                }
            }
            Ok(None) => {
                debug!(session = %session_id, "peer closed the stream");
                break;
            }
            Err(e) => {
                warn!(session = %session_id, "read error: {e}");
                break;
            }
        }
    }

    if arbiter.close_if_current(session_id).await {
        arbiter.notify(notice::DISCONNECTED).await;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
