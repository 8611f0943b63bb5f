//! Router/dispatcher: delivers decoded frames to the correct sink.
//!
//! The dispatcher runs as its own task fed by an `mpsc` channel. The
//! session reader pushes decoded frames into the channel and returns to the
//! socket immediately, so a slow sink implementation can never stall the
//! read loop. This mirrors hosts whose sink callbacks must run on a single
//! UI-affine thread.
//!
//! Routing rule for input events (`Text`/`Backspace`/`Clear`):
//! route to the IME sink iff the local activity flag is set *and* an IME
//! sink is registered; otherwise to the App sink (a no-op when absent).
//! `State` frames update the remote activity flag only and are never routed.

use std::sync::Arc;

use imelink_core::Frame;
use tokio::sync::mpsc;
use tracing::debug;

use crate::metrics::SessionMetrics;
use crate::sink::{AppSink, ImeSink, SinkRegistry};
use crate::state::ActivityFlags;

/// One unit of work for the dispatcher task.
#[derive(Debug)]
pub enum DispatchItem {
    /// A decoded inbound frame.
    Frame(Frame),
    /// A connection-state notice for the App sink (see [`crate::sink::notice`]).
    Notice(String),
}

/// Resolved destination for one input event.
enum Target {
    Ime(Arc<dyn ImeSink>),
    App(Option<Arc<dyn AppSink>>),
}

/// Routes frames and notices to the registered sinks.
pub struct Dispatcher {
    sinks: Arc<SinkRegistry>,
    flags: Arc<ActivityFlags>,
    metrics: Arc<SessionMetrics>,
}

impl Dispatcher {
    pub fn new(
        sinks: Arc<SinkRegistry>,
        flags: Arc<ActivityFlags>,
        metrics: Arc<SessionMetrics>,
    ) -> Self {
        Self {
            sinks,
            flags,
            metrics,
        }
    }

    /// Consumes items until every sender is dropped.
    pub async fn run(self, mut rx: mpsc::Receiver<DispatchItem>) {
        while let Some(item) = rx.recv().await {
            match item {
                DispatchItem::Frame(frame) => self.dispatch_frame(frame).await,
                DispatchItem::Notice(status) => {
                    debug!(%status, "connection state notice");
                    if let Some(app) = self.sinks.app() {
                        app.on_connection_state(&status).await;
                    }
                }
            }
        }
        debug!("dispatcher channel closed");
    }

    /// Routes one decoded frame. Exposed for direct use in unit tests.
    pub async fn dispatch_frame(&self, frame: Frame) {
        match frame {
            Frame::State(state) => {
                debug!(active = state.is_active(), "peer activity state");
                self.flags.set_remote(state.is_active());
            }
            Frame::Text(text) if text.is_empty() => {
                self.metrics.record_empty_text_drop();
                debug!("dropped TEXT frame with empty decoded payload");
            }
            Frame::Text(text) => match self.target() {
                Target::Ime(ime) => ime.on_text(&text).await,
                Target::App(Some(app)) => app.on_text(&text).await,
                Target::App(None) => {}
            },
            Frame::Backspace => match self.target() {
                Target::Ime(ime) => ime.on_backspace().await,
                Target::App(Some(app)) => app.on_backspace().await,
                Target::App(None) => {}
            },
            Frame::Clear => match self.target() {
                Target::Ime(ime) => ime.on_clear().await,
                Target::App(Some(app)) => app.on_clear().await,
                Target::App(None) => {}
            },
            Frame::Unknown(raw) => {
                self.metrics.record_unknown_frame();
                debug!(line = %raw, "ignored unknown frame");
            }
        }
    }

    fn target(&self) -> Target {
        if self.flags.local_active() {
            if let Some(ime) = self.sinks.ime() {
                return Target::Ime(ime);
            }
        }
        Target::App(self.sinks.app())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
