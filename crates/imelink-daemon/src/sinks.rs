//! Sink implementations for the headless daemon.
//!
//! A real host wires the session subsystem to an input surface and a text
//! field; the daemon has neither, so it registers a logging App sink that
//! makes received events and connection transitions visible in the log.

use async_trait::async_trait;
use imelink_session::AppSink;
use tracing::{debug, info};

/// App sink that logs everything it receives.
///
/// Text content is logged at `debug` only, so keystrokes do not end up in
/// logs at the default level.
#[derive(Debug, Default)]
pub struct LoggingAppSink;

#[async_trait]
impl AppSink for LoggingAppSink {
    async fn on_text(&self, text: &str) {
        info!(chars = text.chars().count(), "received text");
        debug!(%text, "text content");
    }

    async fn on_backspace(&self) {
        info!("received backspace");
    }

    async fn on_clear(&self) {
        info!("received clear");
    }

    async fn on_connection_state(&self, status: &str) {
        info!(%status, "connection state");
    }

    async fn is_active(&self) -> bool {
        true
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
