//! Host-registered consumer capabilities.
//!
//! Two sink roles exist: the IME sink (the device's own input surface, when
//! it has focus) and the App sink (the focused application's text field).
//! The host registers at most one of each; either may be absent at any time
//! and the core must keep working: an absent sink simply swallows events.
//!
//! Sink methods run on the dispatcher task, never on the socket reader, so a
//! slow sink cannot stall the connection (see [`crate::dispatch`]).

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

/// Human-readable connection-state notices delivered to
/// [`AppSink::on_connection_state`].
pub mod notice {
    pub const CONNECTED: &str = "connected";
    pub const CONNECT_FAILED: &str = "connect failed";
    pub const DISCONNECTED: &str = "disconnected";
    pub const SEND_FAILED: &str = "send failed";
    pub const LISTENING: &str = "listening";
}

/// Consumer for events routed to the device's own input surface.
#[async_trait]
pub trait ImeSink: Send + Sync {
    /// Inserts text at the cursor of the input surface's composition field.
    async fn on_text(&self, text: &str);

    /// Deletes one character before the cursor.
    async fn on_backspace(&self);

    /// Deletes the surrounding content (bulk clear).
    async fn on_clear(&self);

    /// Whether the input surface considers itself active.
    async fn is_active(&self) -> bool;
}

/// Consumer for events routed to the focused application, plus
/// connection-state notices.
#[async_trait]
pub trait AppSink: Send + Sync {
    /// Inserts text at the cursor of the focused text field.
    async fn on_text(&self, text: &str);

    /// Deletes one character before the cursor.
    async fn on_backspace(&self);

    /// Deletes the surrounding content (bulk clear).
    async fn on_clear(&self);

    /// Receives a human-readable transition notice (see [`notice`]).
    async fn on_connection_state(&self, status: &str);

    /// Whether the application currently accepts input.
    async fn is_active(&self) -> bool;
}

/// The two independent "current holder, replaceable, nullable" sink slots.
///
/// Registration is synchronous and cheap; readers clone the `Arc` out under
/// a short read lock and never hold the lock across a sink call.
#[derive(Default)]
pub struct SinkRegistry {
    ime: RwLock<Option<Arc<dyn ImeSink>>>,
    app: RwLock<Option<Arc<dyn AppSink>>>,
}

impl SinkRegistry {
    /// Replaces or clears the IME sink slot.
    pub fn set_ime(&self, sink: Option<Arc<dyn ImeSink>>) {
        if let Ok(mut slot) = self.ime.write() {
            *slot = sink;
        }
    }

    /// Replaces or clears the App sink slot.
    pub fn set_app(&self, sink: Option<Arc<dyn AppSink>>) {
        if let Ok(mut slot) = self.app.write() {
            *slot = sink;
        }
    }

    /// The currently registered IME sink, if any.
    pub fn ime(&self) -> Option<Arc<dyn ImeSink>> {
        self.ime.read().ok().and_then(|slot| slot.clone())
    }

    /// The currently registered App sink, if any.
    pub fn app(&self) -> Option<Arc<dyn AppSink>> {
        self.app.read().ok().and_then(|slot| slot.clone())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    struct NullIme;

    #[async_trait]
    impl ImeSink for NullIme {
        async fn on_text(&self, _text: &str) {}
        async fn on_backspace(&self) {}
        async fn on_clear(&self) {}
        async fn is_active(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_registry_starts_empty() {
        let registry = SinkRegistry::default();
        assert!(registry.ime().is_none());
        assert!(registry.app().is_none());
    }

    #[test]
    fn test_set_ime_registers_and_clears() {
        let registry = SinkRegistry::default();
        registry.set_ime(Some(Arc::new(NullIme)));
        assert!(registry.ime().is_some());

        registry.set_ime(None);
        assert!(registry.ime().is_none());
    }

    #[test]
    fn test_replacing_ime_sink_swaps_holder() {
        let registry = SinkRegistry::default();
        let first: Arc<dyn ImeSink> = Arc::new(NullIme);
        let second: Arc<dyn ImeSink> = Arc::new(NullIme);

        registry.set_ime(Some(Arc::clone(&first)));
        registry.set_ime(Some(Arc::clone(&second)));

        let current = registry.ime().expect("sink registered");
        assert!(Arc::ptr_eq(&current, &second));
    }

    #[test]
    fn test_notice_literals() {
        assert_eq!(notice::CONNECTED, "connected");
        assert_eq!(notice::CONNECT_FAILED, "connect failed");
        assert_eq!(notice::DISCONNECTED, "disconnected");
        assert_eq!(notice::SEND_FAILED, "send failed");
        assert_eq!(notice::LISTENING, "listening");
    }
}
