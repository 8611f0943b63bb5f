//! Activity flags shared between the host API, the arbiter, and the
//! dispatcher.
//!
//! The local flag is mutated only through the host's single setter
//! ([`crate::service::SessionService::set_local_active`]); the remote flag
//! only by the dispatcher when a `STATE` frame arrives. The remote flag is
//! informational; routing depends solely on the local flag.

use std::sync::atomic::{AtomicBool, Ordering};

/// Local and remote input-surface focus state.
#[derive(Debug, Default)]
pub struct ActivityFlags {
    local: AtomicBool,
    remote: AtomicBool,
}

impl ActivityFlags {
    /// Whether this device's input surface has focus.
    pub fn local_active(&self) -> bool {
        self.local.load(Ordering::SeqCst)
    }

    /// Whether the peer last reported its input surface as focused.
    pub fn remote_active(&self) -> bool {
        self.remote.load(Ordering::SeqCst)
    }

    /// Sets the local flag, returning the previous value so callers can
    /// detect transitions.
    pub fn set_local(&self, active: bool) -> bool {
        self.local.swap(active, Ordering::SeqCst)
    }

    /// Records the peer's last reported state.
    pub fn set_remote(&self, active: bool) {
        self.remote.store(active, Ordering::SeqCst);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
