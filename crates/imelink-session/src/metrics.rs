//! Counters for the protocol's tolerant paths.
//!
//! The codec and dispatcher deliberately swallow malformed input (unknown
//! frame literals, empty decoded text) and the arbiter drops sends that
//! have no session to ride on. None of those are errors, but all of them
//! are worth seeing, so each tolerant drop increments a counter that the
//! host can read back through the service.

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters owned by the session subsystem.
#[derive(Debug, Default)]
pub struct SessionMetrics {
    unknown_frames: AtomicU64,
    empty_text_drops: AtomicU64,
    sends_without_session: AtomicU64,
    rejected_inbound: AtomicU64,
    write_faults: AtomicU64,
}

impl SessionMetrics {
    pub fn record_unknown_frame(&self) {
        self.unknown_frames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_empty_text_drop(&self) {
        self.empty_text_drops.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_send_without_session(&self) {
        self.sends_without_session.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected_inbound(&self) {
        self.rejected_inbound.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_write_fault(&self) {
        self.write_faults.fetch_add(1, Ordering::Relaxed);
    }

    /// A point-in-time copy of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            unknown_frames: self.unknown_frames.load(Ordering::Relaxed),
            empty_text_drops: self.empty_text_drops.load(Ordering::Relaxed),
            sends_without_session: self.sends_without_session.load(Ordering::Relaxed),
            rejected_inbound: self.rejected_inbound.load(Ordering::Relaxed),
            write_faults: self.write_faults.load(Ordering::Relaxed),
        }
    }
}

/// Plain-data view of [`SessionMetrics`] at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    /// Inbound lines that matched no known frame literal.
    pub unknown_frames: u64,
    /// `TEXT` frames whose payload decoded to an empty string.
    pub empty_text_drops: u64,
    /// Outgoing frames dropped because no session was active.
    pub sends_without_session: u64,
    /// Inbound connections closed because a session already existed.
    pub rejected_inbound: u64,
    /// Socket writes that failed and tore the session down.
    pub write_faults: u64,
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_starts_at_zero() {
        let metrics = SessionMetrics::default();
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_each_counter_increments_independently() {
        let metrics = SessionMetrics::default();
        metrics.record_unknown_frame();
        metrics.record_unknown_frame();
        metrics.record_empty_text_drop();
        metrics.record_send_without_session();
        metrics.record_rejected_inbound();
        metrics.record_write_fault();

        let snap = metrics.snapshot();
        assert_eq!(snap.unknown_frames, 2);
        assert_eq!(snap.empty_text_drops, 1);
        assert_eq!(snap.sends_without_session, 1);
        assert_eq!(snap.rejected_inbound, 1);
        assert_eq!(snap.write_faults, 1);
    }
}
