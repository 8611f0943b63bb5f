//! Session subsystem configuration.
//!
//! Fields annotated with `#[serde(default = "…")]` fall back to the wire
//! defaults when absent, so a partial TOML table (or none at all) yields a
//! working configuration.

use std::net::IpAddr;
use std::time::Duration;

use imelink_core::protocol::frame::DEFAULT_PORT;
use serde::{Deserialize, Serialize};

/// Network settings for the session subsystem.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    /// TCP port the listener binds. Both devices use the same fixed port.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
    /// IP address to bind the listener to. `0.0.0.0` binds all interfaces.
    #[serde(default = "default_bind_address")]
    pub bind_address: IpAddr,
    /// Upper bound on a single outbound connect attempt, in milliseconds.
    #[serde(default = "default_dial_timeout_ms")]
    pub dial_timeout_ms: u64,
}

impl SessionConfig {
    /// The dial timeout as a [`Duration`].
    pub fn dial_timeout(&self) -> Duration {
        Duration::from_millis(self.dial_timeout_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            listen_port: default_listen_port(),
            bind_address: default_bind_address(),
            dial_timeout_ms: default_dial_timeout_ms(),
        }
    }
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_listen_port() -> u16 {
    DEFAULT_PORT
}

fn default_bind_address() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_dial_timeout_ms() -> u64 {
    10_000
}

// ── Tests ─────────────────────────────────────────────────────────────────────
