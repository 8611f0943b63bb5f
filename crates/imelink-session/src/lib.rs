//! # imelink-session
//!
//! The IMELink session/protocol subsystem. Owns at most one live TCP
//! connection between two paired devices, arbitrates who may hold it
//! (inbound listener vs outbound dialer), and routes decoded frames to one
//! of two host-registered sinks based on local activity state.
//!
//! # Architecture
//!
//! ```text
//! transport (listen / dial)
//!   └─ SessionArbiter         -- single-session slot, adopt/close/send
//!        ├─ reader task       -- one per session, lines → Frame → channel
//!        └─ Dispatcher task   -- host-affine: routes frames to sinks
//! SessionService              -- host-facing facade over all of the above
//! ```
//!
//! The session slot is the one piece of genuinely shared mutable state;
//! every adopt, close, and send serializes on its mutex so no caller ever
//! observes a half-adopted or half-closed session.

pub mod arbiter;
pub mod config;
pub mod dispatch;
pub mod metrics;
pub mod service;
pub mod sink;
pub mod state;
pub mod transport;

pub use config::SessionConfig;
pub use metrics::MetricsSnapshot;
pub use service::{SessionError, SessionService};
pub use sink::{notice, AppSink, ImeSink};
