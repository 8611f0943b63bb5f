//! # imelink-core
//!
//! Shared library for IMELink containing the wire protocol: the frame
//! types exchanged between two paired devices and the newline-delimited
//! text codec that puts them on the wire.
//!
//! This crate is used by both sides of a link. It has zero dependencies
//! on OS APIs, UI frameworks, or network sockets: encoding and decoding
//! are pure functions over strings, which keeps them trivially testable
//! and benchmarkable.

pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `imelink_core::Frame` instead of `imelink_core::protocol::frame::Frame`.
pub use protocol::codec::{decode_frame, encode_frame};
pub use protocol::frame::{Frame, ImeState};
