//! All IMELink protocol frame types.
//!
//! A frame is one newline-terminated line of UTF-8 text. Four kinds exist
//! on the wire; a fifth (`Unknown`) exists only on the decode side so that
//! unrecognised lines degrade to a loggable value instead of an error.

// ── Protocol constants ────────────────────────────────────────────────────────

/// Default TCP port both devices use. Fixed, not negotiated.
pub const DEFAULT_PORT: u16 = 10000;

/// Literal prefix of a `State` frame.
pub const STATE_PREFIX: &str = "STATE:";

/// Literal prefix of a `Text` frame.
pub const TEXT_PREFIX: &str = "TEXT:";

/// Literal form of a `Backspace` frame.
pub const BACKSPACE_LITERAL: &str = "BACKSPACE";

/// Literal form of a `Clear` frame.
pub const CLEAR_LITERAL: &str = "CLEAR";

/// `State` payload when the sender's input surface is focused.
pub const STATE_ACTIVE: &str = "IME_ACTIVE";

/// `State` payload when the sender's input surface is unfocused.
pub const STATE_INACTIVE: &str = "IME_INACTIVE";

// ── Frame types ───────────────────────────────────────────────────────────────

/// Whether an input surface currently has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImeState {
    Active,
    Inactive,
}

impl ImeState {
    /// The wire payload literal for this state.
    pub fn as_payload(self) -> &'static str {
        match self {
            ImeState::Active => STATE_ACTIVE,
            ImeState::Inactive => STATE_INACTIVE,
        }
    }

    pub fn is_active(self) -> bool {
        matches!(self, ImeState::Active)
    }
}

impl From<bool> for ImeState {
    fn from(active: bool) -> Self {
        if active {
            ImeState::Active
        } else {
            ImeState::Inactive
        }
    }
}

/// One protocol unit exchanged over the session socket.
///
/// Invariant: an encoded frame never contains an embedded line break, and a
/// `Text` payload is base64 with no embedded whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// The sender's input surface gained or lost focus.
    State(ImeState),
    /// UTF-8 text to insert at the receiver's cursor.
    Text(String),
    /// Delete one character before the cursor.
    Backspace,
    /// Delete the surrounding content (bulk clear).
    Clear,
    /// A line that matched no known literal. Decode-only; carries the raw
    /// text so the caller can log it. Never produced by well-behaved peers.
    Unknown(String),
}

impl Frame {
    /// Short name of the frame kind, used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Frame::State(_) => "STATE",
            Frame::Text(_) => "TEXT",
            Frame::Backspace => "BACKSPACE",
            Frame::Clear => "CLEAR",
            Frame::Unknown(_) => "UNKNOWN",
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ime_state_payload_literals() {
        assert_eq!(ImeState::Active.as_payload(), "IME_ACTIVE");
        assert_eq!(ImeState::Inactive.as_payload(), "IME_INACTIVE");
    }

    #[test]
    fn test_ime_state_from_bool() {
        assert_eq!(ImeState::from(true), ImeState::Active);
        assert_eq!(ImeState::from(false), ImeState::Inactive);
        assert!(ImeState::Active.is_active());
        assert!(!ImeState::Inactive.is_active());
    }

    #[test]
    fn test_frame_kind_names() {
        assert_eq!(Frame::State(ImeState::Active).kind(), "STATE");
        assert_eq!(Frame::Text("x".to_string()).kind(), "TEXT");
        assert_eq!(Frame::Backspace.kind(), "BACKSPACE");
        assert_eq!(Frame::Clear.kind(), "CLEAR");
        assert_eq!(Frame::Unknown(String::new()).kind(), "UNKNOWN");
    }

    #[test]
    fn test_default_port_is_fixed() {
        assert_eq!(DEFAULT_PORT, 10000);
    }
}
