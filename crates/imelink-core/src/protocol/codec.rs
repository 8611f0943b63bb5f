//! Line codec for encoding and decoding IMELink protocol frames.
//!
//! Wire format: one frame per line, UTF-8 text, `\n` terminated (a trailing
//! `\r` is accepted defensively). The four literal forms:
//!
//! ```text
//! STATE:IME_ACTIVE      sender's input surface gained focus
//! STATE:IME_INACTIVE    sender's input surface lost focus
//! TEXT:<base64>         base64 (standard alphabet, unpadded input accepted,
//!                       no line wrapping) of UTF-8 text to insert
//! BACKSPACE             delete one character before the cursor
//! CLEAR                 delete the surrounding content
//! ```
//!
//! Decoding is a total function: no input line is an error. Unrecognised
//! lines become [`Frame::Unknown`] and a `TEXT` payload that fails base64 or
//! UTF-8 decoding becomes an empty `Text` frame; the caller drops those, so
//! a malformed or newer-protocol peer can never wedge the reader.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing::debug;

use crate::protocol::frame::{
    Frame, ImeState, BACKSPACE_LITERAL, CLEAR_LITERAL, STATE_ACTIVE, STATE_INACTIVE, STATE_PREFIX,
    TEXT_PREFIX,
};

/// Encodes a [`Frame`] into its line form, without the `\n` terminator.
///
/// The base64 engine never emits line breaks, so the result is guaranteed to
/// be a single line for every representable frame.
pub fn encode_frame(frame: &Frame) -> String {
    match frame {
        Frame::State(state) => format!("{STATE_PREFIX}{}", state.as_payload()),
        Frame::Text(text) => format!("{TEXT_PREFIX}{}", BASE64.encode(text.as_bytes())),
        Frame::Backspace => BACKSPACE_LITERAL.to_string(),
        Frame::Clear => CLEAR_LITERAL.to_string(),
        // Decode-only variant; echoing the raw text keeps encode total.
        Frame::Unknown(raw) => raw.clone(),
    }
}

/// Decodes one line into a [`Frame`]. Never fails.
///
/// Literal prefixes are checked before the generic fallback; any line that
/// matches none of them decodes to [`Frame::Unknown`] carrying the raw text.
pub fn decode_frame(line: &str) -> Frame {
    // Peers on some platforms terminate lines with \r\n.
    let line = line.strip_suffix('\r').unwrap_or(line);

    if let Some(payload) = line.strip_prefix(STATE_PREFIX) {
        return match payload {
            STATE_ACTIVE => Frame::State(ImeState::Active),
            STATE_INACTIVE => Frame::State(ImeState::Inactive),
            _ => Frame::Unknown(line.to_string()),
        };
    }

    if let Some(payload) = line.strip_prefix(TEXT_PREFIX) {
        return Frame::Text(decode_text_payload(payload));
    }

    match line {
        BACKSPACE_LITERAL => Frame::Backspace,
        CLEAR_LITERAL => Frame::Clear,
        _ => Frame::Unknown(line.to_string()),
    }
}

/// Decodes a `TEXT` payload, degrading to an empty string on malformed
/// base64 or invalid UTF-8. The empty result is dropped by the dispatcher.
fn decode_text_payload(payload: &str) -> String {
    let bytes = match BASE64.decode(payload) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!("malformed base64 in TEXT frame: {e}");
            return String::new();
        }
    };
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            debug!("TEXT frame payload is not UTF-8: {e}");
            String::new()
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
