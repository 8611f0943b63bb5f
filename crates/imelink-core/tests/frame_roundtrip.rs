//! Integration tests for the IMELink line codec.
//!
//! These tests exercise the codec through its public API the way the session
//! reader does: every inbound line, whatever its content, must decode to a
//! well-defined [`Frame`] without panicking, and every representable frame
//! must survive an encode/decode round trip unchanged.

use imelink_core::{decode_frame, encode_frame, Frame, ImeState};

/// Round-trips every representable frame kind in one sweep.
#[test]
fn test_all_representable_frames_round_trip() {
    let frames = vec![
        Frame::State(ImeState::Active),
        Frame::State(ImeState::Inactive),
        Frame::Text("abc".to_string()),
        Frame::Text("héllo".to_string()),
        Frame::Text("multi\u{00A0}word \u{1F600}".to_string()),
        Frame::Text(String::new()),
        Frame::Backspace,
        Frame::Clear,
    ];
    for frame in frames {
        let line = encode_frame(&frame);
        assert_eq!(decode_frame(&line), frame, "line was {line:?}");
    }
}

/// Text containing newline characters must still encode to a single wire
/// line: the payload is base64, which never contains line breaks.
#[test]
fn test_text_with_embedded_newlines_stays_one_line() {
    let frame = Frame::Text("line one\nline two\r\nline three".to_string());
    let line = encode_frame(&frame);
    assert!(!line.contains('\n'));
    assert!(!line.contains('\r'));
    assert_eq!(decode_frame(&line), frame);
}

/// Decode is total: arbitrary garbage lines produce `Unknown`, never a panic.
#[test]
fn test_decode_never_panics_on_garbage() {
    let lines = [
        "",
        " ",
        "\r",
        ":",
        "STATE:",
        "TEXT",
        "STATE",
        "NOT_A_FRAME",
        "STATE:IME_ACTIVE extra",
        "TEXT:YWJj YWJj",
        "\u{0000}\u{FFFD}",
        "ＴＥＸＴ:YWJj",
    ];
    for line in lines {
        // The result kind does not matter here, only that a value comes back.
        let _ = decode_frame(line);
    }
}

/// Unknown frames carry the raw line so callers can log the exact input.
#[test]
fn test_unknown_preserves_raw_line() {
    let raw = "FUTURE_FRAME:with:colons";
    assert_eq!(decode_frame(raw), Frame::Unknown(raw.to_string()));
}

/// `TEXT` payloads that are valid base64 of invalid UTF-8 degrade to empty
/// text rather than an error; callers drop empty text frames.
#[test]
fn test_invalid_utf8_degrades_to_empty_text() {
    // Raw bytes 0x80 0x81 are not valid UTF-8; "gIE=" is their base64 form.
    assert_eq!(decode_frame("TEXT:gIE="), Frame::Text(String::new()));
}
