//! Protocol module containing the frame types and the line codec.

pub mod codec;
pub mod frame;

pub use codec::{decode_frame, encode_frame};
pub use frame::{Frame, ImeState};
