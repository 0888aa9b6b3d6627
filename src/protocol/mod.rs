//! Protocol module - supervisor event framing.
//!
//! This module implements the text protocol of supervisor event listeners:
//! - `key:value` line codec for headers and bodies
//! - Body splitting into pairs and trailing data
//! - Length-framed reader producing [`Event`]s

mod frame;
mod keyvals;
mod payload;

pub use frame::{
    read_frame, Event, FrameReader, DEFAULT_MAX_BODY_SIZE, DEFAULT_MAX_HEADER_SIZE,
    EVENTNAME_KEY, LEN_KEY, PROCESSNAME_KEY,
};
pub use keyvals::{decode_keyvals, encode_keyvals, KeyValues};
pub use payload::split_payload;
