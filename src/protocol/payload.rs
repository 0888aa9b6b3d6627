//! Event body splitting.
//!
//! A body is a `key:value` line optionally followed by free text:
//!
//! ```text
//! processname:cat groupname:cat from_state:RUNNING expected:0 pid:2766\n
//! <free text, e.g. log output for PROCESS_LOG events>
//! ```

use super::keyvals::{decode_keyvals, KeyValues};

/// Split a body into its decoded first line and the verbatim remainder.
///
/// Without a newline the remainder is empty.
pub fn split_payload(payload: &str) -> (KeyValues, String) {
    match payload.split_once('\n') {
        Some((line, data)) => (decode_keyvals(line), data.to_string()),
        None => (decode_keyvals(payload), String::new()),
    }
}
