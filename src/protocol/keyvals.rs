//! `key:value` line codec.
//!
//! Supervisor headers and event bodies share the same line format:
//!
//! ```text
//! ver:3.0 server:supervisor serial:21 pool:listener poolserial:10 eventname:PROCESS_STATE_RUNNING len:54
//! ```
//!
//! Parsing is lenient. Tokens without a `:` are skipped instead of failing
//! the whole line, since frames come from outside this process.
//!
//! # Example
//!
//! ```
//! use logstash_notifier::protocol::{decode_keyvals, encode_keyvals};
//!
//! let keyvals = decode_keyvals("a:1 b:2 c:3\n");
//! assert_eq!(keyvals["b"], "2");
//! assert_eq!(encode_keyvals(&keyvals), "a:1 b:2 c:3");
//! ```

use std::collections::HashMap;

/// Decoded `key:value` pairs from a single line.
pub type KeyValues = HashMap<String, String>;

/// Strip a single trailing `\n` (and a `\r` before it).
#[inline]
fn strip_line_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Decode a `key:value key:value` line.
///
/// Splits on runs of whitespace, then splits each token on its first `:`.
/// Duplicate keys keep the last value. An empty line gives an empty map.
pub fn decode_keyvals(line: &str) -> KeyValues {
    strip_line_terminator(line)
        .split_whitespace()
        .filter_map(|token| token.split_once(':'))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// Encode pairs as `key:value` tokens joined by single spaces.
///
/// Keys are sorted so the output is stable.
pub fn encode_keyvals(keyvals: &KeyValues) -> String {
    let mut pairs: Vec<_> = keyvals.iter().collect();
    pairs.sort_by(|a, b| a.0.cmp(b.0));

    pairs
        .iter()
        .map(|(key, value)| format!("{}:{}", key, value))
        .collect::<Vec<_>>()
        .join(" ")
}
