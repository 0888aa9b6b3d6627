//! Transport module - network connection to the log collector.
//!
//! Provides:
//! - TCP streams (newline-delimited records)
//! - UDP datagrams

mod socket;

pub use socket::{Protocol, Transport};
