//! Codec module - serialization of events for the collector.
//!
//! - [`RecordFormatter`] - Logstash event v1 JSON using `serde_json`
//!
//! # Example
//!
//! ```
//! use logstash_notifier::codec::RecordFormatter;
//! use logstash_notifier::protocol::{decode_keyvals, Event};
//!
//! let event = Event::new(
//!     decode_keyvals("eventname:PROCESS_STATE_RUNNING len:15"),
//!     decode_keyvals("processname:cat"),
//!     String::new(),
//! );
//!
//! let formatter = RecordFormatter::new("web-1").append_newline(true);
//! let line = formatter.format(&event).unwrap();
//! assert!(line.ends_with(b"\n"));
//! ```

mod record;

pub use record::{ensure_trailing_newline, RecordFormatter, LOGGER_NAME};
