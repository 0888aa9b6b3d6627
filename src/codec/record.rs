//! Logstash JSON record encoding.
//!
//! Records follow the Logstash event v1 layout so that a `json` or
//! `json_lines` input needs no extra filters:
//!
//! ```json
//! {"@timestamp":"2016-05-04T10:02:03.123Z","@version":"1","eventname":"PROCESS_STATE_EXITED",
//!  "expected":"0","from_state":"RUNNING","groupname":"cat","host":"web-1","level":"INFO",
//!  "logger_name":"logstash-notifier","message":"PROCESS_STATE_EXITED cat","pid":"2766",
//!  "processname":"cat","tags":[],"type":"logstash"}
//! ```
//!
//! Body fields are copied as strings unless integer coercion is on.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::protocol::{Event, KeyValues, EVENTNAME_KEY};

/// `logger_name` field value.
pub const LOGGER_NAME: &str = "logstash-notifier";

/// Append `\n` unless the line already ends with one.
pub fn ensure_trailing_newline(line: impl Into<Vec<u8>>) -> Vec<u8> {
    let mut line = line.into();
    if line.last() != Some(&b'\n') {
        line.push(b'\n');
    }
    line
}

/// Turns events into serialized Logstash records.
#[derive(Debug, Clone, Default)]
pub struct RecordFormatter {
    host: String,
    user_data: KeyValues,
    coerce_integers: bool,
    append_newline: bool,
}

impl RecordFormatter {
    /// Create a formatter stamping records with `host`.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Attach static fields, sent as the `user_data` object.
    pub fn user_data(mut self, user_data: KeyValues) -> Self {
        self.user_data = user_data;
        self
    }

    /// Send integer-looking body values as JSON numbers.
    pub fn coerce_integers(mut self, enabled: bool) -> Self {
        self.coerce_integers = enabled;
        self
    }

    /// Terminate every record with `\n`.
    pub fn append_newline(mut self, enabled: bool) -> Self {
        self.append_newline = enabled;
        self
    }

    /// Whether records are newline-terminated.
    pub fn appends_newline(&self) -> bool {
        self.append_newline
    }

    /// Serialize an event stamped with the current time.
    pub fn format(&self, event: &Event) -> Result<Vec<u8>> {
        self.format_at(event, Utc::now())
    }

    /// Serialize an event with an explicit timestamp.
    pub fn format_at(&self, event: &Event, timestamp: DateTime<Utc>) -> Result<Vec<u8>> {
        let record = Value::Object(self.build(event, timestamp));
        let encoded = serde_json::to_vec(&record)?;

        if self.append_newline {
            Ok(ensure_trailing_newline(encoded))
        } else {
            Ok(encoded)
        }
    }

    /// Build the record object. Reserved fields win over body fields.
    fn build(&self, event: &Event, timestamp: DateTime<Utc>) -> Map<String, Value> {
        let mut record: Map<String, Value> = event
            .body
            .iter()
            .map(|(key, value)| (key.clone(), self.field_value(value)))
            .collect();

        if let Some(name) = event.event_name() {
            record.insert(EVENTNAME_KEY.to_string(), Value::from(name));
        }
        if !self.user_data.is_empty() {
            let user_data: Map<String, Value> = self
                .user_data
                .iter()
                .map(|(key, value)| (key.clone(), Value::from(value.as_str())))
                .collect();
            record.insert("user_data".to_string(), Value::Object(user_data));
        }

        record.insert(
            "@timestamp".to_string(),
            Value::from(timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        record.insert("@version".to_string(), Value::from("1"));
        record.insert("type".to_string(), Value::from("logstash"));
        record.insert("level".to_string(), Value::from("INFO"));
        record.insert("logger_name".to_string(), Value::from(LOGGER_NAME));
        record.insert("host".to_string(), Value::from(self.host.as_str()));
        record.insert("message".to_string(), Value::from(message(event)));
        record.insert("tags".to_string(), Value::Array(Vec::new()));

        record
    }

    fn field_value(&self, value: &str) -> Value {
        if self.coerce_integers {
            if let Ok(n) = value.parse::<i64>() {
                return Value::from(n);
            }
        }
        Value::from(value)
    }
}

/// Record message: the event's free text, or `<eventname> <processname>`.
fn message(event: &Event) -> String {
    if !event.data.is_empty() {
        return event.data.clone();
    }

    [event.event_name(), event.process_name()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
}
