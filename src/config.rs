//! Configuration from the process environment.
//!
//! The collector endpoint comes from three required variables:
//!
//! | Variable          | Example     |
//! |-------------------|-------------|
//! | `LOGSTASH_SERVER` | `127.0.0.1` |
//! | `LOGSTASH_PORT`   | `5959`      |
//! | `LOGSTASH_PROTO`  | `tcp`       |

use std::env;

use crate::error::{NotifierError, Result};
use crate::listener::DEFAULT_SELF_NAME;
use crate::protocol::KeyValues;
use crate::transport::Protocol;

/// Collector host variable.
pub const SERVER_VAR: &str = "LOGSTASH_SERVER";
/// Collector port variable.
pub const PORT_VAR: &str = "LOGSTASH_PORT";
/// Collector protocol variable.
pub const PROTO_VAR: &str = "LOGSTASH_PROTO";
/// Set by supervisor to the name of the program it started.
pub const SUPERVISOR_PROCESS_NAME_VAR: &str = "SUPERVISOR_PROCESS_NAME";

/// Where to send records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorConfig {
    pub host: String,
    pub port: u16,
    pub protocol: Protocol,
}

impl CollectorConfig {
    /// Load from `LOGSTASH_SERVER`, `LOGSTASH_PORT` and `LOGSTASH_PROTO`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| NotifierError::Config(format!("{} must be set", key)))
        };

        let host = required(SERVER_VAR)?;
        let port = required(PORT_VAR)?;
        let protocol = required(PROTO_VAR)?;

        let port = port.parse().map_err(|_| {
            NotifierError::Config(format!("{} must be a port number, got {:?}", PORT_VAR, port))
        })?;

        Ok(Self {
            host,
            port,
            protocol: protocol.parse()?,
        })
    }
}

/// Prefix of supervisor process state event names.
pub const PROCESS_STATE_PREFIX: &str = "PROCESS_STATE_";

/// States forwarded when none are given on the command line.
pub const DEFAULT_STATES: [&str; 6] = [
    "BACKOFF", "FATAL", "EXITED", "STOPPED", "STARTING", "RUNNING",
];

/// Turn state names (`EXITED`) into event names (`PROCESS_STATE_EXITED`).
///
/// Names that already carry the prefix are kept as they are.
pub fn process_state_events<I, S>(states: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    states
        .into_iter()
        .map(|state| {
            let state = state.as_ref().to_ascii_uppercase();
            if state.starts_with(PROCESS_STATE_PREFIX) {
                state
            } else {
                format!("{}{}", PROCESS_STATE_PREFIX, state)
            }
        })
        .collect()
}

/// Host name stamped on records.
///
/// Uses `HOSTNAME`, then `/etc/hostname`, then `localhost`.
pub fn local_hostname() -> String {
    env::var("HOSTNAME")
        .ok()
        .or_else(|| std::fs::read_to_string("/etc/hostname").ok())
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

/// Process name used to drop this listener's own events.
///
/// Supervisor exports `SUPERVISOR_PROCESS_NAME` to every child it starts.
pub fn self_name_from_env() -> String {
    env::var(SUPERVISOR_PROCESS_NAME_VAR)
        .ok()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_SELF_NAME.to_string())
}

/// Parse one `--include` token.
///
/// `key=value` gives `{key: value}`, split on the first `=`. A bare name is
/// looked up in the environment and gives `{name: value}`, or nothing when
/// the variable is unset.
pub fn value_from_input(token: &str) -> KeyValues {
    value_from_input_with(token, |key| env::var(key).ok())
}

fn value_from_input_with<F>(token: &str, lookup: F) -> KeyValues
where
    F: Fn(&str) -> Option<String>,
{
    match token.split_once('=') {
        Some((key, value)) => KeyValues::from([(key.to_string(), value.to_string())]),
        None => lookup(token)
            .map(|value| KeyValues::from([(token.to_string(), value)]))
            .unwrap_or_default(),
    }
}

/// Merge all `--include` tokens into one map. Later tokens win.
pub fn user_data_from_inputs<I, S>(tokens: I) -> KeyValues
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tokens
        .into_iter()
        .flat_map(|token| value_from_input(token.as_ref()))
        .collect()
}
