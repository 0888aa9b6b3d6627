//! # logstash-notifier
//!
//! Supervisor event listener that forwards process events to Logstash.
//!
//! Supervisor starts the listener as a child process and talks to it over
//! stdio. The listener acknowledges every event, keeps the ones it was told
//! to care about, drops the ones about itself, and ships the rest to a
//! Logstash collector as JSON over TCP or UDP.
//!
//! ## Architecture
//!
//! - **Protocol** (stdin): `key:value` header line plus a `len`-byte body
//! - **Control** (stdout): `READY` / `RESULT 2\nOK` tokens
//! - **Sink** (network): Logstash JSON records
//!
//! ## Example
//!
//! ```ignore
//! use logstash_notifier::{relay, EventFilter, EventListener, LogstashSink};
//! use logstash_notifier::codec::RecordFormatter;
//! use logstash_notifier::transport::Protocol;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> logstash_notifier::Result<()> {
//!     let mut sink = LogstashSink::connect(
//!         Protocol::Tcp,
//!         "127.0.0.1",
//!         5959,
//!         RecordFormatter::new("web-1"),
//!     )
//!     .await?;
//!
//!     let filter = EventFilter::new(["PROCESS_STATE_EXITED", "PROCESS_STATE_FATAL"]);
//!     let mut listener = EventListener::new(
//!         tokio::io::BufReader::new(tokio::io::stdin()),
//!         tokio::io::stdout(),
//!         filter,
//!     );
//!
//!     relay(&mut listener, &mut sink).await?;
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod config;
pub mod control;
pub mod error;
pub mod listener;
pub mod protocol;
pub mod sink;
pub mod transport;

mod relay;

pub use error::{NotifierError, Result};
pub use listener::{EventFilter, EventListener, Rejection, DEFAULT_SELF_NAME};
pub use protocol::Event;
pub use relay::{relay, RelayStats};
pub use sink::{LogstashSink, Sink};
