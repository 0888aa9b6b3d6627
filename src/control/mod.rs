//! Control plane module - tokens sent to the supervisor over stdout.
//!
//! # Workflow
//!
//! 1. Listener writes `READY\n`
//! 2. Supervisor sends one event frame on stdin
//! 3. Listener writes `RESULT 2\nOK`
//! 4. Back to 1
//!
//! # Example
//!
//! ```
//! use logstash_notifier::control::{write_token, OK_TOKEN, READY_TOKEN};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let mut stdout = Vec::new();
//! write_token(&mut stdout, READY_TOKEN).await.unwrap();
//! write_token(&mut stdout, OK_TOKEN).await.unwrap();
//! assert_eq!(stdout, b"READY\nRESULT 2\nOK");
//! # });
//! ```

mod stdio;

pub use stdio::{write_token, OK_TOKEN, READY_TOKEN};
