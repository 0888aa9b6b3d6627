//! Supervisor event listener loop.
//!
//! The [`EventListener`] owns the supervisor streams and hands out accepted
//! events one at a time. Each call to [`EventListener::next_event`]:
//! 1. Writes `READY` to the supervisor
//! 2. Reads one frame
//! 3. Acknowledges the frame (always, even if it is filtered out)
//! 4. Filters by event name and self origin, looping until a frame passes
//!
//! The next frame is not requested until the caller asks for it, so a slow
//! consumer throttles the supervisor one event at a time.
//!
//! # Example
//!
//! ```
//! use logstash_notifier::{EventFilter, EventListener};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let input: &[u8] = b"eventname:PROCESS_STATE_RUNNING len:15\nprocessname:cat";
//! let mut output = Vec::new();
//!
//! let filter = EventFilter::new(["PROCESS_STATE_RUNNING"]);
//! let mut listener = EventListener::new(input, &mut output, filter);
//!
//! let event = listener.next_event().await.unwrap().unwrap();
//! assert_eq!(event.process_name(), Some("cat"));
//! assert!(listener.next_event().await.unwrap().is_none());
//! # });
//! ```

use std::collections::HashSet;

use tokio::io::{AsyncBufRead, AsyncWrite};

use crate::control::{write_token, OK_TOKEN, READY_TOKEN};
use crate::error::Result;
use crate::protocol::{Event, FrameReader};

/// Process name this listener registers under by default.
pub const DEFAULT_SELF_NAME: &str = "logstash-notifier";

/// Why a frame was not handed to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// `eventname` missing or not subscribed.
    UnwantedEvent,
    /// Event about this listener's own process.
    SelfEvent,
}

/// Decides which frames reach the caller.
#[derive(Debug, Clone)]
pub struct EventFilter {
    accepted: HashSet<String>,
    self_name: String,
}

impl EventFilter {
    /// Accept the given event names, excluding events about
    /// [`DEFAULT_SELF_NAME`].
    pub fn new<I, S>(events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            accepted: events.into_iter().map(Into::into).collect(),
            self_name: DEFAULT_SELF_NAME.to_string(),
        }
    }

    /// Set the process name whose own events are dropped.
    pub fn self_name(mut self, name: impl Into<String>) -> Self {
        self.self_name = name.into();
        self
    }

    /// Process name whose events are dropped.
    pub fn own_name(&self) -> &str {
        &self.self_name
    }

    /// Check a frame against the filter.
    pub fn check(&self, event: &Event) -> std::result::Result<(), Rejection> {
        match event.event_name() {
            Some(name) if self.accepted.contains(name) => {}
            _ => return Err(Rejection::UnwantedEvent),
        }
        if event.process_name() == Some(self.self_name.as_str()) {
            return Err(Rejection::SelfEvent);
        }
        Ok(())
    }

    /// Whether a frame passes the filter.
    #[inline]
    pub fn accepts(&self, event: &Event) -> bool {
        self.check(event).is_ok()
    }
}

/// Pull-based cursor over accepted supervisor events.
///
/// Not restartable: after end of input or a framing error every further
/// call returns `Ok(None)`.
pub struct EventListener<R, W> {
    reader: R,
    writer: W,
    frames: FrameReader,
    filter: EventFilter,
    frames_read: u64,
    frames_accepted: u64,
    finished: bool,
}

impl<R, W> EventListener<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Create a listener over the supervisor streams.
    pub fn new(reader: R, writer: W, filter: EventFilter) -> Self {
        Self::with_frame_reader(reader, writer, filter, FrameReader::new())
    }

    /// Create a listener with a custom frame reader (e.g. body limit).
    pub fn with_frame_reader(
        reader: R,
        writer: W,
        filter: EventFilter,
        frames: FrameReader,
    ) -> Self {
        Self {
            reader,
            writer,
            frames,
            filter,
            frames_read: 0,
            frames_accepted: 0,
            finished: false,
        }
    }

    /// Frames read and acknowledged so far.
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Frames handed to the caller so far.
    pub fn frames_accepted(&self) -> u64 {
        self.frames_accepted
    }

    /// Whether the listener has reached end of input or failed.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Read frames until one passes the filter.
    ///
    /// Returns `Ok(None)` at end of input.
    ///
    /// # Errors
    ///
    /// Framing and I/O errors are returned as-is and end the listener.
    pub async fn next_event(&mut self) -> Result<Option<Event>> {
        if self.finished {
            return Ok(None);
        }

        match self.next_accepted().await {
            Ok(Some(event)) => Ok(Some(event)),
            other => {
                self.finished = true;
                other
            }
        }
    }

    async fn next_accepted(&mut self) -> Result<Option<Event>> {
        loop {
            write_token(&mut self.writer, READY_TOKEN).await?;

            let event = match self.frames.read(&mut self.reader).await? {
                Some(event) => event,
                None => return Ok(None),
            };
            self.frames_read += 1;

            write_token(&mut self.writer, OK_TOKEN).await?;

            match self.filter.check(&event) {
                Ok(()) => {
                    self.frames_accepted += 1;
                    return Ok(Some(event));
                }
                Err(rejection) => {
                    tracing::debug!(
                        "Skipping {:?} event {} for process {}",
                        rejection,
                        event.event_name().unwrap_or("<none>"),
                        event.process_name().unwrap_or("<none>")
                    );
                }
            }
        }
    }

    /// Consume the listener and return its streams.
    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}
