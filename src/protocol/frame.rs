//! Length-framed event reader.
//!
//! Each supervisor notification is a header line followed by exactly `len`
//! bytes of body:
//!
//! ```text
//! ver:3.0 server:supervisor serial:21 pool:logstash poolserial:10 eventname:PROCESS_STATE_EXITED len:71\n
//! processname:cat groupname:cat from_state:RUNNING expected:0 pid:2766
//! ```
//!
//! The body is read with short reads retried until the declared count is
//! reached. Any framing error is final: once the length is unknown or wrong
//! there is no way to find the start of the next frame.
//!
//! # Example
//!
//! ```
//! use logstash_notifier::protocol::read_frame;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let mut input: &[u8] = b"a:1 b:2 c:3 len:14\nalphabet:abcde";
//! let event = read_frame(&mut input).await.unwrap().unwrap();
//!
//! assert_eq!(event.headers["len"], "14");
//! assert_eq!(event.body["alphabet"], "abcde");
//! # });
//! ```

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use super::keyvals::{decode_keyvals, KeyValues};
use super::payload::split_payload;
use crate::error::{NotifierError, Result};

/// Header key carrying the body length.
pub const LEN_KEY: &str = "len";

/// Header key carrying the event name.
pub const EVENTNAME_KEY: &str = "eventname";

/// Body key carrying the name of the process the event is about.
pub const PROCESSNAME_KEY: &str = "processname";

/// Default maximum body size (16 MB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 16 * 1024 * 1024;

/// Default maximum header line size, newline included (64 KB).
pub const DEFAULT_MAX_HEADER_SIZE: usize = 64 * 1024;

/// One decoded supervisor notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Event {
    /// Header line pairs; always contains `len`.
    pub headers: KeyValues,
    /// Pairs from the first line of the body.
    pub body: KeyValues,
    /// Body text after its first newline.
    pub data: String,
}

impl Event {
    /// Create an event from its parts.
    pub fn new(headers: KeyValues, body: KeyValues, data: String) -> Self {
        Self {
            headers,
            body,
            data,
        }
    }

    /// The `eventname` header, e.g. `PROCESS_STATE_RUNNING`.
    #[inline]
    pub fn event_name(&self) -> Option<&str> {
        self.headers.get(EVENTNAME_KEY).map(String::as_str)
    }

    /// The `processname` body field.
    #[inline]
    pub fn process_name(&self) -> Option<&str> {
        self.body.get(PROCESSNAME_KEY).map(String::as_str)
    }

    /// The supervisor's event serial number.
    #[inline]
    pub fn serial(&self) -> Option<&str> {
        self.headers.get("serial").map(String::as_str)
    }
}

/// Reads one frame at a time from a buffered stream.
#[derive(Debug, Clone)]
pub struct FrameReader {
    max_header_size: usize,
    max_body_size: usize,
}

impl FrameReader {
    /// Create a frame reader with the default body limit.
    pub fn new() -> Self {
        Self {
            max_header_size: DEFAULT_MAX_HEADER_SIZE,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }

    /// Create a frame reader with a custom body limit.
    pub fn with_max_body(max_body_size: usize) -> Self {
        Self {
            max_body_size,
            ..Self::new()
        }
    }

    /// Set the header line limit.
    pub fn max_header(mut self, max_header_size: usize) -> Self {
        self.max_header_size = max_header_size;
        self
    }

    /// Read the next frame.
    ///
    /// Returns `Ok(None)` when the stream is at end of input before the
    /// header line.
    ///
    /// # Errors
    ///
    /// - [`NotifierError::HeaderTooLarge`] if no newline within the header limit
    /// - [`NotifierError::MissingLength`] if the header has no `len`
    /// - [`NotifierError::InvalidLength`] if `len` is not a non-negative integer
    /// - [`NotifierError::BodyTooLarge`] if `len` exceeds the limit
    /// - [`NotifierError::TruncatedStream`] if input ends inside the body
    pub async fn read<R>(&self, reader: &mut R) -> Result<Option<Event>>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut line = Vec::new();
        let n = (&mut *reader)
            .take(self.max_header_size as u64)
            .read_until(b'\n', &mut line)
            .await?;
        if n == 0 {
            return Ok(None);
        }
        if n >= self.max_header_size && line.last() != Some(&b'\n') {
            return Err(NotifierError::HeaderTooLarge {
                max: self.max_header_size,
            });
        }
        let headers = decode_keyvals(&String::from_utf8_lossy(&line));

        let len = self.body_length(&headers)?;
        let payload = read_body(reader, len).await?;
        let (body, data) = split_payload(&String::from_utf8_lossy(&payload));

        Ok(Some(Event::new(headers, body, data)))
    }

    fn body_length(&self, headers: &KeyValues) -> Result<usize> {
        let raw = headers.get(LEN_KEY).ok_or(NotifierError::MissingLength)?;
        let len: usize = raw
            .parse()
            .map_err(|_| NotifierError::InvalidLength(raw.clone()))?;

        if len > self.max_body_size {
            return Err(NotifierError::BodyTooLarge {
                len,
                max: self.max_body_size,
            });
        }
        Ok(len)
    }
}

impl Default for FrameReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Read exactly `len` bytes, retrying short reads.
async fn read_body<R>(reader: &mut R, len: usize) -> Result<Vec<u8>>
where
    R: AsyncBufRead + Unpin,
{
    let mut payload = vec![0u8; len];
    let mut received = 0;

    while received < len {
        let n = reader.read(&mut payload[received..]).await?;
        if n == 0 {
            return Err(NotifierError::TruncatedStream {
                expected: len,
                received,
            });
        }
        received += n;
    }

    Ok(payload)
}

/// Read the next frame with the default body limit.
///
/// See [`FrameReader::read`].
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<Event>>
where
    R: AsyncBufRead + Unpin,
{
    FrameReader::new().read(reader).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    #[tokio::test]
    async fn test_regular_usage() {
        let mut input: &[u8] = b"a:1 b:2 c:3 len:14\nalphabet:abcde";
        let event = read_frame(&mut input).await.unwrap().unwrap();

        assert_eq!(event.headers, decode_keyvals("a:1 b:2 c:3 len:14"));
        assert_eq!(event.body, decode_keyvals("alphabet:abcde"));
        assert_eq!(event.data, "");
        assert!(input.is_empty());
    }

    #[tokio::test]
    async fn test_missing_length() {
        let mut input: &[u8] = b"a:1 b:2 c:3\nabcdefghijklmnopqrstuvwxyz";
        let err = read_frame(&mut input).await.unwrap_err();
        assert!(matches!(err, NotifierError::MissingLength));
    }

    #[tokio::test]
    async fn test_invalid_length() {
        for bad in ["-1", "abc", "1.5", ""] {
            let line = format!("len:{}\nbody", bad);
            let mut input = line.as_bytes();
            let err = read_frame(&mut input).await.unwrap_err();
            assert!(
                matches!(err, NotifierError::InvalidLength(ref v) if v == bad),
                "unexpected error for {:?}: {}",
                bad,
                err
            );
        }
    }

    #[tokio::test]
    async fn test_truncated_body() {
        let mut input: &[u8] = b"len:20\nprocessname:cat";
        let err = read_frame(&mut input).await.unwrap_err();
        assert!(matches!(
            err,
            NotifierError::TruncatedStream {
                expected: 20,
                received: 15
            }
        ));
    }

    #[tokio::test]
    async fn test_end_of_input() {
        let mut input: &[u8] = b"";
        assert!(read_frame(&mut input).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_zero_length_body() {
        let mut input: &[u8] = b"eventname:TICK_5 len:0\n";
        let event = read_frame(&mut input).await.unwrap().unwrap();
        assert_eq!(event.event_name(), Some("TICK_5"));
        assert!(event.body.is_empty());
        assert!(event.data.is_empty());
    }

    #[tokio::test]
    async fn test_body_with_data() {
        let body = "processname:cat channel:stdout\nhello world\n";
        let frame = format!("eventname:PROCESS_LOG_STDOUT len:{}\n{}", body.len(), body);
        let mut input = frame.as_bytes();

        let event = read_frame(&mut input).await.unwrap().unwrap();
        assert_eq!(event.process_name(), Some("cat"));
        assert_eq!(event.body["channel"], "stdout");
        assert_eq!(event.data, "hello world\n");
    }

    #[tokio::test]
    async fn test_byte_at_a_time() {
        let body = "processname:notepad pid:42";
        let frame = format!("eventname:PROCESS_STATE_RUNNING len:{}\n{}", body.len(), body);
        let mut input = BufReader::with_capacity(1, frame.as_bytes());

        let event = read_frame(&mut input).await.unwrap().unwrap();
        assert_eq!(event.process_name(), Some("notepad"));
        assert_eq!(event.body["pid"], "42");
    }

    #[tokio::test]
    async fn test_reads_only_declared_length() {
        let mut input: &[u8] = b"len:5\nabcdelen:3\nxyz";
        let reader = FrameReader::new();

        let first = reader.read(&mut input).await.unwrap().unwrap();
        assert_eq!(first.headers["len"], "5");
        assert!(first.body.is_empty());

        let second = reader.read(&mut input).await.unwrap().unwrap();
        assert_eq!(second.headers["len"], "3");
        assert!(reader.read(&mut input).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_max_body_validation() {
        let reader = FrameReader::with_max_body(8);
        let mut input: &[u8] = b"len:100\n";

        let err = reader.read(&mut input).await.unwrap_err();
        assert!(matches!(err, NotifierError::BodyTooLarge { len: 100, max: 8 }));
        assert!(err.to_string().contains("exceeds maximum"));
    }

    #[tokio::test]
    async fn test_max_header_validation() {
        let reader = FrameReader::new().max_header(16);
        let mut input: &[u8] = b"ver:3.0 server:supervisor serial:1 len:0\n";

        let err = reader.read(&mut input).await.unwrap_err();
        assert!(matches!(err, NotifierError::HeaderTooLarge { max: 16 }));
        assert!(err.is_framing());
    }

    #[tokio::test]
    async fn test_header_at_limit() {
        let reader = FrameReader::new().max_header(6);
        let mut input: &[u8] = b"len:3\na:1";

        let event = reader.read(&mut input).await.unwrap().unwrap();
        assert_eq!(event.body["a"], "1");
    }

    #[tokio::test]
    async fn test_endless_header_is_bounded() {
        let junk = vec![b'x'; DEFAULT_MAX_HEADER_SIZE * 4];
        let mut input: &[u8] = &junk;

        let err = FrameReader::new().read(&mut input).await.unwrap_err();
        assert!(matches!(err, NotifierError::HeaderTooLarge { .. }));
        assert_eq!(input.len(), DEFAULT_MAX_HEADER_SIZE * 3);
    }

    #[test]
    fn test_event_accessors() {
        let event = Event::new(
            decode_keyvals("eventname:PROCESS_STATE_FATAL serial:7 len:0"),
            decode_keyvals("processname:worker"),
            String::new(),
        );
        assert_eq!(event.event_name(), Some("PROCESS_STATE_FATAL"));
        assert_eq!(event.serial(), Some("7"));
        assert_eq!(event.process_name(), Some("worker"));
        assert_eq!(Event::default().event_name(), None);
    }
}
