//! Error types for logstash-notifier.

use thiserror::Error;

/// Main error type for all notifier operations.
#[derive(Debug, Error)]
pub enum NotifierError {
    /// I/O error on the supervisor streams.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error while building a log record.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Header line did not end within the reader's limit.
    #[error("Frame header exceeds maximum {max} bytes without a newline")]
    HeaderTooLarge { max: usize },

    /// Frame header has no `len` field.
    #[error("Frame header is missing the `len` field")]
    MissingLength,

    /// Frame header `len` is not a non-negative decimal integer.
    #[error("Frame header has an invalid `len` field: {0:?}")]
    InvalidLength(String),

    /// Declared body length exceeds the reader's limit.
    #[error("Frame body of {len} bytes exceeds maximum {max}")]
    BodyTooLarge { len: usize, max: usize },

    /// Input ended before the declared body length was read.
    #[error("Stream ended after {received} of {expected} body bytes")]
    TruncatedStream { expected: usize, received: usize },

    /// Collector transport failure (connect or send).
    #[error("Transport error: {0}")]
    Transport(String),

    /// Missing or malformed configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl NotifierError {
    /// Whether this error desynchronizes the supervisor stream.
    ///
    /// After a framing error the start of the next frame is unknown, so the
    /// listener cannot continue.
    pub fn is_framing(&self) -> bool {
        matches!(
            self,
            NotifierError::HeaderTooLarge { .. }
                | NotifierError::MissingLength
                | NotifierError::InvalidLength(_)
                | NotifierError::BodyTooLarge { .. }
                | NotifierError::TruncatedStream { .. }
        )
    }
}

/// Result type alias using NotifierError.
pub type Result<T> = std::result::Result<T, NotifierError>;
