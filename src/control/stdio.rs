//! Listener tokens written back to the supervisor.
//!
//! # Important
//!
//! - **stdout**: protocol tokens only
//! - **stderr**: logs, never parsed by the supervisor
//! - **Never use `println!`**: the tokens must be written byte-exact
//!
//! The supervisor keeps a listener in `ACKNOWLEDGED` until it reads
//! [`READY_TOKEN`], and in `BUSY` until it reads a result. This listener
//! never rejects events, so the result is always [`OK_TOKEN`].

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::Result;

/// Written before each frame read: listener is waiting for an event.
pub const READY_TOKEN: &[u8] = b"READY\n";

/// Written after each frame read: event was handled.
pub const OK_TOKEN: &[u8] = b"RESULT 2\nOK";

/// Write a token and flush.
///
/// The supervisor blocks on the token, so it must not sit in a buffer.
///
/// # Errors
///
/// Returns IO error if write or flush fails.
pub async fn write_token<W>(writer: &mut W, token: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(token).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_token() {
        let mut out = Vec::new();
        write_token(&mut out, READY_TOKEN).await.unwrap();
        write_token(&mut out, OK_TOKEN).await.unwrap();
        assert_eq!(out, b"READY\nRESULT 2\nOK");
    }
}
