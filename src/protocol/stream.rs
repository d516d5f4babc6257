//! INSTREAM chunked upload sub-protocol.
//!
//! After the `INSTREAM` command, the scan payload is uploaded as frames of
//! a 4-byte big-endian unsigned length followed by that many raw bytes. A
//! zero-length frame terminates the stream; the daemon then replies with
//! the usual scan token set.
//!
//! The daemon enforces `StreamMaxLength` and closes the connection when an
//! upload exceeds it, so a peer-closed write failure mid-upload is reported
//! as [`Error::StreamLimitExceeded`] rather than a generic I/O error.

// ============================================================================
// Imports
// ============================================================================

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::transport::Session;

// ============================================================================
// Constants
// ============================================================================

/// Bytes read from the source per chunk frame.
pub const CHUNK_SIZE: usize = 1024;

// ============================================================================
// Upload
// ============================================================================

/// Uploads a byte source as chunk frames, ending with the terminator frame.
///
/// The source is consumed once and never rewound. A zero-length source
/// still produces exactly one terminator frame. Each loop iteration awaits
/// the source read and the socket write, so a caller dropping the future
/// cancels promptly at either point.
///
/// # Errors
///
/// - [`Error::StreamLimitExceeded`] if the daemon closes the connection
/// - [`Error::Read`] if the byte source fails
/// - [`Error::Write`] / [`Error::Timeout`] on other transport failures
pub(crate) async fn upload<R>(session: &mut Session, source: &mut R) -> Result<()>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut chunk = [0u8; CHUNK_SIZE];
    let mut total: u64 = 0;

    loop {
        let n = source
            .read(&mut chunk)
            .await
            .map_err(|e| Error::read(format!("stream source: {e}")))?;
        if n == 0 {
            break;
        }

        send_frame(session, &chunk[..n]).await?;
        total += n as u64;
        trace!(len = n, total, "chunk sent");
    }

    // Zero-length frame signals end of stream.
    send_frame(session, &[]).await?;
    debug!(total, "stream upload complete");

    Ok(())
}

/// Writes one length-prefixed frame.
async fn send_frame(session: &mut Session, payload: &[u8]) -> Result<()> {
    let mut frame = Vec::with_capacity(4 + payload.len());
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    frame.extend_from_slice(payload);

    let timeout_ms = session.timeout_ms();
    session
        .write_raw(&frame)
        .await
        .map_err(|e| classify_write_error(&e, timeout_ms))
}

/// Maps a chunk-write failure onto the error taxonomy.
///
/// Peer-closed kinds mean the daemon dropped the connection, which during
/// an upload is its size-limit rejection.
fn classify_write_error(err: &io::Error, timeout_ms: u64) -> Error {
    match err.kind() {
        io::ErrorKind::TimedOut => Error::timeout("write", timeout_ms),
        io::ErrorKind::BrokenPipe
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::NotConnected
        | io::ErrorKind::UnexpectedEof
        | io::ErrorKind::WriteZero => Error::StreamLimitExceeded,
        _ => Error::write(err.to_string()),
    }
}

// ============================================================================
// Tests
// ============================================================================
