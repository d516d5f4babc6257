//! One-shot connection to the daemon.
//!
//! clamd serves exactly one request per connection and signals the end of
//! its reply by closing the socket, so a [`Session`] is scoped to a single
//! request/response exchange: opened fresh, written once (plus chunk frames
//! for stream uploads), read until EOF, then dropped.
//!
//! The deadline is computed once in [`Session::open`] and threaded through
//! connect, every write, and the final read.

// ============================================================================
// Imports
// ============================================================================

use std::io;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
#[cfg(unix)]
use tokio::net::UnixStream;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::transport::Endpoint;

// ============================================================================
// Stream
// ============================================================================

/// Underlying socket, TCP or UNIX.
#[derive(Debug)]
enum Stream {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(UnixStream),
}

// ============================================================================
// Session
// ============================================================================

/// A single connection owned exclusively for one request.
///
/// The socket is closed when the session is dropped, on success or failure.
#[derive(Debug)]
pub struct Session {
    /// The connected socket.
    stream: Stream,
    /// Absolute deadline covering all I/O on this session.
    deadline: Instant,
    /// Original timeout in milliseconds, kept for error context.
    timeout_ms: u64,
}

impl Session {
    /// Dials the endpoint and returns a session bound to a fresh deadline.
    ///
    /// # Errors
    ///
    /// - [`Error::Timeout`] if the dial does not complete within `timeout`
    /// - [`Error::Connect`] if the dial fails
    pub async fn open(endpoint: &Endpoint, timeout: Duration) -> Result<Self> {
        let deadline = Instant::now() + timeout;
        let timeout_ms = timeout.as_millis() as u64;

        let stream = match endpoint {
            Endpoint::Tcp { host, port } => {
                let stream = timeout_at(deadline, TcpStream::connect((host.as_str(), *port)))
                    .await
                    .map_err(|_| Error::timeout("connect", timeout_ms))?
                    .map_err(|e| Error::connect(e.to_string()))?;
                Stream::Tcp(stream)
            }

            #[cfg(unix)]
            Endpoint::Unix { path } => {
                let stream = timeout_at(deadline, UnixStream::connect(path))
                    .await
                    .map_err(|_| Error::timeout("connect", timeout_ms))?
                    .map_err(|e| Error::connect(e.to_string()))?;
                Stream::Unix(stream)
            }

            #[cfg(not(unix))]
            Endpoint::Unix { .. } => {
                return Err(Error::connect(
                    "UNIX socket endpoints are not supported on this platform",
                ));
            }
        };

        debug!(%endpoint, timeout_ms, "session opened");

        Ok(Self {
            stream,
            deadline,
            timeout_ms,
        })
    }

    /// Writes all bytes, surfacing raw I/O errors.
    ///
    /// A deadline hit is reported as [`io::ErrorKind::TimedOut`] so callers
    /// that classify error kinds (the stream upload loop) see one scheme.
    pub(crate) async fn write_raw(&mut self, buf: &[u8]) -> io::Result<()> {
        let deadline = self.deadline;
        let write = async {
            match &mut self.stream {
                Stream::Tcp(s) => s.write_all(buf).await,
                #[cfg(unix)]
                Stream::Unix(s) => s.write_all(buf).await,
            }
        };

        match timeout_at(deadline, write).await {
            Ok(res) => res,
            Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "deadline elapsed")),
        }
    }

    /// Writes all bytes within the session deadline.
    ///
    /// # Errors
    ///
    /// - [`Error::Timeout`] if the deadline fires mid-write
    /// - [`Error::Write`] on any other I/O failure
    pub async fn send(&mut self, buf: &[u8]) -> Result<()> {
        let timeout_ms = self.timeout_ms;
        self.write_raw(buf).await.map_err(|e| {
            if e.kind() == io::ErrorKind::TimedOut {
                Error::timeout("write", timeout_ms)
            } else {
                Error::write(e.to_string())
            }
        })?;

        trace!(len = buf.len(), "bytes sent");
        Ok(())
    }

    /// Reads until the daemon closes the connection.
    ///
    /// Returns the reply as text with a single trailing newline stripped;
    /// the newline is insignificant in the protocol.
    ///
    /// # Errors
    ///
    /// - [`Error::Timeout`] if the deadline fires before EOF
    /// - [`Error::Read`] on any other I/O failure
    pub async fn read_reply(&mut self) -> Result<String> {
        let deadline = self.deadline;
        let timeout_ms = self.timeout_ms;
        let mut buf = Vec::new();

        let read = async {
            match &mut self.stream {
                Stream::Tcp(s) => s.read_to_end(&mut buf).await,
                #[cfg(unix)]
                Stream::Unix(s) => s.read_to_end(&mut buf).await,
            }
        };

        match timeout_at(deadline, read).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(Error::read(e.to_string())),
            Err(_) => return Err(Error::timeout("read", timeout_ms)),
        }

        let mut reply = String::from_utf8_lossy(&buf).into_owned();
        if reply.ends_with('\n') {
            reply.pop();
        }

        trace!(len = reply.len(), "reply received");
        Ok(reply)
    }

    /// Milliseconds budgeted for this session, for error context.
    #[inline]
    #[must_use]
    pub(crate) const fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }
}

// ============================================================================
// Tests
// ============================================================================
