//! Socket transport layer.
//!
//! This module handles the one-shot connection model of the clamd protocol:
//! every request dials a fresh connection, writes one command, reads the
//! reply until the daemon closes the connection, and releases the socket.
//!
//! # Connection Lifecycle
//!
//! 1. [`Session::open`] - Dial the [`Endpoint`] within the deadline
//! 2. [`Session::send`] - Write the framed command bytes
//! 3. [`Session::read_reply`] - Read until EOF, trim the trailing newline
//! 4. Drop - The socket is closed when the session goes out of scope
//!
//! The deadline is fixed when the session is opened and covers connect,
//! every write, and the final read.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `session` | One connection scoped to a single request/response exchange |

// ============================================================================
// Submodules
// ============================================================================

/// One-shot connection scoped to a single request.
pub mod session;

// ============================================================================
// Re-exports
// ============================================================================

pub use session::Session;

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::path::PathBuf;

// ============================================================================
// Endpoint
// ============================================================================

/// Where the daemon listens.
///
/// Immutable after client construction; every request dials it afresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// TCP endpoint (host and port).
    Tcp {
        /// Hostname or IP address.
        host: String,
        /// TCP port (clamd default is 3310).
        port: u16,
    },

    /// UNIX domain socket path.
    Unix {
        /// Filesystem path of the socket.
        path: PathBuf,
    },
}

impl Endpoint {
    /// Creates a TCP endpoint.
    #[inline]
    #[must_use]
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self::Tcp {
            host: host.into(),
            port,
        }
    }

    /// Creates a UNIX socket endpoint.
    #[inline]
    #[must_use]
    pub fn unix(path: impl Into<PathBuf>) -> Self {
        Self::Unix { path: path.into() }
    }

    /// Returns `true` if this is a TCP endpoint.
    #[inline]
    #[must_use]
    pub const fn is_tcp(&self) -> bool {
        matches!(self, Self::Tcp { .. })
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp { host, port } => write!(f, "tcp://{host}:{port}"),
            Self::Unix { path } => write!(f, "unix://{}", path.display()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
