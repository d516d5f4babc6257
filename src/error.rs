//! Error types for the clamd client.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use clamd_client::{Clamd, Result};
//!
//! async fn example(clamd: &Clamd) -> Result<()> {
//!     let alive = clamd.ping().await?;
//!     assert!(alive);
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Transport | [`Error::Connect`], [`Error::Write`], [`Error::Read`], [`Error::Timeout`] |
//! | Request | [`Error::EmptySource`], [`Error::InvalidResponse`] |
//! | Daemon-reported | [`Error::NoSuchFileOrDir`], [`Error::PermissionDenied`], [`Error::CantOpenFile`] |
//! | Stream upload | [`Error::StreamLimitExceeded`] |
//! | Diagnostics | [`Error::Unknown`], [`Error::Parse`] |
//!
//! A `FOUND` reply is **not** an error: scan operations report an infection
//! as a normal negative outcome, never through this enum.

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Variants that originate in a daemon reply carry the raw reply text so a
/// failure can be diagnosed without re-running the request.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Transport Errors
    // ========================================================================
    /// Dialing the daemon failed.
    ///
    /// Returned when the TCP or UNIX socket connection cannot be established.
    #[error("failed to connect to clamd: {message}")]
    Connect {
        /// Description of the connection failure.
        message: String,
    },

    /// Writing a command or chunk to the daemon failed.
    #[error("failed to write to clamd: {message}")]
    Write {
        /// Description of the write failure.
        message: String,
    },

    /// Reading the daemon reply failed.
    #[error("failed to read clamd response: {message}")]
    Read {
        /// Description of the read failure.
        message: String,
    },

    /// The per-request deadline fired.
    ///
    /// Returned when connect, write, or read does not complete within the
    /// client timeout.
    #[error("clamd {operation} timed out after {timeout_ms}ms")]
    Timeout {
        /// The operation that timed out (connect, write, read).
        operation: &'static str,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // Request Errors
    // ========================================================================
    /// The caller passed an empty scan path.
    ///
    /// Checked before any I/O takes place.
    #[error("scan source is empty")]
    EmptySource,

    /// The daemon reply does not match any recognized token for the command.
    #[error("invalid response from clamd: {response}")]
    InvalidResponse {
        /// The raw daemon reply.
        response: String,
    },

    // ========================================================================
    // Daemon-Reported Path Errors
    // ========================================================================
    /// The daemon cannot find the file or directory.
    #[error("clamd can't find file or directory: {response}")]
    NoSuchFileOrDir {
        /// The raw daemon reply.
        response: String,
    },

    /// The daemon was denied access to the file or directory.
    #[error("clamd can't open file or dir, permission denied: {response}")]
    PermissionDenied {
        /// The raw daemon reply.
        response: String,
    },

    /// The daemon cannot open the file or directory.
    #[error("clamd can't open file or directory: {response}")]
    CantOpenFile {
        /// The raw daemon reply.
        response: String,
    },

    // ========================================================================
    // Stream Upload Errors
    // ========================================================================
    /// The daemon closed the connection mid-upload.
    ///
    /// clamd enforces `StreamMaxLength` and drops the connection when an
    /// INSTREAM upload exceeds it. Distinguished from a generic I/O failure
    /// so callers can tell "rejected for size" from "network failure".
    #[error("clamd INSTREAM size limit exceeded")]
    StreamLimitExceeded,

    // ========================================================================
    // Diagnostic Errors
    // ========================================================================
    /// The daemon reply ends in no recognized terminal token.
    #[error("unknown response from clamd: {response}")]
    Unknown {
        /// The raw daemon reply, preserved for diagnostics.
        response: String,
    },

    /// A recognized STATS field failed numeric parsing.
    ///
    /// The whole parse fails; partial records are never returned.
    #[error("malformed stats field in line {line:?}: {message}")]
    Parse {
        /// The offending report line.
        line: String,
        /// Description of the parse failure.
        message: String,
    },
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a connect error.
    #[inline]
    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect {
            message: message.into(),
        }
    }

    /// Creates a write error.
    #[inline]
    pub fn write(message: impl Into<String>) -> Self {
        Self::Write {
            message: message.into(),
        }
    }

    /// Creates a read error.
    #[inline]
    pub fn read(message: impl Into<String>) -> Self {
        Self::Read {
            message: message.into(),
        }
    }

    /// Creates a timeout error.
    #[inline]
    pub fn timeout(operation: &'static str, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation,
            timeout_ms,
        }
    }

    /// Creates an invalid response error.
    #[inline]
    pub fn invalid_response(response: impl Into<String>) -> Self {
        Self::InvalidResponse {
            response: response.into(),
        }
    }

    /// Creates a no-such-file error.
    #[inline]
    pub fn no_such_file_or_dir(response: impl Into<String>) -> Self {
        Self::NoSuchFileOrDir {
            response: response.into(),
        }
    }

    /// Creates a permission denied error.
    #[inline]
    pub fn permission_denied(response: impl Into<String>) -> Self {
        Self::PermissionDenied {
            response: response.into(),
        }
    }

    /// Creates a can't-open-file error.
    #[inline]
    pub fn cant_open_file(response: impl Into<String>) -> Self {
        Self::CantOpenFile {
            response: response.into(),
        }
    }

    /// Creates an unknown response error.
    #[inline]
    pub fn unknown(response: impl Into<String>) -> Self {
        Self::Unknown {
            response: response.into(),
        }
    }

    /// Creates a stats parse error.
    #[inline]
    pub fn parse(line: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            line: line.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns `true` if this is a transport-level error.
    #[inline]
    #[must_use]
    pub const fn is_transport_error(&self) -> bool {
        matches!(
            self,
            Self::Connect { .. } | Self::Write { .. } | Self::Read { .. } | Self::Timeout { .. }
        )
    }

    /// Returns `true` if the daemon reported a path problem.
    #[inline]
    #[must_use]
    pub const fn is_path_error(&self) -> bool {
        matches!(
            self,
            Self::NoSuchFileOrDir { .. } | Self::PermissionDenied { .. } | Self::CantOpenFile { .. }
        )
    }

    /// Returns the raw daemon reply attached to this error, if any.
    #[must_use]
    pub fn response(&self) -> Option<&str> {
        match self {
            Self::InvalidResponse { response }
            | Self::NoSuchFileOrDir { response }
            | Self::PermissionDenied { response }
            | Self::CantOpenFile { response }
            | Self::Unknown { response } => Some(response),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
