//! Reply tokens and scan classification.
//!
//! clamd replies are free-form text that ends in one of a fixed vocabulary
//! of terminal tokens. Classification is a suffix match against an ordered
//! table: a verbose reply line can mention several tokens, so the table is
//! checked in priority order and only the terminal suffix decides.
//!
//! An infection (`FOUND`) is a normal negative outcome, not an error.

// ============================================================================
// Imports
// ============================================================================

use crate::error::{Error, Result};

// ============================================================================
// Terminal Tokens
// ============================================================================

/// Reply to a successful scan.
pub const RES_OK: &str = "OK";

/// Reply terminal when an infection was detected.
pub const RES_FOUND: &str = "FOUND";

/// Reply to `PING`.
pub const RES_PONG: &str = "PONG";

/// Reply to `RELOAD`.
pub const RES_RELOADING: &str = "RELOADING";

/// Daemon-reported missing path.
pub const RES_NO_SUCH_FILE: &str = "No such file or directory. ERROR";

/// Daemon-reported access failure.
pub const RES_PERMISSION_DENIED: &str = "Permission denied. ERROR";

/// Daemon-reported open failure.
pub const RES_CANT_OPEN_FILE: &str = "Can't open file or directory ERROR";

// ============================================================================
// ScanOutcome
// ============================================================================

/// Outcome of a scan request that reached a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// No infection detected.
    Clean,
    /// An infection was detected.
    Infected,
}

impl ScanOutcome {
    /// Returns `true` if no infection was detected.
    #[inline]
    #[must_use]
    pub const fn is_clean(self) -> bool {
        matches!(self, Self::Clean)
    }
}

// ============================================================================
// Classification
// ============================================================================

/// Classifies a scan-style reply by its terminal suffix.
///
/// The order is significant and must match the daemon's token priority:
/// verdict tokens first, then the daemon-reported path errors.
///
/// # Errors
///
/// - [`Error::NoSuchFileOrDir`], [`Error::PermissionDenied`],
///   [`Error::CantOpenFile`] for daemon-reported path problems
/// - [`Error::Unknown`] for any unrecognized terminal, raw reply attached
pub fn classify_scan(reply: &str) -> Result<ScanOutcome> {
    if reply.ends_with(RES_OK) {
        return Ok(ScanOutcome::Clean);
    }
    if reply.ends_with(RES_FOUND) {
        return Ok(ScanOutcome::Infected);
    }
    if reply.ends_with(RES_NO_SUCH_FILE) {
        return Err(Error::no_such_file_or_dir(reply));
    }
    if reply.ends_with(RES_PERMISSION_DENIED) {
        return Err(Error::permission_denied(reply));
    }
    if reply.ends_with(RES_CANT_OPEN_FILE) {
        return Err(Error::cant_open_file(reply));
    }

    Err(Error::unknown(reply))
}

// ============================================================================
// Tests
// ============================================================================
