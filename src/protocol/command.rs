//! Command definitions and wire framing.
//!
//! Every command is sent on a fresh connection as
//! `<marker><NAME>[ <argument>]\n` where the marker byte `n` selects
//! newline-delimited replies for the session.
//!
//! # Commands
//!
//! | Command | Wire form | Reply |
//! |---------|-----------|-------|
//! | [`Command::Ping`] | `nPING\n` | `PONG` |
//! | [`Command::Version`] | `nVERSION\n` | free-form version string |
//! | [`Command::Reload`] | `nRELOAD\n` | `RELOADING` |
//! | [`Command::Shutdown`] | `nSHUTDOWN\n` | `SHUTDOWN` or connection close |
//! | [`Command::Scan`] | `nSCAN <path>\n` | scan token set |
//! | [`Command::ContScan`] | `nCONTSCAN <path>\n` | scan token set |
//! | [`Command::Instream`] | `nINSTREAM\n` | chunk stream, then scan token set |
//! | [`Command::Stats`] | `nSTATS\n` | multi-line report |

// ============================================================================
// Constants
// ============================================================================

/// Session-initiation marker selecting newline-delimited replies.
const SESSION_MARKER: char = 'n';

// ============================================================================
// Command
// ============================================================================

/// All protocol commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Liveness probe.
    Ping,
    /// Query the daemon and signature database version.
    Version,
    /// Reload the signature databases.
    Reload,
    /// Stop the daemon cleanly.
    Shutdown,
    /// Scan a file or directory by path; stops at the first detection.
    Scan(String),
    /// Scan a file or directory by path; continues past detections.
    ContScan(String),
    /// Scan a byte stream uploaded in length-prefixed chunks.
    Instream,
    /// Query scan queue and memory statistics.
    Stats,
}

impl Command {
    /// Returns the command line without marker or terminator.
    #[must_use]
    fn line(&self) -> String {
        match self {
            Self::Ping => "PING".to_string(),
            Self::Version => "VERSION".to_string(),
            Self::Reload => "RELOAD".to_string(),
            Self::Shutdown => "SHUTDOWN".to_string(),
            Self::Scan(path) => format!("SCAN {path}"),
            Self::ContScan(path) => format!("CONTSCAN {path}"),
            Self::Instream => "INSTREAM".to_string(),
            Self::Stats => "STATS".to_string(),
        }
    }

    /// Encodes the command for the wire: marker byte, line, newline.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        format!("{SESSION_MARKER}{}\n", self.line()).into_bytes()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_ping() {
        assert_eq!(Command::Ping.encode(), b"nPING\n");
    }

    #[test]
    fn test_encode_scan_carries_path() {
        let cmd = Command::Scan("/tmp/upload.bin".to_string());
        assert_eq!(cmd.encode(), b"nSCAN /tmp/upload.bin\n");
    }

    #[test]
    fn test_encode_contscan_carries_path() {
        let cmd = Command::ContScan("/srv/mail".to_string());
        assert_eq!(cmd.encode(), b"nCONTSCAN /srv/mail\n");
    }

    #[test]
    fn test_encode_simple_commands() {
        assert_eq!(Command::Version.encode(), b"nVERSION\n");
        assert_eq!(Command::Reload.encode(), b"nRELOAD\n");
        assert_eq!(Command::Shutdown.encode(), b"nSHUTDOWN\n");
        assert_eq!(Command::Instream.encode(), b"nINSTREAM\n");
        assert_eq!(Command::Stats.encode(), b"nSTATS\n");
    }
}
