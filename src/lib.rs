//! clamd-client - Async client for the ClamAV daemon.
//!
//! This library speaks clamd's line-oriented control protocol over TCP or a
//! UNIX domain socket: liveness checks, signature database reloads, path
//! scans, in-stream scans of raw byte sources, and statistics queries.
//!
//! # Architecture
//!
//! The protocol is one-shot: every request dials a fresh connection, writes
//! a single newline-terminated command, and reads the reply until the
//! daemon closes the connection.
//!
//! Key design principles:
//!
//! - A [`Clamd`] holds only immutable configuration plus a request guard;
//!   connection state lives in a per-request session, never on the client
//! - Replies are classified by an ordered table of terminal suffix tokens
//! - An infection (`FOUND`) is a normal [`ScanOutcome`], not an error
//! - One deadline per request, covering connect, write, and read
//!
//! # Quick Start
//!
//! ```no_run
//! use clamd_client::{Clamd, Result, ScanOutcome};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Defaults to the UNIX socket at /var/run/clamav/clamd.ctl
//!     let clamd = Clamd::builder().tcp("127.0.0.1", 3310).build()?;
//!
//!     println!("daemon: {}", clamd.version().await?);
//!
//!     match clamd.scan("/srv/uploads/invoice.pdf").await? {
//!         ScanOutcome::Clean => println!("clean"),
//!         ScanOutcome::Infected => println!("infected"),
//!     }
//!
//!     // Scan bytes that never touch the daemon's filesystem
//!     let body: &[u8] = b"attachment bytes";
//!     let outcome = clamd.scan_stream(body).await?;
//!     println!("stream clean: {}", outcome.is_clean());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | High-level client: [`Clamd`], [`ClamdBuilder`] |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`protocol`] | Command framing, reply tokens, INSTREAM upload (internal) |
//! | [`stats`] | STATS report parsing: [`Stats`] and friends |
//! | [`transport`] | One-shot socket sessions (internal) |

// ============================================================================
// Modules
// ============================================================================

/// High-level daemon client.
///
/// Use [`Clamd::builder()`] to create a configured client instance.
pub mod client;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// clamd wire protocol.
///
/// Internal module defining command framing and reply classification.
pub mod protocol;

/// STATS report parsing.
///
/// Turns the daemon's semi-structured status report into a typed record.
pub mod stats;

/// Socket transport layer.
///
/// Internal module handling one-shot connections to the daemon.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Client types
pub use client::{Clamd, ClamdBuilder};

// Error types
pub use error::{Error, Result};

// Protocol types
pub use protocol::ScanOutcome;

// Stats types
pub use stats::{MemStats, QueueStats, Stats, ThreadStats};

// Transport types
pub use transport::Endpoint;
