//! clamd wire protocol.
//!
//! The daemon speaks a line-oriented text protocol: one newline-terminated
//! command per connection, prefixed by a session-initiation marker byte, and
//! a text reply classified by a fixed vocabulary of terminal suffix tokens.
//! Stream scanning adds a binary sub-protocol of length-prefixed chunks.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | Outgoing command framing (`nPING\n`, `nSCAN <path>\n`, ...) |
//! | `response` | Terminal token table and scan reply classification |
//! | `stream` | INSTREAM chunked upload sub-protocol |

// ============================================================================
// Submodules
// ============================================================================

/// Outgoing command framing.
pub mod command;

/// Reply tokens and suffix classification.
pub mod response;

/// INSTREAM chunked upload sub-protocol.
pub mod stream;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::Command;
pub use response::ScanOutcome;
