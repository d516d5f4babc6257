//! Builder pattern for client configuration.
//!
//! Provides a fluent API for configuring and creating [`Clamd`] instances.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use clamd_client::Clamd;
//!
//! # fn example() -> clamd_client::Result<()> {
//! let clamd = Clamd::builder()
//!     .tcp("127.0.0.1", 3310)
//!     .timeout(Duration::from_secs(30))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::transport::Endpoint;

use super::Clamd;

// ============================================================================
// Defaults
// ============================================================================

/// Default UNIX socket path used by Debian-family clamd packages.
pub const DEFAULT_UNIX_SOCKET: &str = "/var/run/clamav/clamd.ctl";

/// Default TCP host.
pub const DEFAULT_TCP_HOST: &str = "127.0.0.1";

/// Default clamd TCP port.
pub const DEFAULT_TCP_PORT: u16 = 3310;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

// ============================================================================
// ClamdBuilder
// ============================================================================

/// Builder for configuring a [`Clamd`] instance.
///
/// Defaults to the UNIX socket at [`DEFAULT_UNIX_SOCKET`] with a 60 second
/// per-request timeout. Use [`Clamd::builder()`] to create a new builder.
#[derive(Debug, Clone)]
pub struct ClamdBuilder {
    /// Where to dial the daemon.
    endpoint: Endpoint,
    /// Per-request deadline covering connect, write, and read.
    timeout: Duration,
}

impl Default for ClamdBuilder {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::unix(DEFAULT_UNIX_SOCKET),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

// ============================================================================
// ClamdBuilder Implementation
// ============================================================================

impl ClamdBuilder {
    /// Creates a new builder with default configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Dials the daemon over TCP at the given host and port.
    #[inline]
    #[must_use]
    pub fn tcp(mut self, host: impl Into<String>, port: u16) -> Self {
        self.endpoint = Endpoint::tcp(host, port);
        self
    }

    /// Dials the daemon over TCP at the default address
    /// ([`DEFAULT_TCP_HOST`]:[`DEFAULT_TCP_PORT`]).
    #[inline]
    #[must_use]
    pub fn tcp_default(mut self) -> Self {
        self.endpoint = Endpoint::tcp(DEFAULT_TCP_HOST, DEFAULT_TCP_PORT);
        self
    }

    /// Dials the daemon over a UNIX domain socket at the given path.
    #[inline]
    #[must_use]
    pub fn unix(mut self, path: impl Into<PathBuf>) -> Self {
        self.endpoint = Endpoint::unix(path);
        self
    }

    /// Sets the endpoint directly.
    #[inline]
    #[must_use]
    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Sets the per-request timeout.
    ///
    /// The timeout is a single deadline per request: it covers the dial,
    /// the command write, and reading the full reply.
    #[inline]
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the client with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::Connect`] if the endpoint or timeout is unusable
    pub fn build(self) -> Result<Clamd> {
        if let Endpoint::Tcp { host, .. } = &self.endpoint
            && host.is_empty()
        {
            return Err(Error::connect("TCP host must not be empty"));
        }

        if self.timeout.is_zero() {
            return Err(Error::connect("timeout must be greater than zero"));
        }

        Ok(Clamd::new(self.endpoint, self.timeout))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unix_socket() {
        let builder = ClamdBuilder::new();
        assert_eq!(builder.endpoint, Endpoint::unix(DEFAULT_UNIX_SOCKET));
        assert_eq!(builder.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_tcp_sets_endpoint() {
        let builder = ClamdBuilder::new().tcp("scanner.internal", 3311);
        assert_eq!(builder.endpoint, Endpoint::tcp("scanner.internal", 3311));
    }

    #[test]
    fn test_tcp_default_address() {
        let builder = ClamdBuilder::new().tcp_default();
        assert_eq!(
            builder.endpoint,
            Endpoint::tcp(DEFAULT_TCP_HOST, DEFAULT_TCP_PORT)
        );
    }

    #[test]
    fn test_unix_sets_endpoint() {
        let builder = ClamdBuilder::new().unix("/run/clamd.sock");
        assert_eq!(builder.endpoint, Endpoint::unix("/run/clamd.sock"));
    }

    #[test]
    fn test_build_default_succeeds() {
        let clamd = ClamdBuilder::new().build().unwrap();
        assert_eq!(clamd.endpoint(), &Endpoint::unix(DEFAULT_UNIX_SOCKET));
        assert_eq!(clamd.timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_build_rejects_empty_host() {
        let result = ClamdBuilder::new().tcp("", 3310).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_build_rejects_zero_timeout() {
        let result = ClamdBuilder::new().timeout(Duration::ZERO).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_is_clone() {
        let builder = ClamdBuilder::new().tcp("127.0.0.1", 3310);
        let cloned = builder.clone();
        assert_eq!(builder.endpoint, cloned.endpoint);
    }
}
