//! clamd client module.
//!
//! This module provides the main entry point for talking to the daemon.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Clamd`] | High-level client: ping, version, reload, scan, stream scan, stats |
//! | [`ClamdBuilder`] | Fluent configuration builder |
//!
//! # Example
//!
//! ```no_run
//! use clamd_client::{Clamd, Result};
//!
//! # async fn example() -> Result<()> {
//! let clamd = Clamd::builder().tcp("127.0.0.1", 3310).build()?;
//!
//! if clamd.ping().await? {
//!     let outcome = clamd.scan("/srv/uploads/report.pdf").await?;
//!     println!("clean: {}", outcome.is_clean());
//! }
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder pattern for client configuration.
pub mod builder;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::ClamdBuilder;

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use tokio::io::AsyncRead;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::protocol::command::Command;
use crate::protocol::response::{self, RES_PONG, RES_RELOADING, ScanOutcome};
use crate::protocol::stream;
use crate::stats::{self, Stats};
use crate::transport::{Endpoint, Session};

// ============================================================================
// Clamd
// ============================================================================

/// Client for the ClamAV daemon.
///
/// Holds immutable connection configuration; every operation dials a fresh
/// connection, exchanges one request, and closes it. A single client
/// serializes its own requests: a second concurrent call blocks until the
/// first one's session is released. Clients are cheap to construct, so
/// callers that want parallel scans create one client per lane.
///
/// # Thread Safety
///
/// `Clamd` is `Send + Sync` and can be shared behind an `Arc`.
pub struct Clamd {
    /// Where the daemon listens. Immutable after construction.
    endpoint: Endpoint,
    /// Per-request deadline covering connect, write, and read.
    timeout: Duration,
    /// Serializes requests: at most one live session per client.
    guard: Mutex<()>,
}

// ============================================================================
// Construction
// ============================================================================

impl Clamd {
    /// Returns a builder with default configuration.
    #[inline]
    #[must_use]
    pub fn builder() -> ClamdBuilder {
        ClamdBuilder::new()
    }

    /// Creates a client from validated configuration.
    pub(crate) fn new(endpoint: Endpoint, timeout: Duration) -> Self {
        Self {
            endpoint,
            timeout,
            guard: Mutex::new(()),
        }
    }

    /// Returns the configured endpoint.
    #[inline]
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Returns the per-request timeout.
    #[inline]
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

// ============================================================================
// Operations
// ============================================================================

impl Clamd {
    /// Checks that the daemon is up and responsive.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidResponse`] if the reply is not `PONG`
    /// - Transport errors if the exchange fails
    pub async fn ping(&self) -> Result<bool> {
        let _guard = self.guard.lock().await;
        let reply = self.exchange(&Command::Ping).await?;

        if reply == RES_PONG {
            Ok(true)
        } else {
            Err(Error::invalid_response(reply))
        }
    }

    /// Returns the daemon and signature database version string, verbatim.
    ///
    /// # Errors
    ///
    /// Transport errors if the exchange fails.
    pub async fn version(&self) -> Result<String> {
        let _guard = self.guard.lock().await;
        self.exchange(&Command::Version).await
    }

    /// Reloads the daemon's signature databases.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidResponse`] if the reply is not `RELOADING`
    /// - Transport errors if the exchange fails
    pub async fn reload(&self) -> Result<bool> {
        let _guard = self.guard.lock().await;
        let reply = self.exchange(&Command::Reload).await?;

        if reply == RES_RELOADING {
            Ok(true)
        } else {
            Err(Error::invalid_response(reply))
        }
    }

    /// Stops the daemon cleanly.
    ///
    /// The daemon may close the connection without replying, so any
    /// completed exchange counts as success.
    ///
    /// # Errors
    ///
    /// Transport errors if the exchange fails.
    pub async fn shutdown(&self) -> Result<bool> {
        let _guard = self.guard.lock().await;
        self.exchange(&Command::Shutdown).await?;
        Ok(true)
    }

    /// Scans a file or directory (recursively) by path.
    ///
    /// The path is resolved by the daemon, so it must be valid on the
    /// daemon's host and absolute. Scanning stops at the first detection.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptySource`] if `path` is empty, before any I/O
    /// - Daemon-reported path errors, [`Error::Unknown`], transport errors
    pub async fn scan(&self, path: impl AsRef<str>) -> Result<ScanOutcome> {
        self.scan_path(path.as_ref(), Command::Scan).await
    }

    /// Scans a file or directory by path without stopping at detections.
    ///
    /// Same contract as [`Clamd::scan`], using `CONTSCAN`: the daemon keeps
    /// scanning past infected files and reports the aggregate outcome.
    ///
    /// # Errors
    ///
    /// Same as [`Clamd::scan`].
    pub async fn scan_all(&self, path: impl AsRef<str>) -> Result<ScanOutcome> {
        self.scan_path(path.as_ref(), Command::ContScan).await
    }

    /// Scans a byte stream without touching the daemon's filesystem.
    ///
    /// The source is read once, in 1024-byte chunks, and uploaded with the
    /// INSTREAM framing. Useful for network bodies and other data that has
    /// no path on the daemon host.
    ///
    /// # Errors
    ///
    /// - [`Error::StreamLimitExceeded`] if the upload exceeds the daemon's
    ///   `StreamMaxLength` and it drops the connection
    /// - [`Error::Read`] if the byte source fails
    /// - [`Error::Unknown`], transport errors
    pub async fn scan_stream<R>(&self, mut source: R) -> Result<ScanOutcome>
    where
        R: AsyncRead + Unpin,
    {
        let _guard = self.guard.lock().await;

        let mut session = Session::open(&self.endpoint, self.timeout).await?;
        session.send(&Command::Instream.encode()).await?;
        stream::upload(&mut session, &mut source).await?;

        let reply = session.read_reply().await?;
        debug!(%reply, "stream scan reply");
        response::classify_scan(&reply)
    }

    /// Queries scan queue and memory usage statistics.
    ///
    /// # Errors
    ///
    /// - [`Error::Parse`] if a recognized report field is malformed
    /// - Transport errors if the exchange fails
    pub async fn stats(&self) -> Result<Stats> {
        let _guard = self.guard.lock().await;
        let reply = self.exchange(&Command::Stats).await?;
        stats::parse_stats(&reply)
    }
}

// ============================================================================
// Internals
// ============================================================================

impl Clamd {
    /// Shared path-scan implementation for `SCAN` and `CONTSCAN`.
    async fn scan_path(
        &self,
        path: &str,
        command: fn(String) -> Command,
    ) -> Result<ScanOutcome> {
        if path.is_empty() {
            return Err(Error::EmptySource);
        }

        let _guard = self.guard.lock().await;
        let reply = self.exchange(&command(path.to_string())).await?;
        debug!(%reply, "scan reply");
        response::classify_scan(&reply)
    }

    /// One request/response exchange over a fresh session.
    async fn exchange(&self, command: &Command) -> Result<String> {
        let mut session = Session::open(&self.endpoint, self.timeout).await?;
        session.send(&command.encode()).await?;
        session.read_reply().await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
    use tokio::net::{TcpListener, TcpStream};

    /// Client pointed at a mock daemon address.
    fn client_for(addr: SocketAddr) -> Clamd {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        Clamd::builder()
            .tcp(addr.ip().to_string(), addr.port())
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap()
    }

    /// Mock daemon serving one connection: reads the command line, writes
    /// `reply`, closes the connection.
    async fn one_shot_daemon(reply: &'static str) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (peer, _) = listener.accept().await.unwrap();
            let mut reader = BufReader::new(peer);

            let mut line = String::new();
            reader.read_line(&mut line).await.unwrap();

            reader.get_mut().write_all(reply.as_bytes()).await.unwrap();
        });

        addr
    }

    /// Reads INSTREAM frames until the zero terminator.
    async fn read_frames(peer: &mut TcpStream) -> Vec<Vec<u8>> {
        let mut frames = Vec::new();
        loop {
            let mut len = [0u8; 4];
            peer.read_exact(&mut len).await.unwrap();
            let n = u32::from_be_bytes(len) as usize;
            if n == 0 {
                break;
            }

            let mut payload = vec![0u8; n];
            peer.read_exact(&mut payload).await.unwrap();
            frames.push(payload);
        }
        frames
    }

    // ========================================================================
    // Simple command tests
    // ========================================================================

    #[tokio::test]
    async fn test_ping_pong() {
        let addr = one_shot_daemon("PONG\n").await;
        assert!(client_for(addr).ping().await.unwrap());
    }

    #[tokio::test]
    async fn test_ping_rejects_other_reply() {
        let addr = one_shot_daemon("HELLO\n").await;
        let err = client_for(addr).ping().await.unwrap_err();
        assert!(matches!(err, Error::InvalidResponse { .. }));
        assert_eq!(err.response(), Some("HELLO"));
    }

    #[tokio::test]
    async fn test_version_verbatim() {
        let addr = one_shot_daemon("ClamAV 1.3.0/27253/Tue Aug 19 10:31:22 2025\n").await;
        let version = client_for(addr).version().await.unwrap();
        assert_eq!(version, "ClamAV 1.3.0/27253/Tue Aug 19 10:31:22 2025");
    }

    #[tokio::test]
    async fn test_reload() {
        let addr = one_shot_daemon("RELOADING\n").await;
        assert!(client_for(addr).reload().await.unwrap());
    }

    #[tokio::test]
    async fn test_reload_rejects_other_reply() {
        let addr = one_shot_daemon("BUSY\n").await;
        let err = client_for(addr).reload().await.unwrap_err();
        assert!(matches!(err, Error::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_shutdown_accepts_silent_close() {
        // The daemon may close the connection without replying.
        let addr = one_shot_daemon("").await;
        assert!(client_for(addr).shutdown().await.unwrap());
    }

    // ========================================================================
    // Path scan tests
    // ========================================================================

    #[tokio::test]
    async fn test_scan_clean() {
        let addr = one_shot_daemon("/srv/files/ok.txt: OK\n").await;
        let outcome = client_for(addr).scan("/srv/files/ok.txt").await.unwrap();
        assert_eq!(outcome, ScanOutcome::Clean);
    }

    #[tokio::test]
    async fn test_scan_infected_is_not_an_error() {
        let addr = one_shot_daemon("/srv/files/eicar.txt: Win.Test.EICAR_HDB-1 FOUND\n").await;
        let outcome = client_for(addr).scan("/srv/files/eicar.txt").await.unwrap();
        assert_eq!(outcome, ScanOutcome::Infected);
    }

    #[tokio::test]
    async fn test_scan_no_such_file() {
        let addr = one_shot_daemon("/missing: No such file or directory. ERROR\n").await;
        let err = client_for(addr).scan("/missing").await.unwrap_err();
        assert!(matches!(err, Error::NoSuchFileOrDir { .. }));
    }

    #[tokio::test]
    async fn test_scan_empty_path_before_any_io() {
        // Nothing listens on this address; an attempted dial would fail
        // with a connect error rather than EmptySource.
        let clamd = Clamd::builder()
            .tcp("127.0.0.1", 1)
            .timeout(Duration::from_secs(1))
            .build()
            .unwrap();

        assert!(matches!(
            clamd.scan("").await.unwrap_err(),
            Error::EmptySource
        ));
        assert!(matches!(
            clamd.scan_all("").await.unwrap_err(),
            Error::EmptySource
        ));
    }

    #[tokio::test]
    async fn test_scan_all_uses_contscan() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (peer, _) = listener.accept().await.unwrap();
            let mut reader = BufReader::new(peer);

            let mut line = String::new();
            reader.read_line(&mut line).await.unwrap();
            assert_eq!(line, "nCONTSCAN /srv/mail\n");

            reader.get_mut().write_all(b"/srv/mail: OK\n").await.unwrap();
        });

        let outcome = client_for(addr).scan_all("/srv/mail").await.unwrap();
        assert_eq!(outcome, ScanOutcome::Clean);
        server.await.unwrap();
    }

    // ========================================================================
    // Stream scan tests
    // ========================================================================

    #[tokio::test]
    async fn test_scan_stream_chunks_and_terminator() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut peer, _) = listener.accept().await.unwrap();

            let mut cmd = [0u8; 10];
            peer.read_exact(&mut cmd).await.unwrap();
            assert_eq!(&cmd, b"nINSTREAM\n");

            let frames = read_frames(&mut peer).await;
            peer.write_all(b"stream: OK\n").await.unwrap();
            frames
        });

        // 2500 bytes: two full chunks and one partial.
        let data = vec![0x41u8; 2500];
        let outcome = client_for(addr).scan_stream(data.as_slice()).await.unwrap();
        assert_eq!(outcome, ScanOutcome::Clean);

        let frames = server.await.unwrap();
        assert_eq!(
            frames.iter().map(Vec::len).collect::<Vec<_>>(),
            vec![1024, 1024, 452]
        );
    }

    #[tokio::test]
    async fn test_scan_stream_empty_source_sends_terminator() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut peer, _) = listener.accept().await.unwrap();

            let mut cmd = [0u8; 10];
            peer.read_exact(&mut cmd).await.unwrap();

            let mut terminator = [0u8; 4];
            peer.read_exact(&mut terminator).await.unwrap();
            assert_eq!(terminator, [0, 0, 0, 0]);

            peer.write_all(b"stream: OK\n").await.unwrap();
        });

        let outcome = client_for(addr)
            .scan_stream(tokio::io::empty())
            .await
            .unwrap();
        assert_eq!(outcome, ScanOutcome::Clean);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_scan_stream_infected() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut peer, _) = listener.accept().await.unwrap();

            let mut cmd = [0u8; 10];
            peer.read_exact(&mut cmd).await.unwrap();
            read_frames(&mut peer).await;

            peer.write_all(b"stream: Win.Test.EICAR_HDB-1 FOUND\n")
                .await
                .unwrap();
        });

        let outcome = client_for(addr)
            .scan_stream(&b"not actually eicar"[..])
            .await
            .unwrap();
        assert_eq!(outcome, ScanOutcome::Infected);
    }

    #[tokio::test]
    async fn test_scan_stream_peer_close_is_limit_exceeded() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut peer, _) = listener.accept().await.unwrap();

            // Accept the command, then reject the upload outright, as clamd
            // does once an upload passes StreamMaxLength.
            let mut cmd = [0u8; 10];
            peer.read_exact(&mut cmd).await.unwrap();
            drop(peer);
        });

        // Large enough that a chunk write hits the closed socket.
        let data = vec![0u8; 8 * 1024 * 1024];
        let err = client_for(addr)
            .scan_stream(data.as_slice())
            .await
            .unwrap_err();
        assert!(
            matches!(err, Error::StreamLimitExceeded),
            "got {err:?} instead"
        );
    }

    #[tokio::test]
    async fn test_scan_stream_from_file() {
        use std::io::Write as _;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        for _ in 0..10 {
            writeln!(file, "this is a test file for clamd-client").unwrap();
        }

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut peer, _) = listener.accept().await.unwrap();

            let mut cmd = [0u8; 10];
            peer.read_exact(&mut cmd).await.unwrap();
            read_frames(&mut peer).await;

            peer.write_all(b"stream: OK\n").await.unwrap();
        });

        let source = tokio::fs::File::open(file.path()).await.unwrap();
        let outcome = client_for(addr).scan_stream(source).await.unwrap();
        assert_eq!(outcome, ScanOutcome::Clean);
    }

    // ========================================================================
    // Stats tests
    // ========================================================================

    #[tokio::test]
    async fn test_stats() {
        let addr = one_shot_daemon(
            "POOLS: 1\n\nSTATE: VALID PRIMARY\n\
             THREADS: live 1 idle 0 max 12 idle-timeout 30\n\
             QUEUE: 0 items\n\tSTATS 0.000252\n\n\
             MEMSTATS: heap 3.656M mmap 0.129M used 3.236M free 0.420M \
             releasable 0.127M pools 1 pools_used 565.979M pools_total 565.999M\n\
             END\n",
        )
        .await;

        let stats = client_for(addr).stats().await.unwrap();
        assert_eq!(stats.pools, 1);
        assert_eq!(stats.state, "VALID PRIMARY");
        assert_eq!(stats.threads.max, 12);
        assert_eq!(stats.queue.items, 0);
        assert_eq!(stats.memory.pools, 1);
    }

    // ========================================================================
    // Concurrency tests
    // ========================================================================

    #[tokio::test]
    async fn test_requests_serialized_per_client() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let server_active = Arc::clone(&active);
        let server_peak = Arc::clone(&peak);
        tokio::spawn(async move {
            loop {
                let (peer, _) = listener.accept().await.unwrap();
                let active = Arc::clone(&server_active);
                let peak = Arc::clone(&server_peak);

                tokio::spawn(async move {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);

                    // Hold the connection long enough for overlap to show.
                    tokio::time::sleep(Duration::from_millis(50)).await;

                    let mut reader = BufReader::new(peer);
                    let mut line = String::new();
                    reader.read_line(&mut line).await.unwrap();
                    reader.get_mut().write_all(b"PONG\n").await.unwrap();

                    // Decrement before the close below: the client can only
                    // reconnect once it sees EOF.
                    active.fetch_sub(1, Ordering::SeqCst);
                    drop(reader);
                });
            }
        });

        let clamd = Arc::new(client_for(addr));
        let mut tasks = Vec::new();
        for _ in 0..4 {
            let clamd = Arc::clone(&clamd);
            tasks.push(tokio::spawn(async move { clamd.ping().await }));
        }
        for task in tasks {
            assert!(task.await.unwrap().unwrap());
        }

        // The client guard admits one session at a time.
        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }
}
