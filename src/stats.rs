//! STATS report parsing.
//!
//! The `STATS` reply is a semi-structured multi-line report. Each line is
//! keyed by its prefix; unrecognized lines are ignored so newer daemons can
//! add fields without breaking the client, but a recognized field with a
//! malformed number fails the whole parse.
//!
//! Observed daemon output:
//!
//! ```text
//! POOLS: 1
//!
//! STATE: VALID PRIMARY
//! THREADS: live 1  idle 0 max 12 idle-timeout 30
//! QUEUE: 0 items
//!     STATS 0.000252
//!
//! MEMSTATS: heap 3.656M mmap 0.129M used 3.236M free 0.420M releasable 0.127M pools 1 pools_used 565.979M pools_total 565.999M
//! END
//! ```
//!
//! The queue sub-line and `MEMSTATS` only appear after a `QUEUE` section has
//! opened; the parser tracks that state. The grammar is inferred from daemon
//! output, not documented by ClamAV.

// ============================================================================
// Imports
// ============================================================================

use crate::error::{Error, Result};

// ============================================================================
// Line Markers
// ============================================================================

const POOLS_MARKER: &str = "POOLS: ";
const STATE_MARKER: &str = "STATE: ";
const THREADS_MARKER: &str = "THREADS: ";
const QUEUE_MARKER: &str = "QUEUE: ";
const QUEUE_STATS_MARKER: &str = "STATS ";
const MEMSTATS_MARKER: &str = "MEMSTATS: ";

// ============================================================================
// Stats Types
// ============================================================================

/// Structured snapshot of a `STATS` reply.
///
/// Produced fresh on every query; nothing is cached between calls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stats {
    /// Number of scanning thread pools.
    pub pools: u32,
    /// Daemon state string, verbatim (e.g. `VALID PRIMARY`).
    pub state: String,
    /// Thread pool counters.
    pub threads: ThreadStats,
    /// Scan queue counters.
    pub queue: QueueStats,
    /// Memory allocator counters.
    pub memory: MemStats,
}

/// Thread pool counters from the `THREADS:` line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThreadStats {
    /// Threads currently scanning.
    pub live: u32,
    /// Threads waiting for work.
    pub idle: u32,
    /// Configured maximum thread count.
    pub max: u32,
    /// Idle thread timeout in seconds.
    pub idle_timeout: u32,
}

/// Scan queue counters from the `QUEUE:` section.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QueueStats {
    /// Items waiting in the scan queue.
    pub items: u32,
    /// Queue timing statistic from the indented `STATS` sub-line.
    pub stats: f32,
}

/// Memory counters from the `MEMSTATS:` line, megabyte values.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MemStats {
    /// Heap size.
    pub heap: f32,
    /// Memory-mapped allocation size.
    pub mmap: f32,
    /// Memory in use.
    pub used: f32,
    /// Free memory.
    pub free: f32,
    /// Memory releasable to the OS.
    pub releasable: f32,
    /// Number of memory pools.
    pub pools: u32,
    /// Pool memory in use.
    pub pools_used: f32,
    /// Total pool memory.
    pub pools_total: f32,
}

// ============================================================================
// Parser
// ============================================================================

/// Parses a raw `STATS` reply into a [`Stats`] record.
///
/// # Errors
///
/// - [`Error::Parse`] naming the offending line if a recognized field holds
///   a malformed number; no partial record is returned
pub fn parse_stats(report: &str) -> Result<Stats> {
    let mut stats = Stats::default();
    let mut queue_open = false;

    for line in report.lines() {
        if let Some(rest) = line.strip_prefix(POOLS_MARKER) {
            stats.pools = parse_int(rest.trim(), line)?;
        } else if let Some(rest) = line.strip_prefix(STATE_MARKER) {
            stats.state = rest.to_string();
        } else if let Some(rest) = line.strip_prefix(THREADS_MARKER) {
            parse_threads(rest, line, &mut stats.threads)?;
        } else if let Some(rest) = line.strip_prefix(QUEUE_MARKER) {
            queue_open = true;
            let first = rest.split_whitespace().next().unwrap_or("");
            stats.queue.items = parse_int(first, line)?;
        } else if queue_open && line.starts_with('\t') {
            if let Some(rest) = line.trim_start_matches('\t').strip_prefix(QUEUE_STATS_MARKER) {
                stats.queue.stats = parse_float(rest.trim(), line)?;
            }
        } else if queue_open
            && let Some(rest) = line.strip_prefix(MEMSTATS_MARKER)
        {
            parse_memstats(rest, line, &mut stats.memory)?;
        }
        // Anything else (blank lines, END, future fields) is ignored.
    }

    Ok(stats)
}

/// Walks `key value key value ...` pairs on the `THREADS:` line.
fn parse_threads(rest: &str, line: &str, out: &mut ThreadStats) -> Result<()> {
    let mut prev = "";
    for token in rest.split_whitespace() {
        match prev {
            "live" => out.live = parse_int(token, line)?,
            "idle" => out.idle = parse_int(token, line)?,
            "max" => out.max = parse_int(token, line)?,
            "idle-timeout" => out.idle_timeout = parse_int(token, line)?,
            _ => {}
        }
        prev = token;
    }
    Ok(())
}

/// Walks `key value key value ...` pairs on the `MEMSTATS:` line.
///
/// Values carry a trailing `M` unit suffix; `pools` is the one integer.
fn parse_memstats(rest: &str, line: &str, out: &mut MemStats) -> Result<()> {
    let mut prev = "";
    for token in rest.split_whitespace() {
        let value = token.trim_end_matches('M');
        match prev {
            "heap" => out.heap = parse_float(value, line)?,
            "mmap" => out.mmap = parse_float(value, line)?,
            "used" => out.used = parse_float(value, line)?,
            "free" => out.free = parse_float(value, line)?,
            "releasable" => out.releasable = parse_float(value, line)?,
            "pools" => out.pools = parse_int(value, line)?,
            "pools_used" => out.pools_used = parse_float(value, line)?,
            "pools_total" => out.pools_total = parse_float(value, line)?,
            _ => {}
        }
        prev = token;
    }
    Ok(())
}

fn parse_int(value: &str, line: &str) -> Result<u32> {
    value
        .parse::<u32>()
        .map_err(|e| Error::parse(line, e.to_string()))
}

fn parse_float(value: &str, line: &str) -> Result<f32> {
    value
        .parse::<f32>()
        .map_err(|e| Error::parse(line, e.to_string()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "POOLS: 1\n\n\
        STATE: VALID PRIMARY\n\
        THREADS: live 2 idle 1 max 12 idle-timeout 30\n\
        QUEUE: 4 items\n\
        \tSTATS 0.000252\n\n\
        MEMSTATS: heap 10.50M mmap 5.25M used 8.00M free 2.50M releasable 1.00M \
        pools 2 pools_used 7.00M pools_total 8.00M\n\
        END";

    #[test]
    fn test_round_trip_sample_report() {
        let stats = parse_stats(SAMPLE).unwrap();

        assert_eq!(stats.pools, 1);
        assert_eq!(stats.state, "VALID PRIMARY");
        assert_eq!(
            stats.threads,
            ThreadStats {
                live: 2,
                idle: 1,
                max: 12,
                idle_timeout: 30
            }
        );
        assert_eq!(stats.queue.items, 4);
        assert!((stats.queue.stats - 0.000_252).abs() < f32::EPSILON);

        assert_eq!(stats.memory.heap, 10.50);
        assert_eq!(stats.memory.mmap, 5.25);
        assert_eq!(stats.memory.used, 8.00);
        assert_eq!(stats.memory.free, 2.50);
        assert_eq!(stats.memory.releasable, 1.00);
        assert_eq!(stats.memory.pools, 2);
        assert_eq!(stats.memory.pools_used, 7.00);
        assert_eq!(stats.memory.pools_total, 8.00);
    }

    #[test]
    fn test_queue_items_is_first_token() {
        let stats = parse_stats("QUEUE: 17 items").unwrap();
        assert_eq!(stats.queue.items, 17);
    }

    #[test]
    fn test_threads_tolerates_repeated_spaces() {
        let stats = parse_stats("THREADS: live 1  idle 0 max 12 idle-timeout 30").unwrap();
        assert_eq!(stats.threads.live, 1);
        assert_eq!(stats.threads.idle, 0);
    }

    #[test]
    fn test_malformed_thread_count_fails_whole_parse() {
        let err = parse_stats("THREADS: live x idle 1 max 12 idle-timeout 30").unwrap_err();
        match err {
            Error::Parse { line, .. } => assert!(line.contains("live x")),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_memstats_fails_whole_parse() {
        let report = "QUEUE: 0 items\nMEMSTATS: heap bogusM";
        assert!(matches!(
            parse_stats(report).unwrap_err(),
            Error::Parse { .. }
        ));
    }

    #[test]
    fn test_memstats_ignored_before_queue_section() {
        // MEMSTATS is only recognized once a QUEUE section has opened.
        let stats = parse_stats("MEMSTATS: heap 10.50M").unwrap();
        assert_eq!(stats.memory.heap, 0.0);
    }

    #[test]
    fn test_queue_stats_subline_needs_queue_section() {
        let stats = parse_stats("\tSTATS 0.5").unwrap();
        assert_eq!(stats.queue.stats, 0.0);
    }

    #[test]
    fn test_unrecognized_lines_ignored() {
        let stats = parse_stats("POOLS: 3\nFUTURE-FIELD: whatever\nEND").unwrap();
        assert_eq!(stats.pools, 3);
    }

    #[test]
    fn test_empty_report_yields_defaults() {
        let stats = parse_stats("").unwrap();
        assert_eq!(stats, Stats::default());
    }
}
