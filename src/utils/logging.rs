//! Structured event sink.
//!
//! Sessions report noteworthy events (rejections, framing violations, vector
//! results) through an [`EventSink`] handed to them at construction; there
//! is no process-global log path. Sinks are fire-and-forget: a sink that
//! cannot write must never block or abort the session that called it.

use std::fmt::Write as _;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use tracing::{error, info, warn};

/// Severity of a logged event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    /// Upper-case label used by line-oriented sinks.
    pub fn label(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
        }
    }
}

/// Receiver for structured session events.
///
/// Implementations must be safe to share across concurrent sessions and must
/// emit each event as one atomic unit (one complete line for file sinks).
pub trait EventSink: Send + Sync {
    /// Record one event. Never blocks session progress; failures to log are
    /// swallowed by the sink.
    fn log_event(&self, severity: Severity, message: &str, context: &[(&str, String)]);
}

/// Sink forwarding events to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn log_event(&self, severity: Severity, message: &str, context: &[(&str, String)]) {
        let ctx = render_context(context);
        match severity {
            Severity::Info => info!(context = %ctx, "{message}"),
            Severity::Warning => warn!(context = %ctx, "{message}"),
            Severity::Critical => error!(context = %ctx, "{message}"),
        }
    }
}

/// Line-oriented file sink matching the log format of the service this
/// replaces: `[timestamp] SEVERITY: message | key=value ...`.
///
/// Appends are serialized through a mutex so concurrent sessions never
/// interleave partial lines.
pub struct FileSink {
    file: Mutex<File>,
}

impl FileSink {
    /// Open (or create) the log file for appending.
    pub fn open<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl EventSink for FileSink {
    fn log_event(&self, severity: Severity, message: &str, context: &[(&str, String)]) {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let mut line = format!("[{timestamp}] {}: {message}", severity.label());
        if !context.is_empty() {
            line.push_str(" |");
            for (key, value) in context {
                let _ = write!(line, " {key}={value}");
            }
        }
        line.push('\n');

        // Fire-and-forget: a poisoned lock or full disk must not take the
        // session down with it.
        if let Ok(mut file) = self.file.lock() {
            let _ = file.write_all(line.as_bytes());
        }
    }
}

fn render_context(context: &[(&str, String)]) -> String {
    let mut out = String::new();
    for (i, (key, value)) in context.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{key}={value}");
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn file_sink_writes_one_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.log");

        let sink = FileSink::open(&path).unwrap();
        sink.log_event(
            Severity::Warning,
            "Authentication failed",
            &[("client", "alice".to_string())],
        );
        sink.log_event(Severity::Info, "Vector processed", &[]);

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("WARNING: Authentication failed | client=alice"));
        assert!(lines[1].contains("INFO: Vector processed"));
    }

    #[test]
    fn concurrent_appends_never_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.log");
        let sink = Arc::new(FileSink::open(&path).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let sink = Arc::clone(&sink);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        sink.log_event(
                            Severity::Info,
                            "event",
                            &[("worker", i.to_string())],
                        );
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 8 * 50);
        for line in contents.lines() {
            assert!(line.contains("INFO: event | worker="));
        }
    }
}
