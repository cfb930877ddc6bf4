//! The boundary to the external chat/history log.

use std::sync::{Arc, Mutex};

/// Append-only log sink, best-effort.
///
/// The room never learns about sink failures — an implementation that
/// cannot write reports through `tracing` and swallows the error, so
/// log I/O can never affect game state.
pub trait LogSink: Send + Sync {
    fn append(&self, line: &str);
}

/// The two sinks the room writes to.
#[derive(Clone)]
pub struct RoomLogs {
    /// Chat lines ("name: message").
    pub chat: Arc<dyn LogSink>,
    /// Game results.
    pub history: Arc<dyn LogSink>,
}

impl RoomLogs {
    /// Logs that go nowhere. Used by tests and embedders that don't care.
    pub fn disabled() -> Self {
        let sink = Arc::new(NullSink);
        Self {
            chat: sink.clone(),
            history: sink,
        }
    }
}

/// Discards everything.
pub struct NullSink;

impl LogSink for NullSink {
    fn append(&self, _line: &str) {}
}

/// Captures lines in memory. Test support.
#[derive(Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// The lines appended so far.
    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl LogSink for MemorySink {
    fn append(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }
}
