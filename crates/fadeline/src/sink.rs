//! Append-only file sink for the chat and history logs.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use fadeline_room::LogSink;

/// Best-effort append-only log file.
///
/// Each line gets a unix-seconds timestamp prefix. Write failures are
/// reported through `tracing` and swallowed; the room never sees them.
pub struct FileSink {
    path: String,
    file: Mutex<File>,
}

impl FileSink {
    /// Opens (or creates) the file in append mode.
    pub fn open(path: &Path) -> std::io::Result<FileSink> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(FileSink {
            path: path.display().to_string(),
            file: Mutex::new(file),
        })
    }
}

impl LogSink for FileSink {
    fn append(&self, line: &str) {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let Ok(mut file) = self.file.lock() else {
            tracing::warn!(path = %self.path, "log sink lock poisoned, dropping line");
            return;
        };
        if let Err(e) = writeln!(file, "[{ts}] {line}") {
            tracing::warn!(path = %self.path, error = %e, "log append failed");
        }
    }
}
