//! Log sinks
//!
//! Every sink serializes its own writes, so one sink can be shared by any
//! number of concurrent request handlers without interleaving records.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::{JournalError, LogRecord, Result};

/// Append-only destination for log records
pub trait LogSink: Send + Sync {
    fn append(&self, record: &LogRecord) -> Result<()>;
}

/// Appends one line per record to a file
pub struct FileSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileSink {
    /// Open `path` for appending, creating it and its parent directories
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        debug!(path = %path.display(), "opened journal");

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSink for FileSink {
    fn append(&self, record: &LogRecord) -> Result<()> {
        let line = format!("{record}\n");
        let mut file = self
            .file
            .lock()
            .map_err(|e| JournalError::Poisoned(e.to_string()))?;
        file.write_all(line.as_bytes())?;
        file.flush()?;
        Ok(())
    }
}

/// Keeps records in memory
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<LogRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything appended so far
    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LogSink for MemorySink {
    fn append(&self, record: &LogRecord) -> Result<()> {
        self.records
            .lock()
            .map_err(|e| JournalError::Poisoned(e.to_string()))?
            .push(record.clone());
        Ok(())
    }
}

/// Discards every record
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LogSink for NullSink {
    fn append(&self, _record: &LogRecord) -> Result<()> {
        Ok(())
    }
}

/// The three destinations a Q&A service writes to
#[derive(Clone)]
pub struct Journals {
    pub audit: Arc<dyn LogSink>,
    pub error: Arc<dyn LogSink>,
    pub feedback: Arc<dyn LogSink>,
}

impl Journals {
    pub fn new(
        audit: Arc<dyn LogSink>,
        error: Arc<dyn LogSink>,
        feedback: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            audit,
            error,
            feedback,
        }
    }

    /// File-backed journals inside `dir`
    pub fn open(dir: &Path, audit_file: &str, error_file: &str, feedback_file: &str) -> Result<Self> {
        Ok(Self::new(
            Arc::new(FileSink::open(dir.join(audit_file))?),
            Arc::new(FileSink::open(dir.join(error_file))?),
            Arc::new(FileSink::open(dir.join(feedback_file))?),
        ))
    }

    /// Journals that drop everything
    pub fn discard() -> Self {
        let sink: Arc<dyn LogSink> = Arc::new(NullSink);
        Self::new(sink.clone(), sink.clone(), sink)
    }
}

impl Default for Journals {
    fn default() -> Self {
        Self::discard()
    }
}
