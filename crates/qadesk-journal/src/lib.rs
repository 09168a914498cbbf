//! Append-only journals for qadesk
//!
//! This crate provides:
//! - Audit, error and feedback record types
//! - The `LogSink` seam, with file, in-memory and discarding sinks
//! - `Journals`, the bundle of the three destinations a service writes to

pub mod error;
pub mod record;
pub mod sink;

pub use error::{JournalError, Result};
pub use record::LogRecord;
pub use sink::{FileSink, Journals, LogSink, MemorySink, NullSink};
