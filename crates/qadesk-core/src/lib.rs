//! Core domain models for qadesk
//!
//! This crate contains:
//! - The question/answer dataset (two aligned, immutable sequences)
//! - Dataset ingestion from a labelled text document or a JSON pair list
//! - The shared error type

pub mod dataset;
pub mod error;
pub mod ingest;

pub use dataset::{QaDataset, QaPair};
pub use error::{CoreError, Result};
pub use ingest::{DatasetFormat, DatasetSource, JsonPairsSource, TextDocumentSource, parse_document};
