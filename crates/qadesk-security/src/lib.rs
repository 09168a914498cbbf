//! Sensitive-data masking for qadesk
//!
//! Text passes through three stages, always in this order:
//! 1. URL obfuscation
//! 2. Structured-record redaction (brace-delimited JSON objects)
//! 3. The category sweep driven by the [`PatternCatalog`]
//!
//! Masking is best-effort and pattern based. A match that cannot be
//! rewritten is left as it was and reported as a [`Degradation`].

pub mod catalog;
pub mod error;
pub mod masking;
pub mod record;
pub mod url;

pub use catalog::{Category, MaskRule, PatternCatalog, ReplacementPolicy};
pub use error::{MaskError, RecordError};
pub use masking::{Degradation, MaskReport, MaskingEngine, Redaction};
pub use url::obfuscate_urls;

/// Mask `text` with the standard catalog
pub fn mask(text: &str) -> String {
    MaskingEngine::new().mask(text)
}
