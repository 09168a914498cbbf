use thiserror::Error;

/// Why a single match could not be rewritten
#[derive(Error, Debug)]
pub enum MaskError {
    #[error("Unbalanced quote around field value")]
    UnbalancedQuote,

    #[error("Match has {found} digits, fewer than the {visible} to reveal")]
    TooFewDigits { found: usize, visible: usize },

    #[error("Record redaction failed: {0}")]
    Record(#[from] RecordError),
}

/// Why a brace-delimited block was left unchanged
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Block is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Block is not a JSON object")]
    NotObject,

    #[error("Failed to serialize record: {0}")]
    Serialize(serde_json::Error),
}
