use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Dataset shape mismatch: {questions} questions, {answers} answers")]
    DatasetShape { questions: usize, answers: usize },

    #[error("Unknown dataset format: {0}")]
    UnknownFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
