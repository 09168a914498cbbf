//! Dataset ingestion
//!
//! The Q&A document is a sequence of blocks separated by a literal `---`.
//! Each usable block carries a `Question:` label followed by an `Answer:`
//! label; blocks missing either label are skipped.

use std::path::PathBuf;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{CoreError, QaDataset, QaPair, Result};

const BLOCK_DELIMITER: &str = "---";
const QUESTION_LABEL: &str = "Question:";
const ANSWER_LABEL: &str = "Answer:";

/// Parse a labelled Q&A document into a dataset
pub fn parse_document(text: &str) -> QaDataset {
    let pairs = text.split(BLOCK_DELIMITER).filter_map(parse_block);
    QaDataset::from_pairs(pairs)
}

fn parse_block(block: &str) -> Option<QaPair> {
    if !block.contains(QUESTION_LABEL) || !block.contains(ANSWER_LABEL) {
        return None;
    }

    let question = segment_after(block, QUESTION_LABEL)?;
    let question = until(question, ANSWER_LABEL).trim();
    let answer = segment_after(block, ANSWER_LABEL)?.trim();

    Some(QaPair::new(question, answer))
}

/// Text following the first `label`, up to the next `label` if there is one
fn segment_after<'a>(text: &'a str, label: &str) -> Option<&'a str> {
    let (_, rest) = text.split_once(label)?;
    Some(until(rest, label))
}

fn until<'a>(text: &'a str, marker: &str) -> &'a str {
    match text.find(marker) {
        Some(end) => &text[..end],
        None => text,
    }
}

/// On-disk representation of a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetFormat {
    /// Plain-text export of the labelled Q&A document
    #[default]
    Text,
    /// JSON array of `{"question": ..., "answer": ...}` objects
    Json,
}

impl DatasetFormat {
    /// Guess the format from a file extension, falling back to text
    pub fn from_path(path: &std::path::Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Text,
        }
    }

    /// Create the source that reads `path` in this format
    pub fn source(self, path: impl Into<PathBuf>) -> Box<dyn DatasetSource> {
        match self {
            Self::Text => Box::new(TextDocumentSource::new(path)),
            Self::Json => Box::new(JsonPairsSource::new(path)),
        }
    }
}

impl FromStr for DatasetFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(CoreError::UnknownFormat(other.to_string())),
        }
    }
}

/// Anything that can produce the Q&A dataset at startup
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Load every pair this source holds
    async fn load(&self) -> Result<QaDataset>;

    /// Human-readable origin, used in startup logs
    fn describe(&self) -> String;
}

/// Reads a labelled Q&A text document
pub struct TextDocumentSource {
    path: PathBuf,
}

impl TextDocumentSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DatasetSource for TextDocumentSource {
    async fn load(&self) -> Result<QaDataset> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let dataset = parse_document(&content);
        debug!(path = %self.path.display(), pairs = dataset.len(), "parsed Q&A document");
        Ok(dataset)
    }

    fn describe(&self) -> String {
        format!("text:{}", self.path.display())
    }
}

/// Reads a JSON array of question/answer objects
pub struct JsonPairsSource {
    path: PathBuf,
}

impl JsonPairsSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DatasetSource for JsonPairsSource {
    async fn load(&self) -> Result<QaDataset> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let pairs: Vec<QaPair> = serde_json::from_str(&content)?;
        debug!(path = %self.path.display(), pairs = pairs.len(), "parsed Q&A pairs");
        Ok(QaDataset::from_pairs(pairs))
    }

    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = "\
Question: Why is `https://api.example.com/user/101` returning 403 Forbidden?

Answer:
403 means access is denied. Check your token.

---
Question: What causes `https://api.example.com/login` to return 401?

Answer:
401 Unauthorized often indicates invalid credentials.

---
";

    #[test]
    fn test_parse_document() {
        let dataset = parse_document(DOCUMENT);

        assert_eq!(dataset.len(), 2);
        assert_eq!(
            dataset.question(0),
            Some("Why is `https://api.example.com/user/101` returning 403 Forbidden?")
        );
        assert_eq!(
            dataset.answer(0),
            Some("403 means access is denied. Check your token.")
        );
        assert_eq!(
            dataset.answer(1),
            Some("401 Unauthorized often indicates invalid credentials.")
        );
    }

    #[test]
    fn test_blocks_without_both_labels_are_skipped() {
        let text = "Question: orphan question\n---\nAnswer: orphan answer\n---\nQuestion: q\nAnswer: a";
        let dataset = parse_document(text);

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.question(0), Some("q"));
        assert_eq!(dataset.answer(0), Some("a"));
    }

    #[test]
    fn test_second_answer_label_ends_answer() {
        let dataset = parse_document("Question: q\nAnswer: first\nAnswer: second");

        assert_eq!(dataset.answer(0), Some("first"));
    }

    #[test]
    fn test_empty_document() {
        assert!(parse_document("").is_empty());
        assert!(parse_document("---\n---").is_empty());
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("json".parse::<DatasetFormat>().unwrap(), DatasetFormat::Json);
        assert_eq!("TEXT".parse::<DatasetFormat>().unwrap(), DatasetFormat::Text);
        assert!("pdf".parse::<DatasetFormat>().is_err());

        assert_eq!(
            DatasetFormat::from_path(std::path::Path::new("qa.JSON")),
            DatasetFormat::Json
        );
        assert_eq!(
            DatasetFormat::from_path(std::path::Path::new("qa.txt")),
            DatasetFormat::Text
        );
    }

    #[tokio::test]
    async fn test_text_source_loads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qa.txt");
        std::fs::write(&path, DOCUMENT).unwrap();

        let source = DatasetFormat::Text.source(&path);
        let dataset = source.load().await.unwrap();

        assert_eq!(dataset.len(), 2);
        assert!(source.describe().starts_with("text:"));
    }

    #[tokio::test]
    async fn test_json_source_loads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qa.json");
        std::fs::write(
            &path,
            r#"[{"question": "How do I reset my password", "answer": "Use the reset link."}]"#,
        )
        .unwrap();

        let dataset = JsonPairsSource::new(&path).load().await.unwrap();

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.answer(0), Some("Use the reset link."));
    }

    #[tokio::test]
    async fn test_json_source_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qa.json");
        std::fs::write(&path, "{not json").unwrap();

        let result = JsonPairsSource::new(&path).load().await;
        assert!(matches!(result, Err(CoreError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let result = TextDocumentSource::new("/nonexistent/qadesk/qa.txt").load().await;
        assert!(matches!(result, Err(CoreError::Io(_))));
    }
}
