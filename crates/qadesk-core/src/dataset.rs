use serde::{Deserialize, Serialize};

use crate::{CoreError, Result};

/// A single question with the answer stored for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

impl QaPair {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Questions and answers as two aligned sequences.
///
/// `questions[i]` is answered by `answers[i]`. Both are fixed once the
/// dataset is constructed; there is no update path.
#[derive(Debug, Clone, Default)]
pub struct QaDataset {
    questions: Vec<String>,
    answers: Vec<String>,
}

impl QaDataset {
    /// Build a dataset from parallel sequences, rejecting unequal lengths
    pub fn new(questions: Vec<String>, answers: Vec<String>) -> Result<Self> {
        if questions.len() != answers.len() {
            return Err(CoreError::DatasetShape {
                questions: questions.len(),
                answers: answers.len(),
            });
        }

        Ok(Self { questions, answers })
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = QaPair>) -> Self {
        let (questions, answers) = pairs
            .into_iter()
            .map(|pair| (pair.question, pair.answer))
            .unzip();

        Self { questions, answers }
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn answer(&self, index: usize) -> Option<&str> {
        self.answers.get(index).map(String::as_str)
    }

    pub fn question(&self, index: usize) -> Option<&str> {
        self.questions.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Stable BLAKE3 fingerprint over every pair, in order
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for (question, answer) in self.questions.iter().zip(&self.answers) {
            hasher.update(&(question.len() as u64).to_le_bytes());
            hasher.update(question.as_bytes());
            hasher.update(&(answer.len() as u64).to_le_bytes());
            hasher.update(answer.as_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }
}
