use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use qadesk_core::QaDataset;
use qadesk_index::{DEFAULT_THRESHOLD, IndexError, Match, VectorSpaceIndex, retrieve};
use qadesk_journal::{JournalError, Journals, LogRecord};
use qadesk_security::{MaskReport, MaskingEngine, obfuscate_urls};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

/// Returned when no stored question is similar enough to the query
pub const NO_MATCH_MESSAGE: &str = "Sorry, I couldn't find a relevant answer to your question.";

/// Returned when answering failed for any internal reason
pub const FAILURE_MESSAGE: &str =
    "Something went wrong while answering your question. Please try again.";

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("Journal error: {0}")]
    Journal(#[from] JournalError),

    #[error("Dataset has {dataset} entries but the index has {index}")]
    Misaligned { dataset: usize, index: usize },

    #[error("No stored answer at position {0}")]
    MissingAnswer(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    Answered,
    NoMatch,
    Failed,
}

/// What a caller gets back for one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub kind: ResponseKind,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Response {
    fn answered(text: String, found: Match) -> Self {
        Self {
            kind: ResponseKind::Answered,
            text,
            index: Some(found.index),
            score: Some(found.score),
        }
    }

    fn no_match() -> Self {
        Self {
            kind: ResponseKind::NoMatch,
            text: NO_MATCH_MESSAGE.to_string(),
            index: None,
            score: None,
        }
    }

    fn failed() -> Self {
        Self {
            kind: ResponseKind::Failed,
            text: FAILURE_MESSAGE.to_string(),
            index: None,
            score: None,
        }
    }
}

/// Answers free-text questions from the stored Q&A pairs.
///
/// Holds only read-only state plus journals that serialize their own
/// writes, so one instance can serve concurrent callers behind an `Arc`.
pub struct QaService {
    dataset: Arc<QaDataset>,
    index: Arc<VectorSpaceIndex>,
    masking: MaskingEngine,
    journals: Journals,
    threshold: f64,
}

impl QaService {
    /// Build the index over the dataset's questions
    pub fn new(dataset: QaDataset, journals: Journals) -> Result<Self, ServiceError> {
        let index = VectorSpaceIndex::build(dataset.questions())?;
        Self::with_index(Arc::new(dataset), Arc::new(index), journals)
    }

    /// Use an index built elsewhere; it must be aligned with `dataset`
    pub fn with_index(
        dataset: Arc<QaDataset>,
        index: Arc<VectorSpaceIndex>,
        journals: Journals,
    ) -> Result<Self, ServiceError> {
        if dataset.len() != index.len() {
            return Err(ServiceError::Misaligned {
                dataset: dataset.len(),
                index: index.len(),
            });
        }

        info!(
            entries = dataset.len(),
            terms = index.vocabulary().len(),
            fingerprint = %dataset.fingerprint(),
            "Q&A service ready"
        );

        Ok(Self {
            dataset,
            index,
            masking: MaskingEngine::new(),
            journals,
            threshold: DEFAULT_THRESHOLD,
        })
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_masking(mut self, masking: MaskingEngine) -> Self {
        self.masking = masking;
        self
    }

    /// Answer `query` with a masked stored answer or one of the fixed messages
    pub fn answer(&self, query: &str) -> String {
        self.respond(query).text
    }

    /// Like [`QaService::answer`], with the outcome and match details
    pub fn respond(&self, query: &str) -> Response {
        // Panics below this point are contained like any other failure
        let outcome = catch_unwind(AssertUnwindSafe(|| self.try_respond(query)));
        match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                error!(error = %e, "failed to answer query");
                self.report_error("answer", e.to_string());
                Response::failed()
            }
            Err(_) => {
                error!("panic while answering query");
                self.report_error("answer", "internal panic while answering query");
                Response::failed()
            }
        }
    }

    fn try_respond(&self, query: &str) -> Result<Response, ServiceError> {
        self.journals
            .audit
            .append(&LogRecord::audit(obfuscate_urls(query)))?;

        let found = match retrieve(query, &self.index, self.threshold) {
            Ok(found) => found,
            Err(no_match) => {
                info!(best_score = no_match.best_score, "no relevant answer");
                return Ok(Response::no_match());
            }
        };

        let answer = self
            .dataset
            .answer(found.index)
            .ok_or(ServiceError::MissingAnswer(found.index))?;

        let report = self.mask_with_report(answer);
        info!(
            index = found.index,
            score = found.score,
            redactions = report.total(),
            "answered query"
        );

        Ok(Response::answered(report.text, found))
    }

    /// Mask arbitrary text; degraded matches are written to the error journal
    pub fn mask_with_report(&self, text: &str) -> MaskReport {
        let report = self.masking.mask_with_report(text);
        for degradation in &report.degraded {
            self.report_error(
                "masking",
                format!(
                    "{} match at offset {} left unmasked: {}",
                    degradation.category, degradation.offset, degradation.reason
                ),
            );
        }
        report
    }

    pub fn mask(&self, text: &str) -> String {
        self.mask_with_report(text).text
    }

    /// Append caller feedback about an answer; URLs in the query are obfuscated
    pub fn record_feedback(&self, query: &str, feedback: &str) -> Result<(), ServiceError> {
        self.journals
            .feedback
            .append(&LogRecord::feedback(obfuscate_urls(query), feedback))?;
        Ok(())
    }

    fn report_error(&self, stage: &str, description: impl Into<String>) {
        if let Err(e) = self.journals.error.append(&LogRecord::error(stage, description)) {
            warn!(error = %e, stage, "could not write error journal");
        }
    }

    pub fn dataset(&self) -> &QaDataset {
        &self.dataset
    }

    pub fn index(&self) -> &VectorSpaceIndex {
        &self.index
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}
