use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

/// One entry in an audit, error or feedback journal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogRecord {
    Audit {
        request_id: Uuid,
        #[serde(with = "time::serde::timestamp")]
        timestamp: OffsetDateTime,
        /// Query with URLs obfuscated
        query: String,
    },
    Error {
        #[serde(with = "time::serde::timestamp")]
        timestamp: OffsetDateTime,
        stage: String,
        description: String,
    },
    Feedback {
        #[serde(with = "time::serde::timestamp")]
        timestamp: OffsetDateTime,
        query: String,
        feedback: String,
    },
}

impl LogRecord {
    pub fn audit(query: impl Into<String>) -> Self {
        Self::Audit {
            request_id: Uuid::new_v4(),
            timestamp: OffsetDateTime::now_utc(),
            query: query.into(),
        }
    }

    pub fn error(stage: impl Into<String>, description: impl Into<String>) -> Self {
        Self::Error {
            timestamp: OffsetDateTime::now_utc(),
            stage: stage.into(),
            description: description.into(),
        }
    }

    pub fn feedback(query: impl Into<String>, feedback: impl Into<String>) -> Self {
        Self::Feedback {
            timestamp: OffsetDateTime::now_utc(),
            query: query.into(),
            feedback: feedback.into(),
        }
    }

    pub fn timestamp(&self) -> OffsetDateTime {
        match self {
            Self::Audit { timestamp, .. }
            | Self::Error { timestamp, .. }
            | Self::Feedback { timestamp, .. } => *timestamp,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Audit { .. } => "audit",
            Self::Error { .. } => "error",
            Self::Feedback { .. } => "feedback",
        }
    }
}

fn format_timestamp(timestamp: OffsetDateTime) -> String {
    timestamp
        .format(&Rfc3339)
        .unwrap_or_else(|_| timestamp.unix_timestamp().to_string())
}

/// Single-line, human-readable form; free text is escaped so a record
/// never spans lines
impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let timestamp = format_timestamp(self.timestamp());
        match self {
            Self::Audit {
                request_id, query, ..
            } => write!(f, "[{timestamp}] AUDIT {request_id} query={query:?}"),
            Self::Error {
                stage, description, ..
            } => write!(f, "[{timestamp}] ERROR stage={stage} {description:?}"),
            Self::Feedback { query, feedback, .. } => {
                write!(f, "[{timestamp}] FEEDBACK query={query:?} feedback={feedback:?}")
            }
        }
    }
}
