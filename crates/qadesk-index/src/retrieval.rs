//! Best-match selection over a [`VectorSpaceIndex`]

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::index::VectorSpaceIndex;
use crate::vector::cosine_similarity;

/// Minimum similarity an answer needs by default
pub const DEFAULT_THRESHOLD: f64 = 0.3;

/// A stored question selected for a query
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub index: usize,
    pub score: f64,
}

/// No stored question reached the threshold
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("Best similarity {best_score:.3} is below threshold {threshold:.3}")]
pub struct NoMatch {
    pub best_score: f64,
    pub threshold: f64,
}

/// Cosine similarity of `query` against every stored question, by position
pub fn similarities(query: &str, index: &VectorSpaceIndex) -> Vec<f64> {
    let projected = index.project(query);
    index
        .documents()
        .iter()
        .map(|document| cosine_similarity(&projected, document))
        .collect()
}

/// Select the most similar stored question.
///
/// Ties go to the lowest index. A best score strictly below `threshold`
/// is a [`NoMatch`].
pub fn retrieve(query: &str, index: &VectorSpaceIndex, threshold: f64) -> Result<Match, NoMatch> {
    let mut best: Option<Match> = None;
    for (i, score) in similarities(query, index).into_iter().enumerate() {
        if best.is_none_or(|b| score > b.score) {
            best = Some(Match { index: i, score });
        }
    }

    match best {
        Some(m) if m.score >= threshold => {
            debug!(index = m.index, score = m.score, "retrieved answer");
            Ok(m)
        }
        other => {
            let best_score = other.map_or(0.0, |m| m.score);
            debug!(best_score, threshold, "no answer above threshold");
            Err(NoMatch {
                best_score,
                threshold,
            })
        }
    }
}

/// Up to `limit` matches, best first; equal scores keep index order
pub fn rank(query: &str, index: &VectorSpaceIndex, limit: usize) -> Vec<Match> {
    let mut matches: Vec<Match> = similarities(query, index)
        .into_iter()
        .enumerate()
        .map(|(index, score)| Match { index, score })
        .collect();

    matches.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.index.cmp(&b.index)));
    matches.truncate(limit);
    matches
}

impl VectorSpaceIndex {
    pub fn retrieve(&self, query: &str, threshold: f64) -> Result<Match, NoMatch> {
        retrieve(query, self, threshold)
    }
}
