use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::tokenizer::tokenize;
use crate::vector::SparseVector;
use crate::{IndexError, Result};

/// Term → stable index, assigned in lexicographic term order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vocabulary {
    terms: BTreeMap<String, usize>,
}

impl Vocabulary {
    pub fn get(&self, term: &str) -> Option<usize> {
        self.terms.get(term).copied()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains_key(term)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Terms in index order
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.keys().map(String::as_str)
    }
}

/// Smoothed inverse document frequency per term index
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TermWeights {
    idf: Vec<f64>,
}

impl TermWeights {
    /// `ln((1 + n) / (1 + df)) + 1`
    pub fn smoothed_idf(documents: usize, document_frequency: usize) -> f64 {
        ((1.0 + documents as f64) / (1.0 + document_frequency as f64)).ln() + 1.0
    }

    pub fn get(&self, term: usize) -> Option<f64> {
        self.idf.get(term).copied()
    }

    pub fn len(&self) -> usize {
        self.idf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.idf.is_empty()
    }
}

/// One normalized tf-idf vector per stored question, aligned by position.
///
/// Read-only after [`VectorSpaceIndex::build`]; share it freely across
/// threads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorSpaceIndex {
    vocabulary: Vocabulary,
    weights: TermWeights,
    documents: Vec<SparseVector>,
}

impl VectorSpaceIndex {
    /// Build the vocabulary, term weights and document vectors
    pub fn build<S: AsRef<str>>(questions: &[S]) -> Result<Self> {
        if questions.is_empty() {
            return Err(IndexError::EmptyCorpus);
        }

        let tokenized: Vec<Vec<String>> = questions.iter().map(|q| tokenize(q.as_ref())).collect();

        let mut document_frequency: BTreeMap<&str, usize> = BTreeMap::new();
        for tokens in &tokenized {
            let unique: BTreeSet<&str> = tokens.iter().map(String::as_str).collect();
            for term in unique {
                *document_frequency.entry(term).or_default() += 1;
            }
        }

        if document_frequency.is_empty() {
            return Err(IndexError::EmptyVocabulary {
                documents: questions.len(),
            });
        }

        let n = questions.len();
        let mut terms = BTreeMap::new();
        let mut idf = Vec::with_capacity(document_frequency.len());
        for (index, (term, df)) in document_frequency.into_iter().enumerate() {
            terms.insert(term.to_string(), index);
            idf.push(TermWeights::smoothed_idf(n, df));
        }

        let vocabulary = Vocabulary { terms };
        let weights = TermWeights { idf };
        let documents = tokenized
            .iter()
            .map(|tokens| weigh(tokens, &vocabulary, &weights))
            .collect();

        debug!(documents = n, terms = vocabulary.len(), "built vector space index");

        Ok(Self {
            vocabulary,
            weights,
            documents,
        })
    }

    /// Embed `query` with the frozen vocabulary. Unknown terms are dropped;
    /// a query with no known term yields the zero vector.
    pub fn project(&self, query: &str) -> SparseVector {
        weigh(&tokenize(query), &self.vocabulary, &self.weights)
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn weights(&self) -> &TermWeights {
        &self.weights
    }

    pub fn documents(&self) -> &[SparseVector] {
        &self.documents
    }

    pub fn document(&self, index: usize) -> Option<&SparseVector> {
        self.documents.get(index)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Term counts × idf, L2-normalized
fn weigh(tokens: &[String], vocabulary: &Vocabulary, weights: &TermWeights) -> SparseVector {
    let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
    for token in tokens {
        if let Some(term) = vocabulary.get(token) {
            *counts.entry(term).or_default() += 1.0;
        }
    }

    SparseVector::from_sorted(
        counts
            .into_iter()
            .filter_map(|(term, tf)| weights.get(term).map(|idf| (term, tf * idf))),
    )
    .normalized()
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUESTIONS: [&str; 2] = ["How do I reset my password", "Why is my card declined"];

    #[test]
    fn test_empty_corpus_is_rejected() {
        let questions: Vec<String> = Vec::new();
        assert_eq!(
            VectorSpaceIndex::build(&questions).unwrap_err(),
            IndexError::EmptyCorpus
        );
    }

    #[test]
    fn test_corpus_without_terms_is_rejected() {
        assert_eq!(
            VectorSpaceIndex::build(&["?", "a b"]).unwrap_err(),
            IndexError::EmptyVocabulary { documents: 2 }
        );
    }

    #[test]
    fn test_vocabulary_is_sorted() {
        let index = VectorSpaceIndex::build(&QUESTIONS).unwrap();
        let terms: Vec<&str> = index.vocabulary().terms().collect();

        assert_eq!(
            terms,
            vec!["card", "declined", "do", "how", "is", "my", "password", "reset", "why"]
        );
        assert_eq!(index.vocabulary().get("card"), Some(0));
        assert_eq!(index.vocabulary().get("why"), Some(8));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_idf_weights() {
        let index = VectorSpaceIndex::build(&QUESTIONS).unwrap();
        let my = index.vocabulary().get("my").unwrap();
        let password = index.vocabulary().get("password").unwrap();

        assert!((index.weights().get(my).unwrap() - 1.0).abs() < 1e-12);
        let expected = (3.0f64 / 2.0).ln() + 1.0;
        assert!((index.weights().get(password).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_documents_are_normalized() {
        let index = VectorSpaceIndex::build(&QUESTIONS).unwrap();
        for document in index.documents() {
            assert!((document.norm() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_project_drops_unknown_terms() {
        let index = VectorSpaceIndex::build(&QUESTIONS).unwrap();

        let query = index.project("I forgot my password");
        assert_eq!(query.nnz(), 2);
        assert!((query.norm() - 1.0).abs() < 1e-12);

        assert!(index.project("completely unrelated words").is_zero());
        assert!(index.project("").is_zero());
    }

    #[test]
    fn test_project_does_not_grow_vocabulary() {
        let index = VectorSpaceIndex::build(&QUESTIONS).unwrap();
        let before = index.vocabulary().len();

        let _ = index.project("brand new vocabulary");
        assert_eq!(index.vocabulary().len(), before);
        assert!(!index.vocabulary().contains("brand"));
    }

    #[test]
    fn test_repeated_terms_raise_weight() {
        let index = VectorSpaceIndex::build(&QUESTIONS).unwrap();
        let card = index.vocabulary().get("card").unwrap();
        let declined = index.vocabulary().get("declined").unwrap();

        let query = index.project("card card declined");
        assert!((query.get(card) - 2.0 * query.get(declined)).abs() < 1e-12);
    }
}
