//! Sparse term vectors

use serde::{Deserialize, Serialize};

/// Term index → non-negative weight, sorted by term index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    /// Build from `(term, weight)` pairs; pairs must be sorted by term and
    /// unique. Zero weights are dropped.
    pub fn from_sorted(entries: impl IntoIterator<Item = (usize, f64)>) -> Self {
        let entries: Vec<(usize, f64)> = entries.into_iter().filter(|(_, w)| *w != 0.0).collect();
        debug_assert!(entries.windows(2).all(|pair| pair[0].0 < pair[1].0));
        Self { entries }
    }

    pub fn get(&self, term: usize) -> f64 {
        self.entries
            .binary_search_by_key(&term, |(t, _)| *t)
            .map_or(0.0, |i| self.entries[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
    }

    /// Scale to unit length; the zero vector stays zero
    pub fn normalized(mut self) -> Self {
        let norm = self.norm();
        if norm > 0.0 {
            for (_, w) in &mut self.entries {
                *w /= norm;
            }
        }
        self
    }

    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (a_term, a_weight) = self.entries[i];
            let (b_term, b_weight) = other.entries[j];
            match a_term.cmp(&b_term) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_weight * b_weight;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

/// Cosine of the angle between `a` and `b`; 0 when either is the zero vector
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f64 {
    let denom = a.norm() * b.norm();
    if denom == 0.0 {
        return 0.0;
    }
    a.dot(b) / denom
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_only_counts_shared_terms() {
        let a = SparseVector::from_sorted([(0, 1.0), (2, 2.0), (5, 3.0)]);
        let b = SparseVector::from_sorted([(2, 4.0), (3, 1.0), (5, 1.0)]);

        assert_eq!(a.dot(&b), 11.0);
        assert_eq!(b.dot(&a), 11.0);
    }

    #[test]
    fn test_normalized_has_unit_length() {
        let v = SparseVector::from_sorted([(1, 3.0), (4, 4.0)]).normalized();

        assert!((v.norm() - 1.0).abs() < 1e-12);
        assert!((v.get(1) - 0.6).abs() < 1e-12);
        assert_eq!(v.get(2), 0.0);
    }

    #[test]
    fn test_zero_vector() {
        let zero = SparseVector::default().normalized();
        let v = SparseVector::from_sorted([(0, 1.0)]);

        assert!(zero.is_zero());
        assert_eq!(cosine_similarity(&zero, &v), 0.0);
        assert_eq!(cosine_similarity(&zero, &zero), 0.0);
    }

    #[test]
    fn test_zero_weights_are_dropped() {
        let v = SparseVector::from_sorted([(0, 0.0), (1, 2.0)]);
        assert_eq!(v.nnz(), 1);
    }

    #[test]
    fn test_cosine_of_parallel_vectors() {
        let a = SparseVector::from_sorted([(0, 1.0), (1, 1.0)]);
        let b = SparseVector::from_sorted([(0, 2.0), (1, 2.0)]);

        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-12);
    }
}
