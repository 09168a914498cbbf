//! Retrieval over the stored questions
//!
//! Questions are embedded as L2-normalized tf-idf vectors over a vocabulary
//! frozen at build time. Queries are projected into the same space and
//! compared by cosine similarity.

pub mod error;
pub mod index;
pub mod retrieval;
pub mod tokenizer;
pub mod vector;

pub use error::{IndexError, Result};
pub use index::{TermWeights, VectorSpaceIndex, Vocabulary};
pub use retrieval::{DEFAULT_THRESHOLD, Match, NoMatch, rank, retrieve};
pub use tokenizer::tokenize;
pub use vector::{SparseVector, cosine_similarity};
