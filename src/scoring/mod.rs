//! Candidate scoring.
//!
//! Two independent strategies produce 0–100 scores:
//!
//! - [`lexical`]: edit-distance substring matching with positional decay,
//!   a generality boost and null-equivalence.
//! - [`semantic`]: cosine similarity of embeddings, maximized over providers
//!   and over the aliases of disjunctive labels.
//!
//! Callers fuse the two by maximum (see `reconcile::Candidate`).

pub mod error;
pub mod lexical;
pub mod semantic;


pub use error::ScoringError;
pub use lexical::{NULL_EQUIVALENTS, generality_boost, is_null_equivalent, lexical_score};
pub use semantic::{SemanticScorer, cosine_similarity, similarity_percent, split_aliases};
