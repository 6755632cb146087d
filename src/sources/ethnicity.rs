//! Ethnicity vocabulary: lexical scoring only.

use crate::model::{TypeTag, VocabularyEntry};
use crate::reconcile::Candidate;
use crate::scoring::lexical_score;

/// Scores every ethnicity entry against `query`.
pub fn candidates(query: &str, entries: &[VocabularyEntry]) -> Vec<Candidate> {
    entries
        .iter()
        .map(|entry| {
            Candidate::new(
                TypeTag::Ethnicity.entity_id(entry.id),
                entry.label.clone(),
                TypeTag::Ethnicity,
                lexical_score(query, &entry.label),
                None,
            )
        })
        .collect()
}
