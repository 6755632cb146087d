use tracing::debug;

use super::error::SourceError;
use crate::model::{TypeTag, VocabularyEntry};
use crate::reconcile::Candidate;
use crate::scoring::{SemanticScorer, lexical_score, split_aliases};

/// Sexual orientation vocabulary: lexical on the whole label, semantic on its aliases.
#[derive(Debug, Clone, Default)]
pub struct SexualOrientationSource {
    scorer: SemanticScorer,
}

impl SexualOrientationSource {
    pub fn new(scorer: SemanticScorer) -> Self {
        Self { scorer }
    }

    pub fn scorer(&self) -> &SemanticScorer {
        &self.scorer
    }

    pub fn candidates(
        &self,
        query: &str,
        entries: &[VocabularyEntry],
    ) -> Result<Vec<Candidate>, SourceError> {
        let lowered = query.to_lowercase();

        let mut candidates = Vec::with_capacity(entries.len());
        for entry in entries {
            let aliases = split_aliases(&entry.label);
            let semantic = self.scorer.score_best(&lowered, &aliases)?;
            let lexical = lexical_score(query, &entry.label);

            debug!(
                label = %entry.label,
                lexical,
                semantic = ?semantic,
                "Scored sexual orientation entry"
            );

            candidates.push(Candidate::new(
                TypeTag::SexualOrientation.entity_id(entry.id),
                entry.label.clone(),
                TypeTag::SexualOrientation,
                lexical,
                semantic,
            ));
        }

        Ok(candidates)
    }
}
