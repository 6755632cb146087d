use tracing::debug;

use super::error::SourceError;
use crate::model::TypeTag;
use crate::reconcile::Candidate;
use crate::scoring::{SemanticScorer, lexical_score};
use crate::terminology::{TerminologyClient, strip_markup};

/// Diagnoses from the external terminology, scored on their cleaned titles.
pub struct DiagnosisSource<T> {
    client: T,
    scorer: SemanticScorer,
}

impl<T> std::fmt::Debug for DiagnosisSource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosisSource")
            .field("scorer", &self.scorer)
            .finish_non_exhaustive()
    }
}

impl<T: TerminologyClient> DiagnosisSource<T> {
    pub fn new(client: T, scorer: SemanticScorer) -> Self {
        Self { client, scorer }
    }

    pub fn client(&self) -> &T {
        &self.client
    }

    pub fn scorer(&self) -> &SemanticScorer {
        &self.scorer
    }

    /// Searches the terminology for `query` and scores at most `limit` hits.
    ///
    /// Hits without an identifier cannot be reconciled and are skipped.
    pub async fn candidates(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Candidate>, SourceError> {
        let entities = self.client.search(query, limit).await?;

        let mut candidates = Vec::with_capacity(entities.len());
        for entity in entities {
            let Some(id) = entity.id else {
                debug!(title = %entity.title, "Skipping terminology hit without id");
                continue;
            };

            let title = strip_markup(&entity.title);
            let semantic = self.scorer.score(query, &title)?;
            let lexical = lexical_score(query, &title);

            candidates.push(Candidate::new(id, title, TypeTag::Diagnosis, lexical, semantic));
        }

        Ok(candidates)
    }
}
