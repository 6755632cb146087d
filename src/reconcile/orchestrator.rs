use std::collections::HashSet;

use futures_util::{StreamExt, stream};
use tracing::{debug, info, instrument, warn};

use super::types::{
    Candidate, Query, QueryBatch, QueryResult, QueryScope, ReconciliationResult, SourceFailure,
};
use crate::model::{TypeTag, VocabularyEntry};
use crate::sources::{DiagnosisSource, SexualOrientationSource, SourceError, ethnicity};
use crate::store::ReferenceStore;
use crate::terminology::TerminologyClient;

/// Vocabulary tables read once per batch.
///
/// A table no query needs is never read and stays empty.
#[derive(Debug, Default)]
struct VocabularySnapshot {
    ethnicities: Option<Result<Vec<VocabularyEntry>, SourceError>>,
    sexual_orientations: Option<Result<Vec<VocabularyEntry>, SourceError>>,
}

impl VocabularySnapshot {
    fn table(&self, tag: TypeTag) -> Result<&[VocabularyEntry], SourceError> {
        let table = match tag {
            TypeTag::Ethnicity => self.ethnicities.as_ref(),
            TypeTag::SexualOrientation => self.sexual_orientations.as_ref(),
            TypeTag::Diagnosis => None,
        };

        match table {
            Some(Ok(entries)) => Ok(entries.as_slice()),
            Some(Err(e)) => Err(e.clone()),
            None => Ok(&[][..]),
        }
    }
}

/// Dispatches each query of a batch to its sources and ranks the candidates.
pub struct Reconciler<S, T> {
    store: S,
    sexual_orientation: SexualOrientationSource,
    diagnosis: DiagnosisSource<T>,
    max_concurrent_queries: usize,
}

impl<S, T> std::fmt::Debug for Reconciler<S, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("sexual_orientation", &self.sexual_orientation)
            .field("diagnosis", &self.diagnosis)
            .field("max_concurrent_queries", &self.max_concurrent_queries)
            .finish_non_exhaustive()
    }
}

impl<S, T> Reconciler<S, T>
where
    S: ReferenceStore,
    T: TerminologyClient,
{
    pub fn new(
        store: S,
        sexual_orientation: SexualOrientationSource,
        diagnosis: DiagnosisSource<T>,
        max_concurrent_queries: usize,
    ) -> Self {
        Self {
            store,
            sexual_orientation,
            diagnosis,
            max_concurrent_queries: max_concurrent_queries.max(1),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn sexual_orientation(&self) -> &SexualOrientationSource {
        &self.sexual_orientation
    }

    pub fn diagnosis(&self) -> &DiagnosisSource<T> {
        &self.diagnosis
    }

    /// Reconciles every query of `batch`.
    ///
    /// Never fails as a whole: a source that cannot be consulted is reported in
    /// that query's `errors` and the other sources' candidates are kept.
    #[instrument(skip(self, batch), fields(queries = batch.len()))]
    pub async fn reconcile(&self, batch: QueryBatch) -> ReconciliationResult {
        let snapshot = self.snapshot(&batch).await;

        let pending: Vec<_> = batch
            .into_iter()
            .map(|(key, query)| self.reconcile_entry(key, query, &snapshot))
            .collect();

        let results: ReconciliationResult = stream::iter(pending)
            .buffered(self.max_concurrent_queries)
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .collect();

        let candidates: usize = results.values().map(|r| r.result.len()).sum();
        let failures: usize = results.values().map(|r| r.errors.len()).sum();
        info!(
            queries = results.len(),
            candidates,
            failures,
            "Reconciliation batch complete"
        );

        results
    }

    async fn snapshot(&self, batch: &QueryBatch) -> VocabularySnapshot {
        let needs = |tag: TypeTag| {
            batch
                .values()
                .any(|q| !q.text.is_empty() && q.scope.includes(tag))
        };

        let mut snapshot = VocabularySnapshot::default();
        if needs(TypeTag::Ethnicity) {
            snapshot.ethnicities =
                Some(self.store.ethnicities().await.map_err(SourceError::from));
        }
        if needs(TypeTag::SexualOrientation) {
            snapshot.sexual_orientations = Some(
                self.store
                    .sexual_orientations()
                    .await
                    .map_err(SourceError::from),
            );
        }
        snapshot
    }

    async fn reconcile_entry(
        &self,
        key: String,
        query: Query,
        snapshot: &VocabularySnapshot,
    ) -> (String, QueryResult) {
        let result = self.reconcile_query(&query, snapshot).await;
        debug!(
            key = %key,
            candidates = result.result.len(),
            errors = result.errors.len(),
            "Query reconciled"
        );
        (key, result)
    }

    async fn reconcile_query(&self, query: &Query, snapshot: &VocabularySnapshot) -> QueryResult {
        let mut outcome = QueryResult::default();

        if let QueryScope::Unrecognized(type_id) = &query.scope {
            outcome.errors.push(SourceFailure {
                type_id: type_id.clone(),
                message: SourceError::UnsupportedType(type_id.clone()).to_string(),
            });
            return outcome;
        }

        if query.text.is_empty() {
            return outcome;
        }

        let mut working = Vec::new();
        for &tag in query.scope.tags() {
            match self.consult(tag, query, snapshot).await {
                Ok(candidates) => working.extend(candidates),
                Err(e) => {
                    warn!(type_id = tag.id(), error = %e, "Candidate source failed");
                    outcome.errors.push(SourceFailure {
                        type_id: tag.id().to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        outcome.result = rank(working, query.limit);
        outcome
    }

    async fn consult(
        &self,
        tag: TypeTag,
        query: &Query,
        snapshot: &VocabularySnapshot,
    ) -> Result<Vec<Candidate>, SourceError> {
        match tag {
            TypeTag::Ethnicity => Ok(ethnicity::candidates(&query.text, snapshot.table(tag)?)),
            TypeTag::SexualOrientation => self
                .sexual_orientation
                .candidates(&query.text, snapshot.table(tag)?),
            TypeTag::Diagnosis => self.diagnosis.candidates(&query.text, query.limit).await,
        }
    }
}

/// Drops repeated ids (first occurrence wins), sorts by fused score
/// descending (stable) and keeps the first `limit`.
pub fn rank(candidates: Vec<Candidate>, limit: usize) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    let mut ranked: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| seen.insert(c.id.clone()))
        .collect();

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(limit);
    ranked
}
