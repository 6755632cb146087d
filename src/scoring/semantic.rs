//! Embedding-based similarity fused across providers.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::error::ScoringError;
use crate::embedding::SharedProvider;

static PARENTHESIZED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^)]*\)").unwrap());
static OR_CONNECTOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bor\b").unwrap());

/// Cosine of the angle between `a` and `b`, in `[-1, 1]`.
///
/// A zero-norm vector has no direction and scores 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Cosine similarity as a percentage clamped to `[0, 100]`.
pub fn similarity_percent(cosine: f32) -> f64 {
    (f64::from(cosine) * 100.0).clamp(0.0, 100.0)
}

/// Expands a disjunctive label ("Gay or Lesbian") into lowercase aliases.
///
/// Parenthesized content is dropped before splitting on the word `or`. A label
/// that leaves no alias falls back to its whole lowercased form.
pub fn split_aliases(label: &str) -> Vec<String> {
    let lowered = label.to_lowercase();
    let cleaned = PARENTHESIZED.replace_all(&lowered, " ");

    let aliases: Vec<String> = OR_CONNECTOR
        .split(&cleaned)
        .map(|alias| alias.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|alias| !alias.is_empty())
        .collect();

    if aliases.is_empty() {
        vec![lowered.trim().to_string()]
    } else {
        aliases
    }
}

/// Maximum cosine similarity over a set of embedding providers.
#[derive(Clone, Default)]
pub struct SemanticScorer {
    providers: Vec<SharedProvider>,
}

impl std::fmt::Debug for SemanticScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticScorer")
            .field(
                "providers",
                &self.providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl SemanticScorer {
    pub fn new(providers: Vec<SharedProvider>) -> Self {
        Self { providers }
    }

    /// Returns `true` if no provider is configured, in which case every score is `None`.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Returns `true` if any provider is a deterministic stub.
    pub fn uses_stub(&self) -> bool {
        self.providers.iter().any(|p| p.is_stub())
    }

    /// Semantic similarity of `query` and `candidate`, or `None` without providers.
    pub fn score(&self, query: &str, candidate: &str) -> Result<Option<f64>, ScoringError> {
        self.score_best(query, &[candidate])
    }

    /// Best similarity of `query` against any of `candidates`, across all providers.
    pub fn score_best<S: AsRef<str>>(
        &self,
        query: &str,
        candidates: &[S],
    ) -> Result<Option<f64>, ScoringError> {
        if self.providers.is_empty() || candidates.is_empty() {
            return Ok(None);
        }

        let mut best: Option<f64> = None;
        for provider in &self.providers {
            let query_vec = provider.encode(query)?;

            for candidate in candidates {
                let candidate_vec = provider.encode(candidate.as_ref())?;
                if candidate_vec.len() != query_vec.len() {
                    return Err(ScoringError::DimensionMismatch {
                        provider: provider.name().to_string(),
                        query: query_vec.len(),
                        candidate: candidate_vec.len(),
                    });
                }

                let percent = similarity_percent(cosine_similarity(&query_vec, &candidate_vec));
                best = Some(best.map_or(percent, |b| b.max(percent)));
            }
        }

        debug!(
            query_len = query.len(),
            candidates = candidates.len(),
            score = ?best,
            "Semantic score computed"
        );

        Ok(best)
    }
}
