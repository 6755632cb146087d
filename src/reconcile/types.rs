use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use crate::constants::MATCH_THRESHOLD;
use crate::model::{TypeRef, TypeTag};

/// Which sources a query consults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryScope {
    /// No type given: every source.
    All,
    Only(TypeTag),
    /// A type id this service does not know; reported, never searched.
    Unrecognized(String),
}

impl QueryScope {
    /// Resolves the optional `type` field of a query.
    pub fn from_type(type_id: Option<&str>) -> Self {
        match type_id.map(str::trim).filter(|t| !t.is_empty()) {
            None => Self::All,
            Some(id) => TypeTag::from_id(id)
                .map_or_else(|| Self::Unrecognized(id.to_string()), Self::Only),
        }
    }

    /// Tags to consult, in source order.
    pub fn tags(&self) -> &[TypeTag] {
        match self {
            Self::All => &TypeTag::ALL,
            Self::Only(tag) => std::slice::from_ref(tag),
            Self::Unrecognized(_) => &[],
        }
    }

    pub fn includes(&self, tag: TypeTag) -> bool {
        self.tags().contains(&tag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub text: String,
    pub limit: usize,
    pub scope: QueryScope,
}

/// Queries of one request, keyed by the caller's correlation id.
pub type QueryBatch = BTreeMap<String, Query>;

/// One proposed match.
///
/// `score` and `matched` are computed from the unrounded semantic score.
/// Serialization rounds `semantic_score` to two decimals for display only.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub tag: TypeTag,
    pub lexical_score: u8,
    /// Full precision; rounded only on the wire.
    pub semantic_score: Option<f64>,
    /// `max(lexical, semantic)`; the lexical score alone when semantic is undefined.
    pub score: f64,
    pub matched: bool,
}

impl Candidate {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        tag: TypeTag,
        lexical_score: u8,
        semantic_score: Option<f64>,
    ) -> Self {
        let lexical = f64::from(lexical_score);
        let score = semantic_score.map_or(lexical, |semantic| semantic.max(lexical));

        Self {
            id: id.into(),
            name: name.into(),
            tag,
            lexical_score,
            semantic_score,
            score,
            matched: score >= MATCH_THRESHOLD,
        }
    }
}

#[derive(Serialize)]
struct CandidateWire<'a> {
    id: &'a str,
    name: &'a str,
    score: f64,
    #[serde(rename = "match")]
    matched: bool,
    #[serde(rename = "type")]
    types: [TypeRef; 1],
    lexical_score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    semantic_score: Option<f64>,
}

impl Serialize for Candidate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        CandidateWire {
            id: &self.id,
            name: &self.name,
            score: self.score,
            matched: self.matched,
            types: [self.tag.type_ref()],
            lexical_score: self.lexical_score,
            // Display rounding; `score` and `matched` keep full precision.
            semantic_score: self.semantic_score.map(|s| (s * 100.0).round() / 100.0),
        }
        .serialize(serializer)
    }
}

/// A source that could not be consulted for a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFailure {
    #[serde(rename = "type")]
    pub type_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryResult {
    pub result: Vec<Candidate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<SourceFailure>,
}

/// Response body: query key to ranked candidates.
pub type ReconciliationResult = BTreeMap<String, QueryResult>;
