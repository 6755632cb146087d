//! Decoding of the `queries` form field.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::error::ReconcileError;
use super::types::{Query, QueryBatch, QueryScope};
use crate::constants::DEFAULT_QUERY_LIMIT;

#[derive(Deserialize)]
struct RawQuery {
    #[serde(default)]
    query: String,
    #[serde(default)]
    limit: Option<i64>,
    #[serde(default, rename = "type")]
    type_id: Option<String>,
}

/// Parses `{"q0": {"query": "...", "limit": 3, "type": "/ethnicity"}, ...}`.
///
/// Fails on malformed JSON, an empty object, or a non-positive limit.
pub fn parse_queries(raw: &str) -> Result<QueryBatch, ReconcileError> {
    let decoded: BTreeMap<String, RawQuery> = serde_json::from_str(raw)
        .map_err(|e| ReconcileError::malformed(format!("invalid queries JSON: {e}")))?;

    if decoded.is_empty() {
        return Err(ReconcileError::malformed("no queries in batch"));
    }

    decoded
        .into_iter()
        .map(|(key, raw)| {
            let limit = match raw.limit {
                None => DEFAULT_QUERY_LIMIT,
                Some(n) if n > 0 => usize::try_from(n).unwrap_or(usize::MAX),
                Some(n) => {
                    return Err(ReconcileError::malformed(format!(
                        "query '{key}' has non-positive limit {n}"
                    )));
                }
            };

            let query = Query {
                text: raw.query.trim().to_string(),
                limit,
                scope: QueryScope::from_type(raw.type_id.as_deref()),
            };
            Ok((key, query))
        })
        .collect()
}
