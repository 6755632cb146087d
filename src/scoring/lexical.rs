//! Edit-distance substring matching.
//!
//! The shorter string is slid across the longer one; each equal-length window
//! is scored by Levenshtein distance. Exact windows lose up to
//! [`POSITIONAL_DECAY`] points the further into the longer string they start,
//! and every window gets the same [`generality_boost`].

use crate::constants::{GENERALITY_BOOST, POSITIONAL_DECAY};

/// "No data" phrasings that all match each other exactly.
pub const NULL_EQUIVALENTS: &[&str] = &[
    "none",
    "n/a",
    "not applicable",
    "not answered",
    "not stated",
    "prefer not to say",
    "unknown",
    "don't know",
    "does not apply",
    "null",
    "missing",
    "no answer",
];

/// Returns `true` when both (already normalized) strings are null phrasings.
pub fn is_null_equivalent(a: &str, b: &str) -> bool {
    NULL_EQUIVALENTS.contains(&a) && NULL_EQUIVALENTS.contains(&b)
}

/// +5 when `longer` names `shorter` generically ("any x", "other x"), 0 when it
/// merely contains it, -5 when it does not contain it at all.
pub fn generality_boost(longer: &str, shorter: &str) -> f64 {
    if longer.contains(&format!("any {shorter}")) || longer.contains(&format!("other {shorter}"))
    {
        GENERALITY_BOOST
    } else if longer.contains(shorter) {
        0.0
    } else {
        -GENERALITY_BOOST
    }
}

/// Similarity of `query` and `candidate` on a 0–100 scale.
pub fn lexical_score(query: &str, candidate: &str) -> u8 {
    let query = query.trim().to_lowercase();
    let candidate = candidate.trim().to_lowercase();

    if query.is_empty() || candidate.is_empty() {
        return 0;
    }

    if is_null_equivalent(&query, &candidate) {
        return 100;
    }

    let (shorter, longer) = if query.chars().count() <= candidate.chars().count() {
        (query, candidate)
    } else {
        (candidate, query)
    };

    let longer_chars: Vec<char> = longer.chars().collect();
    let short_len = shorter.chars().count();
    let long_len = longer_chars.len();
    let boost = generality_boost(&longer, &shorter);

    let mut best = 0.0_f64;
    for start in 0..=(long_len - short_len) {
        let window: String = longer_chars[start..start + short_len].iter().collect();
        let distance = strsim::levenshtein(&shorter, &window);

        let base = if distance == 0 {
            100.0 - (start as f64 / long_len as f64) * POSITIONAL_DECAY
        } else {
            100.0 * (short_len - distance) as f64 / short_len as f64
        };

        best = best.max(base + boost);
    }

    best.round_ties_even().clamp(0.0, 100.0) as u8
}
