//! NHS data dictionary categories loaded into the in-memory store.

use crate::model::VocabularyEntry;

/// First `ethnicityid` of the seeded table.
pub const ETHNICITY_ID_BASE: i64 = 5000;

/// First `soid` of the seeded table.
pub const SEXUAL_ORIENTATION_ID_BASE: i64 = 3000;

pub const ETHNICITY_LABELS: [&str; 18] = [
    "White - British",
    "White - Irish",
    "White - Any other White background",
    "Mixed - White and Black Caribbean",
    "Mixed - White and Black African",
    "Mixed - White and Asian",
    "Mixed - Any other mixed background",
    "Asian or Asian British - Indian",
    "Asian or Asian British - Pakistani",
    "Asian or Asian British - Bangladeshi",
    "Asian or Asian British - Any other Asian background",
    "Black or Black British - Caribbean",
    "Black or Black British - African",
    "Black or Black British - Any other Black background",
    "Other Ethnic Groups - Chinese",
    "Other Ethnic Groups - Any other ethnic group",
    "Not stated",
    "Not known",
];

pub const SEXUAL_ORIENTATION_LABELS: [&str; 6] = [
    "Straight or Heterosexual",
    "Gay or Lesbian",
    "Bisexual",
    "All other sexual orientations",
    "Not answered",
    "Does not apply",
];

fn numbered(base: i64, labels: &[&str]) -> Vec<VocabularyEntry> {
    labels
        .iter()
        .zip(base..)
        .map(|(label, id)| VocabularyEntry::new(id, *label))
        .collect()
}

pub fn ethnicity_entries() -> Vec<VocabularyEntry> {
    numbered(ETHNICITY_ID_BASE, &ETHNICITY_LABELS)
}

pub fn sexual_orientation_entries() -> Vec<VocabularyEntry> {
    numbered(SEXUAL_ORIENTATION_ID_BASE, &SEXUAL_ORIENTATION_LABELS)
}
