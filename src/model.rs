//! Domain records shared by the scoring, store, reconcile and update layers.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// The three reconcilable entity types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeTag {
    Ethnicity,
    SexualOrientation,
    Diagnosis,
}

/// `{ id, name }` pair used in manifests and candidate `type` arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TypeRef {
    pub id: &'static str,
    pub name: &'static str,
}

/// Table/column pair a correction for a given [`TypeTag`] is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateTarget {
    pub table: &'static str,
    pub column: &'static str,
}

struct TypeSpec {
    tag: TypeTag,
    id: &'static str,
    name: &'static str,
    target: UpdateTarget,
}

const TYPE_TABLE: [TypeSpec; 3] = [
    TypeSpec {
        tag: TypeTag::Ethnicity,
        id: "/ethnicity",
        name: "Ethnicity",
        target: UpdateTarget {
            table: "patient",
            column: "ethnicity",
        },
    },
    TypeSpec {
        tag: TypeTag::SexualOrientation,
        id: "/sexual-orientation",
        name: "Sexual Orientation",
        target: UpdateTarget {
            table: "patient",
            column: "sexual_orientation",
        },
    },
    TypeSpec {
        tag: TypeTag::Diagnosis,
        id: "/icd11",
        name: "Diagnosis",
        target: UpdateTarget {
            table: "registration",
            column: "reason_for_admission",
        },
    },
];

impl TypeTag {
    /// Every tag, in the order adapters are consulted for untyped queries.
    pub const ALL: [TypeTag; 3] = [
        TypeTag::Ethnicity,
        TypeTag::SexualOrientation,
        TypeTag::Diagnosis,
    ];

    fn spec(self) -> &'static TypeSpec {
        match self {
            TypeTag::Ethnicity => &TYPE_TABLE[0],
            TypeTag::SexualOrientation => &TYPE_TABLE[1],
            TypeTag::Diagnosis => &TYPE_TABLE[2],
        }
    }

    /// Protocol type id, e.g. `/sexual-orientation`.
    pub fn id(self) -> &'static str {
        self.spec().id
    }

    /// Human-readable name, e.g. `Sexual Orientation`.
    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn type_ref(self) -> TypeRef {
        TypeRef {
            id: self.id(),
            name: self.name(),
        }
    }

    /// Where corrections of this type are persisted.
    pub fn update_target(self) -> UpdateTarget {
        self.spec().target
    }

    /// Resolves a protocol type id. Unknown ids return `None`.
    pub fn from_id(id: &str) -> Option<Self> {
        TYPE_TABLE
            .iter()
            .find(|spec| spec.id == id.trim())
            .map(|spec| spec.tag)
    }

    /// Namespaced candidate id for a vocabulary row, e.g. `/ethnicity/5003`.
    pub fn entity_id(self, row_id: i64) -> String {
        format!("{}/{}", self.id(), row_id)
    }

    /// Splits a namespaced vocabulary id back into its tag and row id.
    pub fn parse_entity_id(entity_id: &str) -> Option<(Self, i64)> {
        let (prefix, row) = entity_id.rsplit_once('/')?;
        let tag = Self::from_id(prefix)?;
        let row_id = row.parse().ok()?;
        Some((tag, row_id))
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for TypeTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s).ok_or_else(|| s.to_string())
    }
}

/// One row of a controlled vocabulary table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyEntry {
    pub id: i64,
    pub label: String,
}

impl VocabularyEntry {
    pub fn new(id: i64, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}

/// A single-field correction keyed by subject (patient) id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateRow {
    #[serde(rename = "patientid")]
    pub subject_id: i64,
    #[serde(rename = "updated_field")]
    pub column: String,
    #[serde(rename = "new_value")]
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_ids_round_trip() {
        for tag in TypeTag::ALL {
            assert_eq!(TypeTag::from_id(tag.id()), Some(tag));
        }
        assert_eq!(TypeTag::from_id("/name"), None);
        assert_eq!(TypeTag::from_id(""), None);
    }

    #[test]
    fn test_update_targets() {
        assert_eq!(
            TypeTag::Ethnicity.update_target(),
            UpdateTarget {
                table: "patient",
                column: "ethnicity"
            }
        );
        assert_eq!(
            TypeTag::SexualOrientation.update_target().column,
            "sexual_orientation"
        );
        assert_eq!(
            TypeTag::Diagnosis.update_target(),
            UpdateTarget {
                table: "registration",
                column: "reason_for_admission"
            }
        );
    }

    #[test]
    fn test_entity_ids() {
        assert_eq!(TypeTag::Ethnicity.entity_id(5003), "/ethnicity/5003");
        assert_eq!(
            TypeTag::parse_entity_id("/sexual-orientation/3002"),
            Some((TypeTag::SexualOrientation, 3002))
        );
        assert_eq!(TypeTag::parse_entity_id("/ethnicity/abc"), None);
        assert_eq!(TypeTag::parse_entity_id("http://id.who.int/icd/entity/1"), None);
    }

    #[test]
    fn test_update_row_wire_names() {
        let row = UpdateRow {
            subject_id: 123,
            column: "ethnicity".to_string(),
            value: "Hispanic".to_string(),
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"patientid": 123, "updated_field": "ethnicity", "new_value": "Hispanic"})
        );
    }
}
