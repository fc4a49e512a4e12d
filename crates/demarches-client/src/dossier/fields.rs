//! Field, annotation and instructeur records read from a dossier.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DsError, DsResult};

/// Value of one champ or annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValue {
    pub id: String,

    /// Display value; the API sends `null` for empty champs.
    #[serde(rename = "stringValue", default)]
    pub string_value: Option<String>,
}

/// Champs or annotations keyed by label.
pub type FieldMap = BTreeMap<String, FieldValue>;

/// Instructeur assigned to a dossier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructeurInfo {
    pub id: String,
    pub email: String,
}

/// Optional parts of the dossier query, each behind an `include*` variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Champs,
    Annotations,
    Instructeurs,
}

impl Section {
    /// Query variable enabling the section.
    pub fn variable(self) -> &'static str {
        match self {
            Self::Champs => "includeChamps",
            Self::Annotations => "includeAnotations",
            Self::Instructeurs => "includeInstructeurs",
        }
    }

    pub(crate) fn pointer(self) -> &'static str {
        match self {
            Self::Champs => "/dossier/champs",
            Self::Annotations => "/dossier/annotations",
            Self::Instructeurs => "/dossier/instructeurs",
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawField {
    label: String,
    #[serde(flatten)]
    value: FieldValue,
}

/// Build a label map. On duplicate labels the later entry wins.
pub(crate) fn field_map(raw: &Value, pointer: &str) -> DsResult<FieldMap> {
    let entries: Vec<RawField> =
        serde_json::from_value(raw.clone()).map_err(|e| DsError::InvalidResponse {
            message: format!("malformed `{}`: {}", pointer, e),
        })?;

    Ok(entries
        .into_iter()
        .map(|entry| (entry.label, entry.value))
        .collect())
}

pub(crate) fn instructeurs(raw: &Value) -> DsResult<Vec<InstructeurInfo>> {
    serde_json::from_value(raw.clone()).map_err(|e| DsError::InvalidResponse {
        message: format!("malformed `{}`: {}", Section::Instructeurs.pointer(), e),
    })
}
