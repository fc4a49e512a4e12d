//! Dossier states and the wire-format mapping.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::UnknownState;

/// Canonical dossier states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DossierState {
    #[serde(rename = "Archiver")]
    Archive,
    #[serde(rename = "EnConstruction")]
    Construction,
    #[serde(rename = "EnInstruction")]
    Instruction,
    #[serde(rename = "Accepter")]
    Accepter,
    #[serde(rename = "Refuser")]
    Refuser,
    #[serde(rename = "ClasserSansSuite")]
    SansSuite,
}

impl DossierState {
    pub const ALL: [Self; 6] = [
        Self::Archive,
        Self::Construction,
        Self::Instruction,
        Self::Accepter,
        Self::Refuser,
        Self::SansSuite,
    ];

    /// Canonical label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Archive => "Archiver",
            Self::Construction => "EnConstruction",
            Self::Instruction => "EnInstruction",
            Self::Accepter => "Accepter",
            Self::Refuser => "Refuser",
            Self::SansSuite => "ClasserSansSuite",
        }
    }

    /// Translate a snake_case wire state.
    ///
    /// `Archive` has no wire spelling. Anything outside the five known inputs
    /// is `Err(UnknownState)`.
    pub fn get_from_string(value: &str) -> Result<Self, UnknownState> {
        match value {
            "en_construction" => Ok(Self::Construction),
            "en_instruction" => Ok(Self::Instruction),
            "accepter" => Ok(Self::Accepter),
            "refuser" => Ok(Self::Refuser),
            "sans_suite" => Ok(Self::SansSuite),
            other => {
                warn!(state = other, "unrecognized dossier state");
                Err(UnknownState {
                    value: other.to_string(),
                })
            }
        }
    }
}

/// Parses the wire spelling, not the label.
impl FromStr for DossierState {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::get_from_string(s)
    }
}

impl fmt::Display for DossierState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_wire_states() {
        let cases = [
            ("en_construction", DossierState::Construction, "EnConstruction"),
            ("en_instruction", DossierState::Instruction, "EnInstruction"),
            ("accepter", DossierState::Accepter, "Accepter"),
            ("refuser", DossierState::Refuser, "Refuser"),
            ("sans_suite", DossierState::SansSuite, "ClasserSansSuite"),
        ];
        for (wire, state, label) in cases {
            let parsed = DossierState::get_from_string(wire).unwrap();
            assert_eq!(parsed, state);
            assert_eq!(parsed.label(), label);
        }
    }

    #[test]
    fn test_unknown_state_is_explicit() {
        for input in ["", "EnConstruction", "archive", "EN_CONSTRUCTION", "accepté"] {
            let err = DossierState::get_from_string(input).unwrap_err();
            assert_eq!(err.value, input);
        }
    }

    #[test]
    fn test_from_str_and_display() {
        let state: DossierState = "sans_suite".parse().unwrap();
        assert_eq!(state.to_string(), "ClasserSansSuite");
        assert!("nope".parse::<DossierState>().is_err());
    }

    #[test]
    fn test_serde_uses_labels() {
        assert_eq!(
            serde_json::to_string(&DossierState::Archive).unwrap(),
            "\"Archiver\""
        );
        for state in DossierState::ALL {
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(json, format!("\"{}\"", state.label()));
        }
    }
}
