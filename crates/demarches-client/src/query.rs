//! Fixed GraphQL query templates.

const DOSSIER_DATA: &str = include_str!("../queries/dossier_data.graphql");
const DEMARCHE_DATA: &str = include_str!("../queries/demarche_data.graphql");

/// The queries this client knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Query {
    /// Single dossier lookup by number.
    Dossier,
    /// Single démarche lookup by number.
    Demarche,
}

impl Query {
    pub fn template(self) -> &'static str {
        match self {
            Self::Dossier => DOSSIER_DATA,
            Self::Demarche => DEMARCHE_DATA,
        }
    }

    /// GraphQL operation name declared in the template.
    pub fn operation_name(self) -> &'static str {
        match self {
            Self::Dossier => "getDossier",
            Self::Demarche => "getDemarche",
        }
    }
}
