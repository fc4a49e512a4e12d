//! Dossier (case file) entity.
//!
//! Base data (id, number, state, démarche, pdf, usager) comes from the first
//! fetch. Champs, annotations and instructeurs are optional query sections:
//! their accessors enable the section variable, force a refetch and memoize
//! the parsed result.

use serde_json::Value;
use tracing::{debug, warn};

use crate::demarche::Demarche;
use crate::error::DsResult;
use crate::profile::Profile;
use crate::query::Query;
use crate::remote::{i64_at, str_at, value_at, LazyRemoteEntity, RemoteData};
use crate::request::RequestBuilder;

mod fields;
mod state;

pub use fields::{FieldMap, FieldValue, InstructeurInfo, Section};
pub use state::DossierState;

/// A dossier on demarches-simplifiees.fr.
#[derive(Debug, Clone)]
pub struct Dossier {
    id: Option<String>,
    number: i64,
    profile: Profile,
    fields: Option<FieldMap>,
    annotations: Option<FieldMap>,
    instructeurs: Option<Vec<InstructeurInfo>>,
    remote: RemoteData,
}

impl Dossier {
    pub fn new(number: i64, profile: Profile) -> Self {
        let request = RequestBuilder::new(profile.clone(), Query::Dossier);
        Self::with_request(number, profile, None, request)
    }

    /// Dossier whose GraphQL id is already known; `get_id` will not fetch.
    pub fn with_id(number: i64, profile: Profile, id: impl Into<String>) -> Self {
        let request = RequestBuilder::new(profile.clone(), Query::Dossier);
        Self::with_request(number, profile, Some(id.into()), request)
    }

    /// Dossier over a caller-supplied request builder.
    ///
    /// `dossierNumber` is bound on the builder here.
    pub fn with_request(
        number: i64,
        profile: Profile,
        id: Option<String>,
        mut request: RequestBuilder,
    ) -> Self {
        request.add_variable("dossierNumber", number);

        debug!(dossier_number = number, "dossier created");
        if !profile.has_instructeur_id() {
            warn!(
                dossier_number = number,
                "no instructeur id on the profile, some features will be missing"
            );
        }

        Self {
            id,
            number,
            profile,
            fields: None,
            annotations: None,
            instructeurs: None,
            remote: RemoteData::new(request),
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Enable an optional section for every later fetch.
    ///
    /// Returns `true` if the section was not enabled before. Does not fetch.
    pub fn include_section(&mut self, section: Section) -> bool {
        let request = self.remote.request_mut();
        let newly = request.variable(section.variable()) != Some(&Value::Bool(true));
        request.add_variable(section.variable(), true);
        newly
    }

    pub fn is_section_included(&self, section: Section) -> bool {
        self.remote.request().variable(section.variable()) == Some(&Value::Bool(true))
    }

    /// Include `section`, refetch, and return its raw value.
    async fn fetch_section(&mut self, section: Section) -> DsResult<&Value> {
        self.include_section(section);
        debug!(
            dossier_number = self.number,
            section = section.variable(),
            "fetching dossier section"
        );
        let data = self.remote.refetch().await?;
        value_at(data, section.pointer())
    }

    pub async fn get_id(&mut self) -> DsResult<String> {
        match self.id {
            Some(ref id) => Ok(id.clone()),
            None => str_at(self.get_data().await?, "/dossier/id"),
        }
    }

    pub fn get_number(&self) -> i64 {
        self.number
    }

    /// Raw `dossier.state` value; see [`Dossier::get_state`].
    pub async fn get_dossier_state(&mut self) -> DsResult<Value> {
        Ok(value_at(self.get_data().await?, "/dossier/state")?.clone())
    }

    /// State translated through [`DossierState::get_from_string`].
    pub async fn get_state(&mut self) -> DsResult<DossierState> {
        let data = self.get_data().await?;
        let raw = str_at(data, "/dossier/state")?;
        Ok(DossierState::get_from_string(&raw)?)
    }

    pub async fn get_attached_demarche_id(&mut self) -> DsResult<String> {
        str_at(self.get_data().await?, "/dossier/demarche/id")
    }

    /// A fresh, unfetched démarche sharing this dossier's profile.
    pub async fn get_attached_demarche(&mut self) -> DsResult<Demarche> {
        let number = i64_at(self.get_data().await?, "/dossier/demarche/number")?;
        Ok(Demarche::new(number, self.profile.clone()))
    }

    /// Instructeurs, fetched once and then memoized.
    ///
    /// Later refetches triggered by other sections do not update this list;
    /// use [`Dossier::refresh_instructeurs`] for that.
    pub async fn get_attached_instructeurs_info(&mut self) -> DsResult<&[InstructeurInfo]> {
        match self.instructeurs {
            Some(ref list) => Ok(list.as_slice()),
            None => self.refresh_instructeurs().await,
        }
    }

    /// Refetch and replace the memoized instructeurs.
    pub async fn refresh_instructeurs(&mut self) -> DsResult<&[InstructeurInfo]> {
        let list = fields::instructeurs(self.fetch_section(Section::Instructeurs).await?)?;
        Ok(self.instructeurs.insert(list).as_slice())
    }

    pub async fn get_pdf_url(&mut self) -> DsResult<String> {
        str_at(self.get_data().await?, "/dossier/pdf/url")
    }

    /// Champs keyed by label. Duplicate labels: the later champ wins.
    pub async fn get_fields(&mut self) -> DsResult<&FieldMap> {
        match self.fields {
            Some(ref fields) => Ok(fields),
            None => {
                let raw = self.fetch_section(Section::Champs).await?;
                let fields = fields::field_map(raw, Section::Champs.pointer())?;
                Ok(self.fields.insert(fields))
            }
        }
    }

    /// Private annotations keyed by label, same collision policy as champs.
    pub async fn get_annotations(&mut self) -> DsResult<&FieldMap> {
        match self.annotations {
            Some(ref annotations) => Ok(annotations),
            None => {
                let raw = self.fetch_section(Section::Annotations).await?;
                let annotations = fields::field_map(raw, Section::Annotations.pointer())?;
                Ok(self.annotations.insert(annotations))
            }
        }
    }

    /// Multi-line summary with id, number and usager email.
    ///
    /// Read from the response, not from constructor values.
    pub async fn summary(&mut self) -> DsResult<String> {
        let data = self.get_data().await?;
        let id = str_at(data, "/dossier/id")?;
        let number = i64_at(data, "/dossier/number")?;
        let email = str_at(data, "/dossier/usager/email")?;
        Ok(format!(
            "Dossier id : {}\nDossier number {}\n({})",
            id, number, email
        ))
    }
}

impl LazyRemoteEntity for Dossier {
    fn remote(&self) -> &RemoteData {
        &self.remote
    }

    fn remote_mut(&mut self) -> &mut RemoteData {
        &mut self.remote
    }
}
