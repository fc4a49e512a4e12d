//! Démarche (procedure) entity, on the same lazy pattern as [`Dossier`].

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::dossier::Dossier;
use crate::error::{DsError, DsResult};
use crate::profile::Profile;
use crate::query::Query;
use crate::remote::{str_at, value_at, LazyRemoteEntity, RemoteData};
use crate::request::RequestBuilder;

const INCLUDE_DOSSIERS: &str = "includeDossiers";
const AFTER: &str = "after";
const DOSSIERS: &str = "/demarche/dossiers";

#[derive(Debug, Deserialize)]
struct DossierConnection {
    nodes: Vec<DossierNode>,
    #[serde(rename = "pageInfo")]
    page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
struct DossierNode {
    number: i64,
}

#[derive(Debug, Deserialize)]
struct PageInfo {
    #[serde(rename = "hasNextPage")]
    has_next_page: bool,
    #[serde(rename = "endCursor", default)]
    end_cursor: Option<String>,
}

fn dossier_page(data: &Value) -> DsResult<DossierConnection> {
    let raw = value_at(data, DOSSIERS)?;
    serde_json::from_value(raw.clone()).map_err(|e| DsError::InvalidResponse {
        message: format!("malformed `{}`: {}", DOSSIERS, e),
    })
}

/// A démarche on demarches-simplifiees.fr.
#[derive(Debug, Clone)]
pub struct Demarche {
    number: i64,
    profile: Profile,
    dossier_numbers: Option<Vec<i64>>,
    remote: RemoteData,
}

impl Demarche {
    pub fn new(number: i64, profile: Profile) -> Self {
        let request = RequestBuilder::new(profile.clone(), Query::Demarche);
        Self::with_request(number, profile, request)
    }

    pub fn with_request(number: i64, profile: Profile, mut request: RequestBuilder) -> Self {
        request.add_variable("demarcheNumber", number);
        debug!(demarche_number = number, "demarche created");

        Self {
            number,
            profile,
            dossier_numbers: None,
            remote: RemoteData::new(request),
        }
    }

    pub fn get_number(&self) -> i64 {
        self.number
    }

    pub async fn get_id(&mut self) -> DsResult<String> {
        str_at(self.get_data().await?, "/demarche/id")
    }

    pub async fn get_title(&mut self) -> DsResult<String> {
        str_at(self.get_data().await?, "/demarche/title")
    }

    /// Raw `demarche.state` value.
    pub async fn get_state(&mut self) -> DsResult<Value> {
        Ok(value_at(self.get_data().await?, "/demarche/state")?.clone())
    }

    /// Numbers of every dossier of the démarche; fetched once, then memoized.
    ///
    /// Walks the `dossiers` connection page by page until `hasNextPage` is
    /// false. The cached response afterwards is the last page's.
    pub async fn get_dossier_numbers(&mut self) -> DsResult<&[i64]> {
        match self.dossier_numbers {
            Some(ref numbers) => Ok(numbers.as_slice()),
            None => {
                self.remote.request_mut().add_variable(INCLUDE_DOSSIERS, true);
                self.remote.request_mut().remove_variable(AFTER);
                let result = self.fetch_dossier_pages().await;
                self.remote.request_mut().remove_variable(AFTER);
                let numbers = result?;

                debug!(
                    demarche_number = self.number,
                    count = numbers.len(),
                    "listed dossiers"
                );
                Ok(self.dossier_numbers.insert(numbers).as_slice())
            }
        }
    }

    async fn fetch_dossier_pages(&mut self) -> DsResult<Vec<i64>> {
        let mut numbers = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let data = self.remote.refetch().await?;
            let page = dossier_page(data)?;
            numbers.extend(page.nodes.into_iter().map(|node| node.number));

            if !page.page_info.has_next_page {
                return Ok(numbers);
            }
            let next = match page.page_info.end_cursor {
                Some(next) if cursor.as_deref() != Some(next.as_str()) => next,
                _ => {
                    return Err(DsError::InvalidResponse {
                        message: format!(
                            "`{}/pageInfo` reports a next page without a new cursor",
                            DOSSIERS
                        ),
                    })
                }
            };

            debug!(
                demarche_number = self.number,
                fetched = numbers.len(),
                "fetching next dossier page"
            );
            self.remote.request_mut().add_variable(AFTER, next.clone());
            cursor = Some(next);
        }
    }

    /// Unfetched dossiers sharing this démarche's profile.
    pub async fn get_dossiers(&mut self) -> DsResult<Vec<Dossier>> {
        let profile = self.profile.clone();
        Ok(self
            .get_dossier_numbers()
            .await?
            .iter()
            .map(|number| Dossier::new(*number, profile.clone()))
            .collect())
    }
}

impl LazyRemoteEntity for Demarche {
    fn remote(&self) -> &RemoteData {
        &self.remote
    }

    fn remote_mut(&mut self) -> &mut RemoteData {
        &mut self.remote
    }
}
