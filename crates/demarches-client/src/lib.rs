//! Client for the demarches-simplifiees.fr GraphQL API.
//!
//! Entities ([`Dossier`], [`Demarche`]) fetch their data on first use, keep
//! the response, and only hit the API again when an accessor needs an
//! optional query section or the caller forces a refetch.
//!
//! # Quick Start
//!
//! ```no_run
//! use demarches_client::{Dossier, LazyRemoteEntity, Profile};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let profile = Profile::from_env()?;
//! let mut dossier = Dossier::new(12345, profile);
//!
//! println!("pdf: {}", dossier.get_pdf_url().await?);
//! for (label, value) in dossier.get_fields().await? {
//!     println!("{label} = {:?}", value.string_value);
//! }
//!
//! // Pick up server-side changes.
//! dossier.force_fetch().await?;
//! println!("state: {}", dossier.get_state().await?);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `DEMARCHES_API_URL` | GraphQL endpoint (default: `https://www.demarches-simplifiees.fr/api/v2/graphql`) |
//! | `DEMARCHES_API_TOKEN` | API token |
//! | `DEMARCHES_INSTRUCTEUR_ID` | Instructeur id for instructor-scoped data |
//! | `DEMARCHES_API_TIMEOUT` | Request timeout in seconds (default: 30) |
//! | `DEMARCHES_API_MAX_RETRIES` | Max retries for transient failures (default: 3) |

pub mod config;
pub mod demarche;
pub mod dossier;
pub mod error;
pub mod profile;
pub mod query;
pub mod remote;
pub mod request;
pub mod transport;

#[cfg(test)]
mod testing;

pub use config::ClientConfig;
pub use demarche::Demarche;
pub use dossier::{Dossier, DossierState, FieldMap, FieldValue, InstructeurInfo, Section};
pub use error::{DsError, DsResult, UnknownState};
pub use profile::Profile;
pub use query::Query;
pub use remote::{FetchState, LazyRemoteEntity, RemoteData};
pub use request::RequestBuilder;
pub use transport::{GraphqlRequest, HttpTransport, Transport, CLIENT_USER_AGENT};
