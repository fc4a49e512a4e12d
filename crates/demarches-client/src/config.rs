//! Client configuration.

use serde::{Deserialize, Serialize};

use crate::error::{DsError, DsResult};

/// Connection settings for the GraphQL API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// GraphQL endpoint.
    #[serde(default = "default_api_url")]
    pub url: String,

    /// API token.
    #[serde(default)]
    pub token: Option<String>,

    /// Instructeur id used by instructor-scoped queries.
    #[serde(default)]
    pub instructeur_id: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries for transient failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_api_url() -> String {
    "https://www.demarches-simplifiees.fr/api/v2/graphql".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            token: None,
            instructeur_id: None,
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl ClientConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `DEMARCHES_API_URL` | GraphQL endpoint |
    /// | `DEMARCHES_API_TOKEN` | API token |
    /// | `DEMARCHES_INSTRUCTEUR_ID` | Instructeur id |
    /// | `DEMARCHES_API_TIMEOUT` | Request timeout in seconds |
    /// | `DEMARCHES_API_MAX_RETRIES` | Max retries for transient failures |
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("DEMARCHES_API_URL").unwrap_or_else(|_| default_api_url()),
            token: non_empty_var("DEMARCHES_API_TOKEN"),
            instructeur_id: non_empty_var("DEMARCHES_INSTRUCTEUR_ID"),
            timeout_secs: std::env::var("DEMARCHES_API_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_timeout),
            max_retries: std::env::var("DEMARCHES_API_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_max_retries),
        }
    }

    /// Set the token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the endpoint URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the instructeur id.
    pub fn with_instructeur_id(mut self, id: impl Into<String>) -> Self {
        self.instructeur_id = Some(id.into());
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Check the endpoint is an absolute http(s) URL.
    pub fn validate(&self) -> DsResult<()> {
        let parsed = url::Url::parse(&self.url).map_err(|e| DsError::Config {
            message: format!("invalid API url {:?}: {}", self.url, e),
        })?;
        match parsed.scheme() {
            "http" | "https" => Ok(()),
            other => Err(DsError::Config {
                message: format!("unsupported API url scheme: {}", other),
            }),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
