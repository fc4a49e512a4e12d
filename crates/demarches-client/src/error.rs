//! Error types for the demarches-simplifiees client.

use std::time::Duration;

/// Client errors.
#[derive(Debug, thiserror::Error)]
pub enum DsError {
    /// Token rejected by the API (401/403).
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// Rate limit exceeded.
    #[error("rate limited: retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    /// Network error or non-success HTTP status.
    #[error("network error: {message}")]
    Network { message: String },

    /// The API answered with a GraphQL `errors` array.
    #[error("graphql error: {}", .messages.join("; "))]
    GraphQl { messages: Vec<String> },

    /// Response did not have the expected shape.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Wire-format dossier state outside the known set.
    #[error(transparent)]
    UnknownState(#[from] UnknownState),
}

impl DsError {
    /// Whether the error came from executing a request.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized { .. }
                | Self::RateLimited { .. }
                | Self::Network { .. }
                | Self::GraphQl { .. }
                | Self::InvalidResponse { .. }
        )
    }

    /// Whether the error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Network { .. })
    }

    pub(crate) fn missing(path: &str) -> Self {
        Self::InvalidResponse {
            message: format!("missing or malformed `{}` in response", path),
        }
    }
}

impl From<reqwest::Error> for DsError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
        }
    }
}

/// A wire-format state string with no canonical label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown dossier state: {value:?}")]
pub struct UnknownState {
    /// The unrecognised input.
    pub value: String,
}

/// Result type for client operations.
pub type DsResult<T> = Result<T, DsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification() {
        assert!(DsError::Network {
            message: "boom".into()
        }
        .is_transport());
        assert!(DsError::GraphQl { messages: vec![] }.is_transport());
        assert!(!DsError::Config {
            message: "bad".into()
        }
        .is_transport());
        assert!(!DsError::from(UnknownState {
            value: "x".into()
        })
        .is_transport());
    }

    #[test]
    fn test_graphql_message_joined() {
        let err = DsError::GraphQl {
            messages: vec!["a".into(), "b".into()],
        };
        assert_eq!(err.to_string(), "graphql error: a; b");
    }
}
