//! Credentials and session shared by entities.

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::DsResult;
use crate::transport::{HttpTransport, Transport};

/// Connection profile: transport plus the optional instructeur identity.
///
/// Cloning is cheap and shares the underlying transport.
#[derive(Debug, Clone)]
pub struct Profile {
    transport: Arc<dyn Transport>,
    instructeur_id: Option<String>,
}

impl Profile {
    /// Build a profile talking HTTP to the configured endpoint.
    pub fn new(config: ClientConfig) -> DsResult<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(Arc::new(transport), config.instructeur_id))
    }

    pub fn from_env() -> DsResult<Self> {
        Self::new(ClientConfig::from_env())
    }

    /// Build a profile over any transport.
    pub fn with_transport(
        transport: Arc<dyn Transport>,
        instructeur_id: Option<String>,
    ) -> Self {
        Self {
            transport,
            instructeur_id,
        }
    }

    pub fn has_instructeur_id(&self) -> bool {
        self.instructeur_id.is_some()
    }

    pub fn instructeur_id(&self) -> Option<&str> {
        self.instructeur_id.as_deref()
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_from_config() {
        let profile = Profile::new(
            ClientConfig::default()
                .with_token("t")
                .with_instructeur_id("SW5zdHJ1Y3RldXI="),
        )
        .unwrap();
        assert!(profile.has_instructeur_id());
        assert_eq!(profile.instructeur_id(), Some("SW5zdHJ1Y3RldXI="));

        let anonymous = Profile::new(ClientConfig::default()).unwrap();
        assert!(!anonymous.has_instructeur_id());
    }

    #[test]
    fn test_profile_rejects_invalid_url() {
        assert!(Profile::new(ClientConfig::default().with_url("::nope")).is_err());
    }
}
