//! Lazily-fetched remote data shared by the data-bearing entities.
//!
//! An entity owns one [`RemoteData`]: the request builder plus the last
//! response. The cache moves `Unfetched -> Fetched` on the first read and is
//! only replaced by an explicit [`RemoteData::refetch`]. Variables added to the
//! request in between accumulate, so one refetch returns every section asked
//! for so far.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::{DsError, DsResult};
use crate::request::RequestBuilder;

/// Observable cache state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Unfetched,
    Fetched,
}

/// Request builder plus memoized response.
#[derive(Debug, Clone)]
pub struct RemoteData {
    request: RequestBuilder,
    cached: Option<Value>,
}

impl RemoteData {
    pub fn new(request: RequestBuilder) -> Self {
        Self {
            request,
            cached: None,
        }
    }

    pub fn state(&self) -> FetchState {
        match self.cached {
            Some(_) => FetchState::Fetched,
            None => FetchState::Unfetched,
        }
    }

    pub fn cached(&self) -> Option<&Value> {
        self.cached.as_ref()
    }

    pub fn request(&self) -> &RequestBuilder {
        &self.request
    }

    pub fn request_mut(&mut self) -> &mut RequestBuilder {
        &mut self.request
    }

    /// Cached response, fetching it first if nothing is cached yet.
    pub async fn get(&mut self) -> DsResult<&Value> {
        match self.cached {
            Some(ref data) => Ok(data),
            None => self.refetch().await,
        }
    }

    /// Re-execute with the current variables and replace the cache.
    ///
    /// On error the previous cache is left as it was.
    pub async fn refetch(&mut self) -> DsResult<&Value> {
        debug!(
            operation = self.request.query().operation_name(),
            previously_fetched = self.cached.is_some(),
            "fetching remote data"
        );
        let data = self.request.execute().await?;
        Ok(self.cached.insert(data))
    }
}

/// Uniform fetch-once, reuse, force-refresh contract.
#[async_trait]
pub trait LazyRemoteEntity: Send {
    fn remote(&self) -> &RemoteData;

    fn remote_mut(&mut self) -> &mut RemoteData;

    /// Cached response, executing the request at most once.
    async fn get_data(&mut self) -> DsResult<&Value> {
        self.remote_mut().get().await
    }

    /// Unconditionally re-execute and return `self` for chaining.
    async fn force_fetch(&mut self) -> DsResult<&mut Self>
    where
        Self: Sized,
    {
        self.remote_mut().refetch().await?;
        Ok(self)
    }

    fn is_fetched(&self) -> bool {
        self.remote().state() == FetchState::Fetched
    }
}

/// Value at a JSON pointer; absent or `null` is an invalid response.
pub(crate) fn value_at<'a>(data: &'a Value, pointer: &str) -> DsResult<&'a Value> {
    data.pointer(pointer)
        .filter(|v| !v.is_null())
        .ok_or_else(|| DsError::missing(pointer))
}

pub(crate) fn str_at(data: &Value, pointer: &str) -> DsResult<String> {
    value_at(data, pointer)?
        .as_str()
        .map(String::from)
        .ok_or_else(|| DsError::missing(pointer))
}

pub(crate) fn i64_at(data: &Value, pointer: &str) -> DsResult<i64> {
    value_at(data, pointer)?
        .as_i64()
        .ok_or_else(|| DsError::missing(pointer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Query;
    use crate::testing::StubTransport;
    use serde_json::json;

    fn remote(stub: &StubTransport) -> RemoteData {
        RemoteData::new(RequestBuilder::new(stub.profile(true), Query::Dossier))
    }

    #[tokio::test]
    async fn test_get_executes_once() {
        let stub = StubTransport::returning(json!({"dossier": {"id": "a"}}));
        let mut data = remote(&stub);
        assert_eq!(data.state(), FetchState::Unfetched);

        data.get().await.unwrap();
        data.get().await.unwrap();

        assert_eq!(stub.call_count(), 1);
        assert_eq!(data.state(), FetchState::Fetched);
    }

    #[tokio::test]
    async fn test_refetch_always_executes_with_current_variables() {
        let stub = StubTransport::returning(json!({"dossier": {}}));
        let mut data = remote(&stub);

        data.get().await.unwrap();
        data.request_mut().add_variable("includeChamps", true);
        data.refetch().await.unwrap();
        data.refetch().await.unwrap();

        let sent = stub.requests();
        assert_eq!(sent.len(), 3);
        assert!(sent[0].variables.get("includeChamps").is_none());
        assert_eq!(sent[2].variables["includeChamps"], true);
    }

    #[tokio::test]
    async fn test_failed_refetch_keeps_previous_cache() {
        let calls = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = calls.clone();
        let stub = StubTransport::new(move |_| {
            if counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 0 {
                Ok(json!({"dossier": {"id": "first"}}))
            } else {
                Err(DsError::Network {
                    message: "connection reset".into(),
                })
            }
        });
        let mut data = remote(&stub);

        data.get().await.unwrap();
        assert!(data.refetch().await.is_err());
        assert_eq!(data.cached().unwrap()["dossier"]["id"], "first");
    }

    #[test]
    fn test_value_at_rejects_null_and_missing() {
        let data = json!({"dossier": {"pdf": null, "number": 3}});
        assert!(matches!(
            value_at(&data, "/dossier/pdf"),
            Err(DsError::InvalidResponse { .. })
        ));
        assert!(str_at(&data, "/dossier/id").is_err());
        assert_eq!(i64_at(&data, "/dossier/number").unwrap(), 3);
        assert!(str_at(&data, "/dossier/number").is_err());
    }
}
