//! In-process transport stub for unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::DsResult;
use crate::profile::Profile;
use crate::transport::{GraphqlRequest, Transport};

type Responder = dyn Fn(&GraphqlRequest) -> DsResult<Value> + Send + Sync;

/// Records every request and answers through a closure.
#[derive(Clone)]
pub(crate) struct StubTransport {
    requests: Arc<Mutex<Vec<GraphqlRequest>>>,
    responder: Arc<Responder>,
}

impl std::fmt::Debug for StubTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StubTransport")
            .field("requests", &self.requests.lock().unwrap().len())
            .finish()
    }
}

impl StubTransport {
    pub(crate) fn new(
        responder: impl Fn(&GraphqlRequest) -> DsResult<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            responder: Arc::new(responder),
        }
    }

    pub(crate) fn returning(data: Value) -> Self {
        Self::new(move |_| Ok(data.clone()))
    }

    /// Serve `full` minus the sections whose `include*` flag is not set.
    pub(crate) fn sections(full: Value, sections: &'static [(&'static str, &'static str)]) -> Self {
        Self::new(move |request| {
            let mut data = full.clone();
            for (variable, key) in sections {
                let included = request
                    .variables
                    .get(*variable)
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                if !included {
                    if let Some(entity) = data
                        .as_object_mut()
                        .and_then(|root| root.values_mut().next())
                        .and_then(Value::as_object_mut)
                    {
                        entity.remove(*key);
                    }
                }
            }
            Ok(data)
        })
    }

    pub(crate) fn profile(&self, with_instructeur: bool) -> Profile {
        Profile::with_transport(
            Arc::new(self.clone()),
            with_instructeur.then(|| "SW5zdHJ1Y3RldXItMQ==".to_string()),
        )
    }

    pub(crate) fn requests(&self) -> Vec<GraphqlRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn execute(&self, request: &GraphqlRequest) -> DsResult<Value> {
        self.requests.lock().unwrap().push(request.clone());
        (self.responder)(request)
    }
}

/// Captures formatted tracing output for the current thread.
#[derive(Clone, Default)]
pub(crate) struct LogCapture {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl std::io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buf.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

impl LogCapture {
    /// Run `f` with a subscriber writing into this capture.
    pub(crate) fn during<T>(&self, f: impl FnOnce() -> T) -> T {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }

    pub(crate) fn output(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock().unwrap()).into_owned()
    }
}
