//! Request builder: a query template bound to a profile and variables.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::DsResult;
use crate::profile::Profile;
use crate::query::Query;
use crate::transport::GraphqlRequest;

/// Builds and executes one of the fixed queries.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    profile: Profile,
    query: Query,
    variables: Map<String, Value>,
}

impl RequestBuilder {
    pub fn new(profile: Profile, query: Query) -> Self {
        Self {
            profile,
            query,
            variables: Map::new(),
        }
    }

    /// Insert or overwrite a variable binding.
    pub fn add_variable(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Drop a binding, returning its previous value.
    pub fn remove_variable(&mut self, name: &str) -> Option<Value> {
        self.variables.remove(name)
    }

    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn variables(&self) -> &Map<String, Value> {
        &self.variables
    }

    pub fn query(&self) -> Query {
        self.query
    }

    /// The request as it will be sent.
    pub fn build(&self) -> GraphqlRequest {
        GraphqlRequest {
            query: self.query.template().to_string(),
            operation_name: self.query.operation_name().to_string(),
            variables: self.variables.clone(),
        }
    }

    /// Run the query and return the `data` object.
    pub async fn execute(&self) -> DsResult<Value> {
        let request = self.build();
        debug!(
            operation = %request.operation_name,
            variables = ?request.variables,
            "executing query"
        );
        self.profile.transport().execute(&request).await
    }
}
