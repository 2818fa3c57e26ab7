//! # GraphQL Address Query Service
//!
//! Posts `{"query": "query{ <field> }"}` to the configured endpoint and hands
//! the JSON body back unchanged. A response with a non-empty `errors` array
//! is reported as a failed query.

use crate::config::QueryConfig;
use crate::errors::QueryError;
use crate::ports::outbound::AddressQueryService;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Request document for the parameterless query on `field`.
fn query_document(field: &str) -> Value {
    json!({ "query": format!("query{{ {field} }}") })
}

/// Fails on a non-empty `errors` array.
fn check_errors(body: &Value) -> Result<(), QueryError> {
    match body.get("errors").and_then(Value::as_array) {
        Some(errors) if !errors.is_empty() => {
            let messages: Vec<&str> = errors
                .iter()
                .filter_map(|e| e.get("message").and_then(Value::as_str))
                .collect();
            let reason = if messages.is_empty() {
                format!("{} error(s)", errors.len())
            } else {
                messages.join("; ")
            };
            Err(QueryError::Query(reason))
        }
        _ => Ok(()),
    }
}

/// HTTP client for the remote GraphQL service.
pub struct GraphQlQueryService {
    client: Client,
    endpoint: String,
}

impl GraphQlQueryService {
    pub fn new(config: &QueryConfig) -> Result<Self, QueryError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: config.endpoint.clone(),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AddressQueryService for GraphQlQueryService {
    async fn query(&self, field: &str) -> Result<Value, QueryError> {
        debug!(field, endpoint = %self.endpoint, "Querying address service");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&query_document(field))
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    QueryError::Connection(format!("cannot connect to {}", self.endpoint))
                } else {
                    QueryError::Http(e)
                }
            })?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| QueryError::Parse(e.to_string()))?;

        if let Err(e) = check_errors(&body) {
            warn!(field, error = %e, "Address query returned errors");
            return Err(e);
        }
        Ok(body)
    }
}
