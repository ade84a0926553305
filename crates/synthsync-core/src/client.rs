use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::api::{MonitorApi, NewMonitor};
use crate::error::SyncError;
use crate::graphql::{
    self, ActorData, DeleteData, GraphQlRequest, GraphQlResponse, MutationData,
};
use crate::monitor::{MonitorSummary, RemoteMonitor};

/// NerdGraph client. One POST per call, no retries.
pub struct NerdGraphClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl NerdGraphClient {
    pub fn new(endpoint: &str, api_key: &str, timeout: Duration) -> Result<Self, SyncError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends one request and returns its `data`. Top-level GraphQL errors
    /// take precedence over whatever partial data came with them.
    async fn post<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T, SyncError> {
        let resp = self
            .http
            .post(&self.endpoint)
            .header("API-Key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&GraphQlRequest { query, variables })
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        // NerdGraph reports most failures as a GraphQL envelope, whatever the
        // status code. Anything else is surfaced as a plain HTTP error.
        let envelope = match serde_json::from_str::<GraphQlResponse<Value>>(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(SyncError::Http {
                    status: status.as_u16(),
                    body,
                });
            }
            Err(e) => return Err(SyncError::UnexpectedResponse(e.to_string())),
        };

        if !envelope.errors.is_empty() {
            return Err(SyncError::Api(envelope.errors));
        }
        if !status.is_success() {
            return Err(SyncError::Http {
                status: status.as_u16(),
                body,
            });
        }
        match envelope.data {
            Some(data) => serde_json::from_value(data)
                .map_err(|e| SyncError::UnexpectedResponse(e.to_string())),
            None => Err(SyncError::UnexpectedResponse("response has no data".into())),
        }
    }
}

fn monitor_payload(mut data: MutationData, operation: &str) -> Result<MonitorSummary, SyncError> {
    let payload = data
        .remove(operation)
        .flatten()
        .ok_or_else(|| SyncError::UnexpectedResponse(format!("missing {operation} payload")))?;
    if !payload.errors.is_empty() {
        return Err(SyncError::Mutation(payload.errors));
    }
    payload
        .monitor
        .ok_or_else(|| SyncError::UnexpectedResponse(format!("{operation} returned no monitor")))
}

#[async_trait]
impl MonitorApi for NerdGraphClient {
    async fn find_monitor(&self, name: &str) -> Result<Option<RemoteMonitor>, SyncError> {
        let variables = json!({ "query": graphql::monitor_search_query(name) });
        let data: ActorData = self.post(graphql::FIND_MONITOR, variables).await?;
        let entities = data.actor.entity_search.results.entities;

        // Outlines of other entity kinds come back as empty objects.
        let mut monitors = entities.into_iter().filter_map(|entity| {
            serde_json::from_value::<RemoteMonitor>(entity)
                .inspect_err(|e| {
                    tracing::debug!(monitor = name, error = %e, "Ignoring non-monitor search result");
                })
                .ok()
        });
        let first = monitors.next();
        let others = monitors.count();
        if first.is_some() && others > 0 {
            tracing::warn!(
                monitor = name,
                matches = others + 1,
                "Several monitors share this name, using the first result"
            );
        }
        Ok(first)
    }

    async fn update_script(
        &self,
        monitor: &RemoteMonitor,
        script: &str,
    ) -> Result<MonitorSummary, SyncError> {
        let operation = monitor
            .monitor_type
            .update_mutation()
            .ok_or_else(|| SyncError::UnsupportedType(monitor.monitor_type.clone()))?;

        let doc = graphql::update_script_mutation(operation);
        let variables = json!({ "guid": monitor.guid, "script": script });
        let data: MutationData = self.post(&doc, variables).await?;
        monitor_payload(data, operation)
    }

    async fn create_monitor(&self, monitor: &NewMonitor) -> Result<MonitorSummary, SyncError> {
        let operation = monitor
            .monitor_type
            .create_mutation()
            .ok_or_else(|| SyncError::UnsupportedType(monitor.monitor_type.clone()))?;

        let doc = graphql::create_monitor_mutation(operation);
        let variables = serde_json::to_value(monitor)?;
        let data: MutationData = self.post(&doc, variables).await?;
        monitor_payload(data, operation)
    }

    async fn delete_monitor(&self, monitor: &RemoteMonitor) -> Result<String, SyncError> {
        let variables = json!({ "guid": monitor.guid });
        let data: DeleteData = self.post(graphql::DELETE_MONITOR, variables).await?;
        data.synthetics_delete_monitor
            .and_then(|p| p.deleted_guid)
            .ok_or_else(|| SyncError::UnexpectedResponse("delete returned no guid".into()))
    }
}
