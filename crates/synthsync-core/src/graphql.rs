//! NerdGraph request documents and response envelopes.
//!
//! Every value travels as a GraphQL variable. The only string built by hand
//! is the entity search expression, whose name literal is escaped.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::monitor::MonitorSummary;

pub const DEFAULT_ENDPOINT: &str = "https://api.newrelic.com/graphql";

pub const FIND_MONITOR: &str = r#"
query ($query: String!) {
  actor {
    entitySearch(query: $query) {
      results {
        entities {
          ... on SyntheticMonitorEntityOutline {
            name
            monitorId
            monitorType
            guid
            account {
              id
              name
            }
          }
        }
      }
    }
  }
}
"#;

pub const DELETE_MONITOR: &str = r#"
mutation ($guid: EntityGuid!) {
  syntheticsDeleteMonitor(guid: $guid) {
    deletedGuid
  }
}
"#;

/// Update mutation for the given operation name.
pub fn update_script_mutation(operation: &str) -> String {
    format!(
        r#"
mutation ($guid: EntityGuid!, $script: String!) {{
  {operation}(guid: $guid, monitor: {{script: $script}}) {{
    errors {{
      description
      type
    }}
    monitor {{
      guid
      name
      status
    }}
  }}
}}
"#
    )
}

/// Create mutation for the given operation name.
pub fn create_monitor_mutation(operation: &str) -> String {
    format!(
        r#"
mutation ($account: Int!, $locations: SyntheticsScriptedMonitorLocationsInput!, $name: String!, $interval: SyntheticsMonitorPeriod!, $script: String!, $status: SyntheticsMonitorStatus!) {{
  {operation}(accountId: $account, monitor: {{locations: $locations, name: $name, period: $interval, script: $script, status: $status}}) {{
    errors {{
      description
      type
    }}
    monitor {{
      guid
      name
      status
    }}
  }}
}}
"#
    )
}

/// Entity search expression matching a synthetic monitor by exact name.
/// The SYNTH domain also holds private locations and secure credentials,
/// so the entity type is pinned as well.
pub fn monitor_search_query(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for c in name.chars() {
        if matches!(c, '\\' | '\'') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    format!("domain = 'SYNTH' AND type = 'MONITOR' AND name = '{escaped}'")
}

#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
    pub variables: Value,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

/// Top-level GraphQL error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQlError {
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

/// Error reported inside a create or update payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationError {
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ActorData {
    pub actor: Actor,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub entity_search: EntitySearch,
}

#[derive(Debug, Deserialize)]
pub struct EntitySearch {
    pub results: EntitySearchResults,
}

#[derive(Debug, Deserialize)]
pub struct EntitySearchResults {
    #[serde(default)]
    pub entities: Vec<Value>,
}

/// Payload shared by the create and update mutations.
#[derive(Debug, Deserialize)]
pub struct MonitorPayload {
    #[serde(default)]
    pub errors: Vec<MutationError>,
    pub monitor: Option<MonitorSummary>,
}

/// `data` of a create or update response, keyed by operation name.
pub type MutationData = HashMap<String, Option<MonitorPayload>>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteData {
    pub synthetics_delete_monitor: Option<DeletePayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletePayload {
    pub deleted_guid: Option<String>,
}
