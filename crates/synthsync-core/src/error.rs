use std::path::PathBuf;

use thiserror::Error;

use crate::graphql::{GraphQlError, MutationError};
use crate::monitor::MonitorType;

/// Errors that stop a run before any monitor is touched.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("No monitors read from manifest {}", .0.display())]
    Empty(PathBuf),

    #[error("Failed to read monitor script {}: {source}", path.display())]
    ScriptRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Invalid {field} list {value:?}: {reason}")]
    InvalidLocations {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Account id {0:?} is not an integer")]
    InvalidAccount(String),
}

/// Per-monitor failures. None of these abort the run.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("API returned errors: {}", join_messages(.0))]
    Api(Vec<GraphQlError>),

    #[error("Mutation returned errors: {}", join_descriptions(.0))]
    Mutation(Vec<MutationError>),

    #[error("Unsupported monitor type {0}; only SCRIPT_API and SCRIPT_BROWSER are accepted")]
    UnsupportedType(MonitorType),

    #[error("Failed to encode variables: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error(transparent)]
    Input(#[from] InputError),
}

fn join_messages(errors: &[GraphQlError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

fn join_descriptions(errors: &[MutationError]) -> String {
    errors
        .iter()
        .map(|e| match &e.error_type {
            Some(t) => format!("{t}: {}", e.description),
            None => e.description.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}
