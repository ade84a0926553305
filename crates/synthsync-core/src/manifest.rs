//! Change-set manifests: JSON lists of repository-relative script paths
//! written by the preceding workflow step.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::error::ManifestError;

/// Which manifest a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeSet {
    Changed,
    Deleted,
}

impl ChangeSet {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Changed => "changed",
            Self::Deleted => "deleted",
        }
    }
}

/// A monitor script touched by the commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub name: String,
    /// Path as listed in the manifest.
    pub path: String,
    pub script: String,
}

/// Monitor name for a script path: the filename with its final extension
/// removed. Returns `None` when the filename has no extension.
pub fn derive_monitor_name(path: &str) -> Option<&str> {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    file_name.rfind('.').map(|dot| &file_name[..dot])
}

/// Reads a manifest and loads every script it lists.
///
/// A missing or unparseable manifest yields an empty set. A manifest that
/// parses to `null` or `[]` is an error: the workflow step that writes it
/// only does so when it found files, so an empty list means something
/// upstream is broken.
///
/// Scripts of the deleted set are usually gone from the checkout; for that
/// set a read failure leaves the script empty instead of failing.
pub fn load_manifest(
    manifest: &Path,
    workspace: &Path,
    set: ChangeSet,
) -> Result<Vec<ChangeRecord>, ManifestError> {
    let content = match fs::read_to_string(manifest) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(manifest = %manifest.display(), "Manifest not found, continuing");
            return Ok(Vec::new());
        }
        Err(e) => {
            tracing::warn!(manifest = %manifest.display(), error = %e, "Could not read manifest");
            return Ok(Vec::new());
        }
    };

    let paths = match serde_json::from_str::<Value>(&content) {
        Ok(Value::Null) => return Err(ManifestError::Empty(manifest.to_path_buf())),
        Ok(Value::Array(items)) if items.is_empty() => {
            return Err(ManifestError::Empty(manifest.to_path_buf()));
        }
        Ok(Value::Array(items)) => match string_items(items) {
            Some(paths) => paths,
            None => {
                tracing::warn!(manifest = %manifest.display(), "Manifest is not a list of paths");
                return Ok(Vec::new());
            }
        },
        Ok(_) => {
            tracing::warn!(manifest = %manifest.display(), "Manifest is not a list of paths");
            return Ok(Vec::new());
        }
        Err(e) => {
            tracing::warn!(manifest = %manifest.display(), error = %e, "Could not parse JSON from manifest");
            return Ok(Vec::new());
        }
    };

    let mut records = Vec::with_capacity(paths.len());
    for path in paths {
        let full = workspace.join(path.trim_start_matches('/'));
        let script = match fs::read_to_string(&full) {
            Ok(s) => s,
            Err(e) if set == ChangeSet::Deleted => {
                tracing::debug!(file = %path, error = %e, "Deleted script not on disk");
                String::new()
            }
            Err(source) => return Err(ManifestError::ScriptRead { path: full, source }),
        };

        let Some(name) = derive_monitor_name(&path).map(str::to_string) else {
            tracing::warn!(file = %path, "Cannot derive a monitor name from a file without an extension, skipping");
            continue;
        };
        records.push(ChangeRecord { name, path, script });
    }

    tracing::debug!(
        manifest = %manifest.display(),
        set = set.as_str(),
        count = records.len(),
        "Manifest loaded"
    );
    Ok(records)
}

fn string_items(items: Vec<Value>) -> Option<Vec<String>> {
    items
        .into_iter()
        .map(|v| match v {
            Value::String(s) => Some(s),
            _ => None,
        })
        .collect()
}
