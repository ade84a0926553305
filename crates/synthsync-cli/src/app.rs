use std::time::Duration;

use anyhow::{Context, Result};
use synthsync_core::{
    ChangeSet, CreationInputs, NerdGraphClient, Reconciler, SyncOptions, load_manifest,
};

use crate::cli::Cli;
use crate::observability;
use crate::output::{self, print_error};
use crate::settings::{self, Settings};

/// A fatal error, or a failed monitor under `--strict`.
pub const EXIT_FAILURE: i32 = 1;
/// Settings could not be loaded or are invalid.
pub const EXIT_CONFIG: i32 = 2;

/// Runs one sync and returns the process exit status.
pub async fn execute(cli: Cli) -> i32 {
    let settings = match settings::resolve(&cli) {
        Ok(s) => s,
        Err(e) => {
            print_error(&format!("Configuration error: {e:#}"));
            return EXIT_CONFIG;
        }
    };

    observability::init_tracing(&settings.logging.level);

    match run(cli, settings).await {
        Ok(code) => code,
        Err(e) => {
            print_error(&format!("{e:#}"));
            EXIT_FAILURE
        }
    }
}

pub async fn run(cli: Cli, settings: Settings) -> Result<i32> {
    // Both manifests are read before any request so a broken manifest
    // stops the run with nothing changed remotely.
    let changed = load_manifest(&settings.changed_manifest, &cli.workspace, ChangeSet::Changed)?;
    let deleted = load_manifest(&settings.deleted_manifest, &cli.workspace, ChangeSet::Deleted)?;

    let inputs = CreationInputs::resolve(cli.create.into_raw());

    let api_key = cli.api_key.unwrap_or_default();
    if api_key.is_empty() {
        tracing::warn!("NEW_RELIC_API_KEY is not set; NerdGraph will reject every request");
    }

    let client = NerdGraphClient::new(
        &settings.endpoint,
        &api_key,
        Duration::from_secs(settings.request_timeout_secs),
    )
    .context("Failed to build HTTP client")?;

    tracing::info!(
        endpoint = %client.endpoint(),
        workspace = %cli.workspace.display(),
        changed = changed.len(),
        deleted = deleted.len(),
        dry_run = cli.dry_run,
        "Syncing synthetic monitors"
    );

    let options = SyncOptions {
        dry_run: cli.dry_run,
    };
    let report = Reconciler::new(&client, &inputs, options)
        .run(&changed, &deleted)
        .await;

    output::print_report(&report, cli.format)?;

    Ok(if cli.strict && report.has_failures() {
        EXIT_FAILURE
    } else {
        0
    })
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use clap::Parser;
    use serde_json::json;
    use synthsync_core::ManifestError;
    use tempfile::TempDir;
    use wiremock::matchers::{any, body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn workspace_with(files: &[(&str, &str)]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (path, content) in files {
            let full = dir.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }
        dir
    }

    fn cli_for(ws: &Path, endpoint: &str, extra: &[&str]) -> Cli {
        let changed = ws.join("changed_monitors.json");
        let deleted = ws.join("deleted_monitors.json");
        let mut args = vec![
            "synthsync".to_string(),
            "--workspace".into(),
            ws.display().to_string(),
            "--changed".into(),
            changed.display().to_string(),
            "--deleted".into(),
            deleted.display().to_string(),
            "--endpoint".into(),
            endpoint.to_string(),
            "--api-key".into(),
            "NRAK-TEST".into(),
            "--format".into(),
            "json".into(),
        ];
        args.extend(extra.iter().map(|s| s.to_string()));
        Cli::try_parse_from(args).unwrap()
    }

    #[tokio::test]
    async fn empty_deleted_manifest_stops_before_any_request() {
        let ws = workspace_with(&[
            ("a/foo.js", "// SCRIPT_API\n$http.get('https://example.com');"),
            ("changed_monitors.json", r#"["a/foo.js"]"#),
            ("deleted_monitors.json", "[]"),
        ]);
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;
        let endpoint = format!("{}/graphql", server.uri());

        let cli = cli_for(ws.path(), &endpoint, &[]);
        let settings = settings::resolve(&cli).unwrap();
        let err = run(cli, settings).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ManifestError>(),
            Some(ManifestError::Empty(_))
        ));

        let cli = cli_for(ws.path(), &endpoint, &[]);
        assert_eq!(execute(cli).await, EXIT_FAILURE);

        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn strict_turns_a_failed_monitor_into_exit_one() {
        let ws = workspace_with(&[
            ("a/foo.js", "// SCRIPT_API\n$http.get('https://example.com');"),
            ("changed_monitors.json", r#"["a/foo.js"]"#),
        ]);
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("entitySearch"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "actor": { "entitySearch": { "results": { "entities": [
                    { "name": "foo", "monitorType": "SCRIPT_API", "guid": "g-foo" }
                ] } } } }
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_string_contains("syntheticsUpdateScriptApiMonitor"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "syntheticsUpdateScriptApiMonitor": {
                        "errors": [{ "description": "Script is invalid", "type": "BAD_REQUEST" }],
                        "monitor": null
                    }
                }
            })))
            .expect(2)
            .mount(&server)
            .await;
        let endpoint = format!("{}/graphql", server.uri());

        assert_eq!(execute(cli_for(ws.path(), &endpoint, &["--strict"])).await, EXIT_FAILURE);
        assert_eq!(execute(cli_for(ws.path(), &endpoint, &[])).await, 0);
    }

    #[tokio::test]
    async fn invalid_settings_exit_two_without_requests() {
        let ws = workspace_with(&[("changed_monitors.json", r#"["a/foo.js"]"#)]);
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let ftp = "ftp://api.newrelic.com/graphql";
        assert_eq!(execute(cli_for(ws.path(), ftp, &[])).await, EXIT_CONFIG);

        let endpoint = format!("{}/graphql", server.uri());
        let absent = ws.path().join("absent.toml");
        let cli = cli_for(ws.path(), &endpoint, &["--config", absent.to_str().unwrap()]);
        assert_eq!(execute(cli).await, EXIT_CONFIG);
    }
}
