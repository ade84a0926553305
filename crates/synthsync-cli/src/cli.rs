use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use synthsync_core::RawInputs;

#[derive(Parser)]
#[command(name = "synthsync")]
#[command(about = "Mirror committed synthetic monitor scripts to New Relic")]
#[command(version)]
pub struct Cli {
    /// Settings file (TOML). Defaults to synthsync.toml when present
    #[arg(short, long, env = "SYNTHSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Manifest listing added or modified scripts
    #[arg(long)]
    pub changed: Option<PathBuf>,

    /// Manifest listing deleted scripts
    #[arg(long)]
    pub deleted: Option<PathBuf>,

    /// Repository checkout the manifest paths are relative to
    #[arg(short, long, env = "GITHUB_WORKSPACE", default_value = ".")]
    pub workspace: PathBuf,

    /// New Relic user API key
    #[arg(long, env = "NEW_RELIC_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// NerdGraph endpoint (overrides settings)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Per-request timeout in seconds (overrides settings)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Log level or filter directive (overrides settings; RUST_LOG wins)
    #[arg(long)]
    pub log_level: Option<String>,

    #[command(flatten)]
    pub create: CreateArgs,

    /// Look monitors up but do not change anything
    #[arg(long)]
    pub dry_run: bool,

    /// Exit with status 1 when any monitor failed to sync
    #[arg(long)]
    pub strict: bool,

    /// Report format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Inputs used only when a script has no monitor yet. Creation needs all of
/// them; the env names are the ones GitHub Actions gives `with:` inputs.
#[derive(clap::Args)]
pub struct CreateArgs {
    /// Account the new monitors belong to
    #[arg(long, env = "INPUT_ACCOUNTID")]
    pub account_id: Option<String>,

    /// Private location guids as a list, e.g. '["guid-1"]'
    #[arg(long, env = "INPUT_PRIVATELOCATIONS")]
    pub private_locations: Option<String>,

    /// Public locations as a list, e.g. '["AWS_US_EAST_1"]'
    #[arg(long, env = "INPUT_PUBLICLOCATIONS")]
    pub public_locations: Option<String>,

    /// Check period, e.g. EVERY_15_MINUTES
    #[arg(long, env = "INPUT_INTERVAL")]
    pub interval: Option<String>,

    /// Initial status: ENABLED, DISABLED or MUTED
    #[arg(long, env = "INPUT_STATUS")]
    pub status: Option<String>,
}

impl CreateArgs {
    pub fn into_raw(self) -> RawInputs {
        RawInputs {
            account: self.account_id.unwrap_or_default(),
            private_locations: self.private_locations.unwrap_or_default(),
            public_locations: self.public_locations.unwrap_or_default(),
            interval: self.interval.unwrap_or_default(),
            status: self.status.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_create_args_become_empty_strings() {
        let cli = Cli::try_parse_from(["synthsync", "--account-id", "42", "--workspace", "/ws"]).unwrap();
        let raw = cli.create.into_raw();
        assert_eq!(raw.account, "42");
        assert_eq!(raw.interval, "");
        assert_eq!(raw.private_locations, "");
    }

    #[test]
    fn flags_parse() {
        let cli = Cli::try_parse_from([
            "synthsync",
            "--changed",
            "out/changed.json",
            "--dry-run",
            "--strict",
            "--format",
            "json",
            "--workspace",
            "/ws",
        ])
        .unwrap();
        assert_eq!(cli.changed, Some(PathBuf::from("out/changed.json")));
        assert!(cli.dry_run && cli.strict);
        assert!(matches!(cli.format, OutputFormat::Json));
    }

    #[test]
    fn command_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
