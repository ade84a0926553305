//! Mirrors a commit's changed and deleted scripts onto remote monitors.
//!
//! Files are handled one at a time in manifest order. Each file ends in an
//! [`Outcome`]; no failure stops the run.

use std::fmt;

use serde::Serialize;

use crate::api::{MonitorApi, NewMonitor};
use crate::error::SyncError;
use crate::inputs::CreationInputs;
use crate::manifest::{ChangeRecord, ChangeSet};
use crate::monitor::{MonitorType, RemoteMonitor};

#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Look monitors up but send no mutations.
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Update,
    Create,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingInputs { missing: Vec<String> },
    UndeclaredType,
    UnsupportedType { monitor_type: MonitorType },
    NotFound,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInputs { missing } => write!(f, "missing inputs: {}", missing.join(", ")),
            Self::UndeclaredType => f.write_str("script declares no monitor type"),
            Self::UnsupportedType { monitor_type } => {
                write!(f, "unsupported monitor type {monitor_type}")
            }
            Self::NotFound => f.write_str("monitor not found"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Updated {
        guid: String,
        status: Option<String>,
    },
    Created {
        guid: String,
        monitor_type: MonitorType,
        status: Option<String>,
    },
    Deleted {
        guid: String,
    },
    Planned {
        action: Action,
    },
    Skipped {
        reason: SkipReason,
    },
    Failed {
        error: String,
    },
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Updated { .. } => "updated",
            Self::Created { .. } => "created",
            Self::Deleted { .. } => "deleted",
            Self::Planned { .. } => "planned",
            Self::Skipped { .. } => "skipped",
            Self::Failed { .. } => "failed",
        }
    }

    pub fn detail(&self) -> String {
        match self {
            Self::Updated { guid, status } | Self::Created { guid, status, .. } => {
                match status {
                    Some(s) => format!("{guid} ({s})"),
                    None => guid.clone(),
                }
            }
            Self::Deleted { guid } => guid.clone(),
            Self::Planned { action } => format!("would {action:?}").to_lowercase(),
            Self::Skipped { reason } => reason.to_string(),
            Self::Failed { error } => error.clone(),
        }
    }

    fn failed(e: SyncError) -> Self {
        Self::Failed {
            error: e.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub set: ChangeSet,
    pub name: String,
    pub file: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub entries: Vec<ReportEntry>,
}

impl SyncReport {
    fn push(&mut self, set: ChangeSet, record: &ChangeRecord, outcome: Outcome) {
        self.entries.push(ReportEntry {
            set,
            name: record.name.clone(),
            file: record.path.clone(),
            outcome,
        });
    }

    pub fn count(&self, label: &str) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome.label() == label)
            .count()
    }

    pub fn has_failures(&self) -> bool {
        self.count("failed") > 0
    }
}

pub struct Reconciler<'a, A: ?Sized> {
    api: &'a A,
    inputs: &'a CreationInputs,
    options: SyncOptions,
}

impl<'a, A: MonitorApi + ?Sized> Reconciler<'a, A> {
    pub fn new(api: &'a A, inputs: &'a CreationInputs, options: SyncOptions) -> Self {
        Self {
            api,
            inputs,
            options,
        }
    }

    pub async fn run(&self, changed: &[ChangeRecord], deleted: &[ChangeRecord]) -> SyncReport {
        let mut report = SyncReport::default();

        if changed.is_empty() {
            tracing::info!("No modified or new monitors found in push");
        }
        for record in changed {
            let outcome = self.sync_changed(record).await;
            report.push(ChangeSet::Changed, record, outcome);
        }

        if deleted.is_empty() {
            tracing::info!("No deleted scripts found in push");
        }
        for record in deleted {
            let outcome = self.sync_deleted(record).await;
            report.push(ChangeSet::Deleted, record, outcome);
        }

        report
    }

    /// Updates the monitor named after `record`, or creates it when it does
    /// not exist and creation inputs allow it.
    pub async fn sync_changed(&self, record: &ChangeRecord) -> Outcome {
        if let Some(monitor) = self.lookup(&record.name).await {
            return self.update(&monitor, &record.script).await;
        }

        let missing = self.inputs.missing();
        if !missing.is_empty() {
            tracing::warn!(
                monitor = %record.name,
                file = %record.path,
                missing = ?missing,
                "Missing inputs to create new monitor, skipping creation"
            );
            return Outcome::Skipped {
                reason: SkipReason::MissingInputs {
                    missing: missing.into_iter().map(String::from).collect(),
                },
            };
        }

        let Some(monitor_type) = MonitorType::detect(&record.script) else {
            tracing::warn!(
                monitor = %record.name,
                file = %record.path,
                "Script declares no monitor type; add SCRIPT_API or SCRIPT_BROWSER as a comment and recommit"
            );
            return Outcome::Skipped {
                reason: SkipReason::UndeclaredType,
            };
        };

        self.create(record, monitor_type).await
    }

    pub async fn sync_deleted(&self, record: &ChangeRecord) -> Outcome {
        let Some(monitor) = self.lookup(&record.name).await else {
            tracing::warn!(
                monitor = %record.name,
                file = %record.path,
                "Monitor not found; it may have been deleted outside of this workflow"
            );
            return Outcome::Skipped {
                reason: SkipReason::NotFound,
            };
        };

        if self.options.dry_run {
            tracing::info!(monitor = %monitor.name, guid = %monitor.guid, "Dry run: would delete monitor");
            return Outcome::Planned {
                action: Action::Delete,
            };
        }

        match self.api.delete_monitor(&monitor).await {
            Ok(guid) => {
                tracing::info!(monitor = %monitor.name, guid = %guid, "Successfully deleted monitor");
                Outcome::Deleted { guid }
            }
            Err(e) => {
                tracing::error!(monitor = %monitor.name, error = %e, "Error deleting monitor, skipping");
                Outcome::failed(e)
            }
        }
    }

    /// Lookup failures are logged and treated as "no such monitor".
    async fn lookup(&self, name: &str) -> Option<RemoteMonitor> {
        match self.api.find_monitor(name).await {
            Ok(Some(monitor)) => {
                tracing::debug!(
                    monitor = name,
                    guid = %monitor.guid,
                    monitor_type = %monitor.monitor_type,
                    "Found remote monitor"
                );
                Some(monitor)
            }
            Ok(None) => {
                tracing::info!(monitor = name, "No matching monitor found");
                None
            }
            Err(e) => {
                tracing::error!(monitor = name, error = %e, "Error retrieving monitor");
                None
            }
        }
    }

    async fn update(&self, monitor: &RemoteMonitor, script: &str) -> Outcome {
        if self.options.dry_run {
            if monitor.monitor_type.update_mutation().is_none() {
                return unsupported(monitor);
            }
            tracing::info!(monitor = %monitor.name, guid = %monitor.guid, "Dry run: would update monitor script");
            return Outcome::Planned {
                action: Action::Update,
            };
        }

        match self.api.update_script(monitor, script).await {
            Ok(summary) => {
                tracing::info!(
                    monitor = %summary.name,
                    status = summary.status.as_deref().unwrap_or("unknown"),
                    "Successfully updated monitor"
                );
                Outcome::Updated {
                    guid: summary.guid,
                    status: summary.status,
                }
            }
            Err(SyncError::UnsupportedType(_)) => unsupported(monitor),
            Err(e) => {
                tracing::error!(monitor = %monitor.name, error = %e, "Error updating monitor, skipping");
                Outcome::failed(e)
            }
        }
    }

    async fn create(&self, record: &ChangeRecord, monitor_type: MonitorType) -> Outcome {
        let account = match self.inputs.account_id() {
            Ok(a) => a,
            Err(e) => {
                tracing::error!(monitor = %record.name, error = %e, "Cannot create monitor");
                return Outcome::failed(e.into());
            }
        };

        let new_monitor = NewMonitor {
            account,
            locations: self.inputs.locations.clone(),
            name: record.name.clone(),
            interval: self.inputs.interval.clone(),
            script: record.script.clone(),
            status: self.inputs.status.clone(),
            monitor_type,
        };

        if self.options.dry_run {
            tracing::info!(
                monitor = %new_monitor.name,
                monitor_type = %new_monitor.monitor_type,
                "Dry run: would create monitor"
            );
            return Outcome::Planned {
                action: Action::Create,
            };
        }

        match self.api.create_monitor(&new_monitor).await {
            Ok(summary) => {
                tracing::info!(
                    monitor = %summary.name,
                    guid = %summary.guid,
                    status = summary.status.as_deref().unwrap_or("unknown"),
                    "Successfully created new monitor"
                );
                Outcome::Created {
                    guid: summary.guid,
                    monitor_type: new_monitor.monitor_type,
                    status: summary.status,
                }
            }
            Err(e) => {
                tracing::error!(monitor = %record.name, error = %e, "Error creating monitor, skipping");
                Outcome::failed(e)
            }
        }
    }
}

fn unsupported(monitor: &RemoteMonitor) -> Outcome {
    tracing::warn!(
        monitor = %monitor.name,
        monitor_type = %monitor.monitor_type,
        "Only SCRIPT_API and SCRIPT_BROWSER monitors are synced, skipping update"
    );
    Outcome::Skipped {
        reason: SkipReason::UnsupportedType {
            monitor_type: monitor.monitor_type.clone(),
        },
    }
}
