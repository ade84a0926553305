//! Keeps New Relic scripted synthetic monitors in step with the scripts
//! versioned in a repository.
//!
//! A CI step writes two manifests, one listing changed scripts and one
//! listing deleted scripts. [`manifest::load_manifest`] turns them into
//! [`ChangeRecord`]s and a [`Reconciler`] mirrors each record onto NerdGraph
//! through a [`MonitorApi`] implementation, usually [`NerdGraphClient`].

pub mod api;
pub mod client;
pub mod error;
pub mod graphql;
pub mod inputs;
pub mod manifest;
pub mod monitor;
pub mod reconcile;

pub use api::{MonitorApi, NewMonitor};
pub use client::NerdGraphClient;
pub use error::{InputError, ManifestError, SyncError};
pub use inputs::{CreationInputs, LocationSpec, PrivateLocation, RawInputs};
pub use manifest::{ChangeRecord, ChangeSet, derive_monitor_name, load_manifest};
pub use monitor::{MonitorSummary, MonitorType, RemoteMonitor};
pub use reconcile::{Outcome, Reconciler, SyncOptions, SyncReport};
