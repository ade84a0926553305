use async_trait::async_trait;
use serde::Serialize;

use crate::error::SyncError;
use crate::inputs::LocationSpec;
use crate::monitor::{MonitorSummary, MonitorType, RemoteMonitor};

/// Everything needed to create a scripted monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewMonitor {
    pub account: i64,
    pub locations: LocationSpec,
    pub name: String,
    pub interval: String,
    pub script: String,
    pub status: String,
    #[serde(skip)]
    pub monitor_type: MonitorType,
}

/// Remote operations the reconciler drives.
///
/// Implementations never retry. An unsupported monitor type must fail with
/// [`SyncError::UnsupportedType`] without touching the network.
#[async_trait]
pub trait MonitorApi: Send + Sync {
    /// First synthetic monitor whose name equals `name`.
    async fn find_monitor(&self, name: &str) -> Result<Option<RemoteMonitor>, SyncError>;

    async fn update_script(
        &self,
        monitor: &RemoteMonitor,
        script: &str,
    ) -> Result<MonitorSummary, SyncError>;

    async fn create_monitor(&self, monitor: &NewMonitor) -> Result<MonitorSummary, SyncError>;

    /// Returns the deleted guid.
    async fn delete_monitor(&self, monitor: &RemoteMonitor) -> Result<String, SyncError>;
}
