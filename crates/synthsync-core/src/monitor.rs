use std::fmt;

use serde::{Deserialize, Serialize};

/// Synthetic monitor kind as reported by NerdGraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MonitorType {
    ScriptApi,
    ScriptBrowser,
    /// Any other kind (SIMPLE, BROWSER, CERT_CHECK, ...). Never mutated.
    Other(String),
}

impl MonitorType {
    /// Detects the monitor kind a script declares. `SCRIPT_API` wins when
    /// both markers are present.
    pub fn detect(script: &str) -> Option<Self> {
        if script.contains("SCRIPT_API") {
            Some(Self::ScriptApi)
        } else if script.contains("SCRIPT_BROWSER") {
            Some(Self::ScriptBrowser)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::ScriptApi => "SCRIPT_API",
            Self::ScriptBrowser => "SCRIPT_BROWSER",
            Self::Other(s) => s,
        }
    }

    pub fn update_mutation(&self) -> Option<&'static str> {
        match self {
            Self::ScriptApi => Some("syntheticsUpdateScriptApiMonitor"),
            Self::ScriptBrowser => Some("syntheticsUpdateScriptBrowserMonitor"),
            Self::Other(_) => None,
        }
    }

    pub fn create_mutation(&self) -> Option<&'static str> {
        match self {
            Self::ScriptApi => Some("syntheticsCreateScriptApiMonitor"),
            Self::ScriptBrowser => Some("syntheticsCreateScriptBrowserMonitor"),
            Self::Other(_) => None,
        }
    }
}

impl From<String> for MonitorType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "SCRIPT_API" => Self::ScriptApi,
            "SCRIPT_BROWSER" => Self::ScriptBrowser,
            _ => Self::Other(value),
        }
    }
}

impl From<MonitorType> for String {
    fn from(value: MonitorType) -> Self {
        match value {
            MonitorType::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for MonitorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRef {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

/// A synthetic monitor entity found through entity search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteMonitor {
    pub name: String,
    pub guid: String,
    pub monitor_type: MonitorType,
    #[serde(default)]
    pub monitor_id: Option<String>,
    #[serde(default)]
    pub account: Option<AccountRef>,
}

/// Monitor fields echoed back by create and update mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorSummary {
    pub guid: String,
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
}
