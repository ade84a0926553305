//! Optional parameters used when a committed script has no monitor yet.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::InputError;

/// A private location, either as a bare guid or with its verified script
/// execution password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrivateLocation {
    Guid(String),
    Detailed {
        guid: String,
        #[serde(rename = "vsePassword", default, skip_serializing_if = "Option::is_none")]
        vse_password: Option<String>,
    },
}

/// Where a new monitor runs. Serializes to the shape of
/// `SyntheticsScriptedMonitorLocationsInput`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LocationSpec {
    #[default]
    None,
    Private(Vec<PrivateLocation>),
    Public(Vec<String>),
    Both {
        private: Vec<PrivateLocation>,
        public: Vec<String>,
    },
}

impl LocationSpec {
    pub fn from_lists(private: Option<Vec<PrivateLocation>>, public: Option<Vec<String>>) -> Self {
        match (private, public) {
            (None, None) => Self::None,
            (Some(private), None) => Self::Private(private),
            (None, Some(public)) => Self::Public(public),
            (Some(private), Some(public)) => Self::Both { private, public },
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    fn parts(&self) -> (Option<&[PrivateLocation]>, Option<&[String]>) {
        match self {
            Self::None => (None, None),
            Self::Private(p) => (Some(p), None),
            Self::Public(p) => (None, Some(p)),
            Self::Both { private, public } => (Some(private), Some(public)),
        }
    }
}

impl Serialize for LocationSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct LocationsInput<'a> {
            #[serde(skip_serializing_if = "Option::is_none")]
            private: Option<&'a [PrivateLocation]>,
            #[serde(skip_serializing_if = "Option::is_none")]
            public: Option<&'a [String]>,
        }

        let (private, public) = self.parts();
        LocationsInput { private, public }.serialize(serializer)
    }
}

/// Creation inputs exactly as supplied; empty means not provided.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawInputs {
    pub account: String,
    pub private_locations: String,
    pub public_locations: String,
    pub interval: String,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreationInputs {
    pub account: String,
    pub locations: LocationSpec,
    pub interval: String,
    pub status: String,
}

impl CreationInputs {
    /// Normalizes raw inputs. An unparseable location list is logged and
    /// treated as not provided, which blocks creation but not updates.
    pub fn resolve(raw: RawInputs) -> Self {
        let private = parse_or_warn::<PrivateLocation>("privateLocations", &raw.private_locations);
        let public = parse_or_warn::<String>("publicLocations", &raw.public_locations);

        Self {
            account: raw.account.trim().to_string(),
            locations: LocationSpec::from_lists(private, public),
            interval: raw.interval.trim().to_string(),
            status: raw.status.trim().to_string(),
        }
    }

    /// Names of the inputs that are still empty.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.account.is_empty() {
            missing.push("accountId");
        }
        if self.locations.is_none() {
            missing.push("privateLocations/publicLocations");
        }
        if self.interval.is_empty() {
            missing.push("interval");
        }
        if self.status.is_empty() {
            missing.push("status");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    pub fn account_id(&self) -> Result<i64, InputError> {
        self.account
            .parse()
            .map_err(|_| InputError::InvalidAccount(self.account.clone()))
    }
}

/// Parses a location list such as `["AWS_US_EAST_1", "AWS_EU_WEST_1"]`.
///
/// Only JSON values are accepted. Single-quoted string literals, as in
/// Python-style lists from existing workflow files, are rewritten to JSON
/// strings one literal at a time, so `['a', "b"]` parses as well. Nothing
/// outside string literals is rewritten.
pub fn parse_location_list<T: DeserializeOwned>(
    field: &'static str,
    raw: &str,
) -> Result<Option<Vec<T>>, InputError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    let parsed = match serde_json::from_str::<Vec<T>>(raw) {
        Ok(list) => Ok(list),
        Err(e) if raw.contains('\'') => match single_quotes_to_json(raw) {
            Some(json) => serde_json::from_str::<Vec<T>>(&json).map_err(|_| e),
            None => Err(e),
        },
        Err(e) => Err(e),
    };

    parsed.map(Some).map_err(|e| InputError::InvalidLocations {
        field,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Rewrites every `'...'` literal as a `"..."` literal. Double-quoted
/// literals pass through untouched. Returns `None` for an unterminated
/// literal.
fn single_quotes_to_json(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len() + 2);
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                out.push('"');
                loop {
                    match chars.next()? {
                        '\\' => {
                            out.push('\\');
                            out.push(chars.next()?);
                        }
                        '"' => break,
                        other => out.push(other),
                    }
                }
                out.push('"');
            }
            '\'' => {
                out.push('"');
                loop {
                    match chars.next()? {
                        '\\' => match chars.next()? {
                            '\'' => out.push('\''),
                            escaped => {
                                out.push('\\');
                                out.push(escaped);
                            }
                        },
                        '"' => out.push_str("\\\""),
                        '\'' => break,
                        other => out.push(other),
                    }
                }
                out.push('"');
            }
            other => out.push(other),
        }
    }
    Some(out)
}

fn parse_or_warn<T: DeserializeOwned>(field: &'static str, raw: &str) -> Option<Vec<T>> {
    match parse_location_list(field, raw) {
        Ok(list) => list,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring location input");
            None
        }
    }
}
