use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::WAYTYPE_KEY_PREFIX;
use crate::OptionsError;

/// Unvalidated option preferences, as stored for a user or sent with a request.
///
/// Keys and values are plain strings; the resolver decides which keys exist
/// and which values are allowed for them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRouteOptions(BTreeMap<String, String>);

/// Structured request form: known keys as fields, way type policies grouped
#[derive(Debug, Deserialize)]
struct StructuredOptions {
    mode: Option<String>,
    walk_speed: Option<String>,
    restrictions: Option<String>,
    #[serde(default)]
    way_types: BTreeMap<String, String>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

impl RawRouteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reads either a flat JSON object of strings or the structured form
    /// `{"mode": .., "walk_speed": .., "restrictions": .., "way_types": {name: policy}}`.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, OptionsError> {
        let structured: StructuredOptions = serde_json::from_value(value.clone())
            .map_err(|e| OptionsError::invalid(format!("malformed options object: {e}")))?;

        let mut raw = Self::new();
        for (key, value) in [
            (super::KEY_MODE, structured.mode),
            (super::KEY_WALK_SPEED, structured.walk_speed),
            (super::KEY_RESTRICTIONS, structured.restrictions),
        ] {
            if let Some(value) = value {
                raw.insert(key, value);
            }
        }
        for (name, policy) in structured.way_types {
            raw.insert(format!("{WAYTYPE_KEY_PREFIX}{name}"), policy);
        }
        for (key, value) in structured.extra {
            let value = match value {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            if raw.insert(key.clone(), value).is_some() {
                return Err(OptionsError::invalid(format!("duplicate key '{key}'")));
            }
        }
        Ok(raw)
    }
}

impl FromStr for RawRouteOptions {
    type Err = OptionsError;

    /// Parses `key=value,key=value`. Whitespace around entries is ignored,
    /// empty entries are skipped, repeated keys are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut raw = Self::new();
        for entry in s.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
            let (key, value) = entry
                .split_once('=')
                .ok_or_else(|| OptionsError::invalid(format!("expected key=value, got '{entry}'")))?;
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() {
                return Err(OptionsError::invalid(format!("missing key in '{entry}'")));
            }
            if raw.insert(key, value).is_some() {
                return Err(OptionsError::invalid(format!("duplicate key '{key}'")));
            }
        }
        Ok(raw)
    }
}

impl fmt::Display for RawRouteOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRouteOptions {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
