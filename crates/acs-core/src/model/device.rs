// ── Device domain type ──

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::parameter::{ParameterTree, ParameterValues};

/// Identity block a CPE reports in its Inform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub manufacturer: Option<String>,
    pub oui: Option<String>,
    pub product_class: Option<String>,
    pub serial_number: Option<String>,
}

/// A CPE as known to the ACS.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    /// Backend identifier (`OUI-ProductClass-Serial` on GenieACS).
    pub id: String,
    pub identity: DeviceIdentity,
    pub last_inform: Option<DateTime<Utc>>,
    pub last_boot: Option<DateTime<Utc>>,
    pub registered: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub parameters: ParameterTree,
}

impl Device {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn parameter(&self, path: &str) -> Option<&Value> {
        self.parameters.value(path)
    }

    pub fn extract<I, S>(&self, paths: I) -> ParameterValues
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.parameters.extract(paths)
    }

    /// True when the device has not informed since `since` (or never).
    pub fn is_inactive_since(&self, since: DateTime<Utc>) -> bool {
        self.last_inform.is_none_or(|at| at < since)
    }
}
