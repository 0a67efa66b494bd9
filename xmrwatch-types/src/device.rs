//! Device description for a miner instance.

use serde::Serialize;

use crate::DOMAIN;

/// Describes the miner behind an instance, for grouping its metrics.
///
/// Fields read from the snapshot are `None` while the controller has no data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    /// Display name, `"<instance> xmrig"`.
    pub name: String,
    /// `(domain, instance name)` identifier pair.
    pub identifier: (String, String),
    /// Miner version (`version`).
    pub sw_version: Option<String>,
    /// CPU brand (`cpu.brand`).
    pub manufacturer: Option<String>,
    /// `"<cpu.arch>-<cpu.assembly>"`.
    pub model: Option<String>,
}

impl DeviceInfo {
    /// Create device info for an instance with no snapshot-derived fields.
    pub fn new(instance_name: &str) -> Self {
        Self {
            name: format!("{} xmrig", instance_name),
            identifier: (DOMAIN.to_string(), instance_name.to_string()),
            sw_version: None,
            manufacturer: None,
            model: None,
        }
    }
}
