//! Metric entities: one published metric of one controller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use xmrwatch_types::{DeviceInfo, MetricDescriptor, MetricState};

use crate::controller::PollingController;
use crate::projector::{lookup, project};

/// A single metric bound to a controller and a descriptor.
///
/// The entity never caches a value: [`state`](Self::state) re-projects the
/// controller's current snapshot on every call.
pub struct MetricEntity {
    instance_name: String,
    unique_id: String,
    name: String,
    descriptor: &'static MetricDescriptor,
    controller: Arc<PollingController>,
    enabled: AtomicBool,
}

impl MetricEntity {
    /// Create an enabled entity.
    pub fn new(
        instance_name: impl Into<String>,
        controller: Arc<PollingController>,
        descriptor: &'static MetricDescriptor,
    ) -> Self {
        let instance_name = instance_name.into();
        Self {
            unique_id: Self::entity_id(&instance_name, descriptor.key),
            name: format!("{} {}", instance_name, descriptor.name),
            instance_name,
            descriptor,
            controller,
            enabled: AtomicBool::new(true),
        }
    }

    /// Identity of the entity for `key` under `instance_name`.
    pub fn entity_id(instance_name: &str, key: &str) -> String {
        format!("{}-{}", instance_name, key)
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    /// Display name, `"<instance> <metric name>"`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> &'static str {
        self.descriptor.key
    }

    pub fn icon(&self) -> &'static str {
        self.descriptor.icon
    }

    pub fn unit(&self) -> Option<&'static str> {
        self.descriptor.unit
    }

    pub fn descriptor(&self) -> &'static MetricDescriptor {
        self.descriptor
    }

    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    pub fn controller(&self) -> &Arc<PollingController> {
        &self.controller
    }

    /// Current value of the metric.
    ///
    /// `Unknown` while the controller is in error, when the value is missing
    /// or `null`, and when the projection fails (logged at warn).
    pub fn state(&self) -> MetricState {
        if self.controller.is_in_error() {
            return MetricState::Unknown;
        }

        let snapshot = self.controller.snapshot();
        match project(snapshot.as_deref(), &self.descriptor.locator) {
            Ok(value) => MetricState::from_option(value),
            Err(e) => {
                warn!("{}: cannot project {}: {}", self.controller.id(), self.descriptor.key, e);
                MetricState::Unknown
            }
        }
    }

    /// Whether the host wants updates for this entity.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Describe the miner this entity belongs to.
    pub fn device_info(&self) -> DeviceInfo {
        let mut info = DeviceInfo::new(&self.instance_name);
        let Some(snapshot) = self.controller.snapshot() else {
            return info;
        };

        info.sw_version = text(&snapshot, &["version"]);
        info.manufacturer = text(&snapshot, &["cpu", "brand"]);

        let arch = text(&snapshot, &["cpu", "arch"]);
        let assembly = text(&snapshot, &["cpu", "assembly"]);
        if arch.is_some() || assembly.is_some() {
            info.model = Some(format!(
                "{}-{}",
                arch.as_deref().unwrap_or(MetricState::UNKNOWN),
                assembly.as_deref().unwrap_or(MetricState::UNKNOWN),
            ));
        }

        info
    }
}

impl std::fmt::Debug for MetricEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricEntity")
            .field("unique_id", &self.unique_id)
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

fn text(root: &Value, path: &[&str]) -> Option<String> {
    lookup(root, path).map(|value| match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}
