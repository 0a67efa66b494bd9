//! JSON export of every instance's current state.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use serde_json::{json, Value};

use xmrwatch_types::DeviceInfo;

use crate::host::TuiHost;
use crate::setup::{Instance, InstanceHealth};

/// Build the export document.
///
/// Metric states are the ones last published to `host`, so disabled metrics
/// export the value they were frozen at.
pub fn export_document(instances: &[Instance], host: &TuiHost) -> Value {
    let count = |health: InstanceHealth| instances.iter().filter(|i| i.health() == health).count();
    let healthy = count(InstanceHealth::Healthy);
    let pending = count(InstanceHealth::Pending);
    let in_error = count(InstanceHealth::Errored);

    let instances: Vec<Value> = instances.iter().map(|i| export_instance(i, host)).collect();

    json!({
        "summary": {
            "total_instances": instances.len(),
            "healthy": healthy,
            "pending": pending,
            "in_error": in_error,
        },
        "instances": instances,
    })
}

fn export_instance(instance: &Instance, host: &TuiHost) -> Value {
    let entities = instance.registry.entities();
    let device = entities
        .first()
        .map(|e| e.device_info())
        .unwrap_or_else(|| DeviceInfo::new(instance.name()));

    let metrics: Vec<Value> = entities
        .iter()
        .map(|e| {
            json!({
                "key": e.key(),
                "name": e.name(),
                "unique_id": e.unique_id(),
                "state": host.state_of(e),
                "unit": e.unit(),
                "icon": e.icon(),
                "enabled": e.is_enabled(),
            })
        })
        .collect();

    json!({
        "name": instance.name(),
        "address": instance.config.address,
        "update_signal": instance.controller.update_signal(),
        "in_error": instance.controller.is_in_error(),
        "device": device,
        "metrics": metrics,
    })
}

/// Write the export document to `path` as pretty-printed JSON.
pub fn write_export(instances: &[Instance], host: &TuiHost, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&export_document(instances, host))?;
    let mut file = std::fs::File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}
