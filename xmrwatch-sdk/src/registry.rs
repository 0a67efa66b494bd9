//! Registry of the metric entities published for one controller.
//!
//! On every controller notification the registry walks the summary metric
//! table: entities that already exist are scheduled for a state update (if
//! enabled), and missing ones are created and handed to the host in a single
//! batch.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::debug;

use xmrwatch_types::SUMMARY_METRICS;

use crate::controller::PollingController;
use crate::entity::MetricEntity;

/// The surface that displays entities.
pub trait EntityHost: Send + Sync {
    /// Register newly created entities. Called with a non-empty batch.
    fn add_entities(&self, entities: Vec<Arc<MetricEntity>>);

    /// Ask the host to re-read an entity's state.
    fn schedule_update(&self, entity: &Arc<MetricEntity>);
}

/// Keeps the entity set of one controller in step with its notifications.
pub struct MetricRegistry {
    instance_name: String,
    controller: Arc<PollingController>,
    host: Arc<dyn EntityHost>,
    entities: RwLock<HashMap<String, Arc<MetricEntity>>>,
}

impl MetricRegistry {
    /// Create a registry and subscribe it to the controller.
    ///
    /// The subscription holds only a weak reference; the caller keeps the
    /// registry alive for as long as it should receive notifications.
    pub fn attach(
        instance_name: impl Into<String>,
        controller: Arc<PollingController>,
        host: Arc<dyn EntityHost>,
    ) -> Arc<Self> {
        let registry = Arc::new(Self {
            instance_name: instance_name.into(),
            controller: controller.clone(),
            host,
            entities: RwLock::new(HashMap::new()),
        });

        let weak: Weak<Self> = Arc::downgrade(&registry);
        controller.listen(move || {
            if let Some(registry) = weak.upgrade() {
                registry.update_items();
            }
        });

        registry
    }

    /// Reconcile the entity set with the metric table.
    pub fn update_items(&self) {
        let mut scheduled = Vec::new();
        let mut created = Vec::new();

        {
            let mut entities = self.entities.write();
            for descriptor in SUMMARY_METRICS {
                let id = MetricEntity::entity_id(&self.instance_name, descriptor.key);
                match entities.get(&id) {
                    Some(entity) if entity.is_enabled() => scheduled.push(entity.clone()),
                    Some(_) => {}
                    None => {
                        let entity = Arc::new(MetricEntity::new(
                            self.instance_name.clone(),
                            self.controller.clone(),
                            descriptor,
                        ));
                        entities.insert(id, entity.clone());
                        created.push(entity);
                    }
                }
            }
        }

        debug!(
            "update_items({}) - {} scheduled, {} new",
            self.instance_name,
            scheduled.len(),
            created.len()
        );

        for entity in &scheduled {
            self.host.schedule_update(entity);
        }
        if !created.is_empty() {
            self.host.add_entities(created);
        }
    }

    /// Entities created so far, in metric table order.
    pub fn entities(&self) -> Vec<Arc<MetricEntity>> {
        let entities = self.entities.read();
        SUMMARY_METRICS
            .iter()
            .filter_map(|d| entities.get(&MetricEntity::entity_id(&self.instance_name, d.key)))
            .cloned()
            .collect()
    }

    /// Look up an entity by metric key.
    pub fn get(&self, key: &str) -> Option<Arc<MetricEntity>> {
        self.entities
            .read()
            .get(&MetricEntity::entity_id(&self.instance_name, key))
            .cloned()
    }

    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    pub fn controller(&self) -> &Arc<PollingController> {
        &self.controller
    }
}

impl std::fmt::Debug for MetricRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricRegistry")
            .field("instance_name", &self.instance_name)
            .field("entities", &self.entities.read().len())
            .finish()
    }
}
