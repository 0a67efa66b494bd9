//! The terminal UI as an entity host.
//!
//! Registries hand new entities and update requests to [`TuiHost`] from
//! whatever runtime thread ran the refresh. The host records the state each
//! entity had when it was last added or scheduled; the render loop picks the
//! changes up through [`TuiHost::take_dirty`] and draws from
//! [`TuiHost::state_of`]. A disabled entity is never scheduled, so its shown
//! state stays at the last value it was updated with.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use xmrwatch_sdk::{EntityHost, MetricEntity, MetricState};

/// Entity store shared between the registries and the render loop.
#[derive(Debug, Default)]
pub struct TuiHost {
    entities: RwLock<HashMap<String, Vec<Arc<MetricEntity>>>>,
    states: RwLock<HashMap<String, MetricState>>,
    dirty: AtomicBool,
    updates: AtomicU64,
}

impl TuiHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entities registered for an instance, in registration order.
    pub fn entities_for(&self, instance_name: &str) -> Vec<Arc<MetricEntity>> {
        self.entities
            .read()
            .get(instance_name)
            .cloned()
            .unwrap_or_default()
    }

    /// Total number of registered entities.
    pub fn entity_count(&self) -> usize {
        self.entities.read().values().map(Vec::len).sum()
    }

    /// State of `entity` as of its last update, `Unknown` if never updated.
    pub fn state_of(&self, entity: &MetricEntity) -> MetricState {
        self.states
            .read()
            .get(entity.unique_id())
            .cloned()
            .unwrap_or_default()
    }

    fn record(&self, entity: &MetricEntity) {
        let state = entity.state();
        self.states.write().insert(entity.unique_id().to_string(), state);
    }

    /// Number of update requests received so far.
    pub fn update_count(&self) -> u64 {
        self.updates.load(Ordering::Relaxed)
    }

    /// Whether anything changed since the last call. Clears the flag.
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }

    /// Force a redraw on the next frame.
    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }
}

impl EntityHost for TuiHost {
    fn add_entities(&self, entities: Vec<Arc<MetricEntity>>) {
        debug!("add_entities: {} new", entities.len());
        for entity in &entities {
            self.record(entity);
        }

        let mut store = self.entities.write();
        for entity in entities {
            store
                .entry(entity.instance_name().to_string())
                .or_default()
                .push(entity);
        }
        drop(store);
        self.mark_dirty();
    }

    fn schedule_update(&self, entity: &Arc<MetricEntity>) {
        self.record(entity);
        self.updates.fetch_add(1, Ordering::Relaxed);
        self.mark_dirty();
    }
}
