//! # xmrwatch-sdk
//!
//! Polling, projection and publication of XMRig miner metrics.
//!
//! A [`PollingController`] fetches one miner endpoint on a fixed interval and
//! caches the parsed response. Every refresh sends a change notification; a
//! [`MetricRegistry`] attached to the controller turns those notifications
//! into [`MetricEntity`] registrations and state updates on an
//! [`EntityHost`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use xmrwatch_sdk::{EntityHost, MetricEntity, MetricRegistry, PollingController};
//! use xmrwatch_adapters::{HttpFetcher, SummaryEndpoint};
//! use xmrwatch_types::ConnectionConfig;
//!
//! struct PrintHost;
//!
//! impl EntityHost for PrintHost {
//!     fn add_entities(&self, entities: Vec<Arc<MetricEntity>>) {
//!         for entity in entities {
//!             println!("new: {}", entity.name());
//!         }
//!     }
//!
//!     fn schedule_update(&self, entity: &Arc<MetricEntity>) {
//!         println!("{} = {}", entity.name(), entity.state());
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let endpoint = SummaryEndpoint::new(ConnectionConfig::new("http://localhost:8080"));
//!     let fetcher = HttpFetcher::builder().build()?;
//!     let controller = Arc::new(PollingController::new("rig1", Arc::new(endpoint), Arc::new(fetcher)));
//!
//!     let _registry = MetricRegistry::attach("rig1", controller.clone(), Arc::new(PrintHost));
//!     controller.initialize().await;
//!
//!     tokio::time::sleep(std::time::Duration::from_secs(120)).await;
//!     controller.reset();
//!     Ok(())
//! }
//! ```
//!
//! ## Concurrency
//!
//! - Refreshes of one controller are serialized; a refresh that cannot take
//!   the lock within [`LOCK_TIMEOUT`] is dropped
//! - Listeners run synchronously after the snapshot is written
//! - [`PollingController::reset`] stops the timer and removes every listener

mod controller;
mod dispatcher;
mod entity;
mod projector;
mod registry;

pub use controller::{PollingController, RefreshOutcome, LOCK_TIMEOUT, REFRESH_INTERVAL};
pub use dispatcher::{Callback, Dispatcher, Unsubscribe};
pub use entity::MetricEntity;
pub use projector::{lookup, project, ProjectionError};
pub use registry::{EntityHost, MetricRegistry};

// Re-export types for convenience
pub use xmrwatch_types::{DeviceInfo, Locator, MetricDescriptor, MetricState, SUMMARY_METRICS};
