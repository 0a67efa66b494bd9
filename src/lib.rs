//! # xmrwatch
//!
//! A terminal dashboard and library for polling XMRig miner APIs.
//!
//! Each configured miner instance is validated once at startup, then polled
//! every 30 seconds by a [`PollingController`](xmrwatch_sdk::PollingController).
//! Its metrics are published through a
//! [`MetricRegistry`](xmrwatch_sdk::MetricRegistry) into the [`TuiHost`],
//! which the render loop draws from.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  settings ──▶ setup ──▶ Instance { controller, registry }    │
//! │                              │ notification                  │
//! │                              ▼                               │
//! │  ┌─────────┐    ┌─────────┐    ┌─────────┐    ┌──────────┐  │
//! │  │ TuiHost │◀───│   app   │───▶│   ui    │───▶│ Terminal │  │
//! │  │(entities)    │ (state) │    │(render) │    │          │  │
//! │  └─────────┘    └─────────┘    └─────────┘    └──────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`settings`]**: Config file, environment and command line instances
//! - **[`setup`]**: Validation probe and controller/registry wiring
//! - **[`host`]**: Entity store implementing [`EntityHost`](xmrwatch_sdk::EntityHost)
//! - **[`app`]**: Selection, keyboard actions and export
//! - **[`ui`]**: Terminal rendering using ratatui
//!
//! ## Usage
//!
//! ```bash
//! # Poll one miner given on the command line
//! xmrwatch --name rig1 --address http://10.0.0.5:8080 --token secret
//!
//! # Poll every miner listed in a config file
//! xmrwatch --config xmrwatch.toml
//!
//! # Refresh once and write the state as JSON
//! xmrwatch --config xmrwatch.toml --export state.json
//! ```

pub mod app;
pub mod events;
pub mod export;
pub mod format;
pub mod host;
pub mod settings;
pub mod setup;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use host::TuiHost;
pub use settings::{CliInstance, Settings};
pub use setup::{setup_instances, Instance, InstanceHealth, Rejected};
