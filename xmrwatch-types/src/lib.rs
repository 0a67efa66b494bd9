//! # xmrwatch-types
//!
//! Core types shared by the xmrwatch crates. This crate defines how a miner
//! instance is configured and how each published metric is derived from the
//! miner's summary document.
//!
//! ## Design Goals
//!
//! - **Data-driven metrics**: every metric is a [`MetricDescriptor`] row in a
//!   static table, not a type of its own
//! - **Two locator shapes**: a key path into the summary document, or an index
//!   into the `hashrate.total` sample array
//! - **Explicit unknowns**: [`MetricState::Unknown`] is the one sentinel shown
//!   whenever a value cannot be derived
//!
//! ## Example
//!
//! ```rust
//! use xmrwatch_types::{Locator, SUMMARY_METRICS};
//!
//! let hashrate = SUMMARY_METRICS.iter().find(|m| m.key == "hashrate1m").unwrap();
//! assert_eq!(hashrate.locator, Locator::Indexed(1));
//! assert_eq!(hashrate.unit, Some("H/s"));
//! ```

mod config;
mod descriptor;
mod device;
mod state;

pub use config::*;
pub use descriptor::*;
pub use device::*;
pub use state::*;

/// Integration domain, used to build notification channel names and device
/// identifiers.
pub const DOMAIN: &str = "xmrig";
