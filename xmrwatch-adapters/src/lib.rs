//! # xmrwatch-adapters
//!
//! Fetching miner data over HTTP.
//!
//! This crate provides the network side of xmrwatch: the [`Endpoint`]
//! strategy that tells a polling controller what to request, the
//! [`Fetcher`] that performs the request, and the setup-time [`probe`]
//! that validates a new instance before it is polled.
//!
//! ## Supported Endpoints
//!
//! - **XMRig summary** ([`SummaryEndpoint`]) - `GET <address>/2/summary` with
//!   an optional bearer token
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use xmrwatch_adapters::{Fetcher, HttpFetcher, SummaryEndpoint};
//! use xmrwatch_types::ConnectionConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = HttpFetcher::builder().build()?;
//!     let endpoint = SummaryEndpoint::new(
//!         ConnectionConfig::new("http://localhost:8080").with_token("secret"),
//!     );
//!
//!     let response = fetcher.fetch(&endpoint).await;
//!     if let Some(body) = response.into_payload() {
//!         println!("{}", body);
//!     }
//!     Ok(())
//! }
//! ```

pub mod endpoint;
pub mod error;
pub mod fetch;
pub mod probe;

pub use endpoint::{Endpoint, SummaryEndpoint, SUMMARY_PATH};
pub use error::AdapterError;
pub use fetch::{FetchResponse, Fetcher, HttpFetcher, HttpFetcherBuilder};
pub use probe::SetupError;

// Re-export types for convenience
pub use xmrwatch_types::{ConnectionConfig, InstanceConfig};
