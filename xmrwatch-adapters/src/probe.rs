//! Setup-time validation of a new miner instance.
//!
//! Before a polling controller is created for an instance, the instance name
//! and address are checked against the instances already configured, then a
//! single live probe of the summary endpoint classifies anything that would
//! keep the controller from ever getting data.

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use xmrwatch_types::InstanceConfig;

use crate::{Fetcher, SummaryEndpoint};

/// Reasons a new instance is rejected at setup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    /// Another instance already uses this name.
    #[error("an instance named '{0}' is already configured")]
    NameExists(String),

    /// Another instance already polls this address.
    #[error("address '{0}' is already configured")]
    AddressExists(String),

    /// The miner refused the credentials.
    #[error("not authorized")]
    NotAuthorized,

    /// The miner sent no answer.
    #[error("no answer from miner")]
    NoAnswer,

    /// Anything else, such as an unparsable answer.
    #[error("unexpected error: {0}")]
    Unknown(String),
}

impl SetupError {
    /// The error code shown next to the setup input.
    pub fn code(&self) -> &'static str {
        match self {
            SetupError::NameExists(_) => "name_exists",
            SetupError::AddressExists(_) => "address_exists",
            SetupError::NotAuthorized => "not_authorized",
            SetupError::NoAnswer => "no_answer",
            SetupError::Unknown(_) => "unknown_exception",
        }
    }
}

/// Validate a candidate instance against the already configured ones.
///
/// Name and address collisions are reported without touching the network.
/// Otherwise the summary endpoint is probed once.
pub async fn validate(
    candidate: &InstanceConfig,
    existing: &[InstanceConfig],
    fetcher: &dyn Fetcher,
) -> Result<(), SetupError> {
    if existing.iter().any(|i| i.name == candidate.name) {
        return Err(SetupError::NameExists(candidate.name.clone()));
    }
    if existing.iter().any(|i| i.address == candidate.address) {
        return Err(SetupError::AddressExists(candidate.address.clone()));
    }

    let endpoint = SummaryEndpoint::new(candidate.connection());
    let response = fetcher.fetch(&endpoint).await;
    debug!("Probe of '{}' returned status {:?}", candidate.name, response.status);

    if response.is_forbidden() {
        return Err(SetupError::NotAuthorized);
    }
    let Some(body) = response.body else {
        return Err(SetupError::NoAnswer);
    };

    let document: Value =
        serde_json::from_str(&body).map_err(|e| SetupError::Unknown(e.to_string()))?;
    if let Some(error) = document.get("error") {
        if error == "Unauthorized" {
            return Err(SetupError::NotAuthorized);
        }
        warn!("Error received from miner '{}': {}", candidate.name, error);
    }

    Ok(())
}
