//! Endpoint strategies - what to fetch and how to authenticate.

use std::fmt::Debug;

use xmrwatch_types::ConnectionConfig;

/// Path of the XMRig summary resource, relative to the API address.
pub const SUMMARY_PATH: &str = "/2/summary";

/// Supplies the resource a polling controller fetches.
///
/// A controller is generic over the endpoint it polls; the endpoint decides
/// the URL and the credentials attached to each request.
pub trait Endpoint: Send + Sync + Debug {
    /// Full URL of the resource to GET.
    fn resource(&self) -> String;

    /// Bearer token to send in the `Authorization` header, if any.
    fn bearer_token(&self) -> Option<&str>;

    /// Short name of the resource kind (e.g., "summary"), used in
    /// notification channel names.
    fn kind(&self) -> &str;
}

/// The XMRig `/2/summary` endpoint.
///
/// # Example
///
/// ```rust
/// use xmrwatch_adapters::{Endpoint, SummaryEndpoint};
/// use xmrwatch_types::ConnectionConfig;
///
/// let endpoint = SummaryEndpoint::new(
///     ConnectionConfig::new("http://10.0.0.5:8080").with_token("secret"),
/// );
/// assert_eq!(endpoint.resource(), "http://10.0.0.5:8080/2/summary");
/// assert_eq!(endpoint.bearer_token(), Some("secret"));
/// ```
#[derive(Debug, Clone)]
pub struct SummaryEndpoint {
    connection: ConnectionConfig,
}

impl SummaryEndpoint {
    /// Create a summary endpoint for a connection.
    pub fn new(connection: ConnectionConfig) -> Self {
        Self { connection }
    }

    /// The connection this endpoint was built from.
    pub fn connection(&self) -> &ConnectionConfig {
        &self.connection
    }
}

impl Endpoint for SummaryEndpoint {
    fn resource(&self) -> String {
        format!("{}{}", self.connection.address, SUMMARY_PATH)
    }

    fn bearer_token(&self) -> Option<&str> {
        self.connection.token.as_deref()
    }

    fn kind(&self) -> &str {
        "summary"
    }
}
