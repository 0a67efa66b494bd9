//! Connection and instance configuration.

use serde::{Deserialize, Serialize};

/// Connection parameters for one miner's HTTP API.
///
/// Immutable once created; owned by the endpoint strategy the polling
/// controller is built with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Base address of the miner API (e.g., "http://10.0.0.5:8080").
    pub address: String,

    /// Bearer token sent as `Authorization: Bearer <token>`, if configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl ConnectionConfig {
    /// Create a connection config without a token.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            token: None,
        }
    }

    /// Attach a bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

/// A configured miner instance: a unique name plus its connection.
///
/// This is the record the setup step produces once and hands to the
/// polling controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceConfig {
    /// Instance name, unique across configured instances.
    pub name: String,

    /// Base address of the miner API, unique across configured instances.
    pub address: String,

    /// Optional bearer token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl InstanceConfig {
    /// Create an instance config without a token.
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            token: None,
        }
    }

    /// Attach a bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// The connection part of this instance.
    pub fn connection(&self) -> ConnectionConfig {
        ConnectionConfig {
            address: self.address.clone(),
            token: self.token.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_without_token() {
        let json = r#"{"name": "rig1", "address": "http://10.0.0.5:8080"}"#;
        let config: InstanceConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.name, "rig1");
        assert_eq!(config.address, "http://10.0.0.5:8080");
        assert!(config.token.is_none());
    }

    #[test]
    fn test_connection_carries_token() {
        let config = InstanceConfig::new("rig1", "http://rig1:8080").with_token("secret");
        let connection = config.connection();

        assert_eq!(connection, ConnectionConfig::new("http://rig1:8080").with_token("secret"));
    }

    #[test]
    fn token_is_skipped_when_absent() {
        let json = serde_json::to_string(&InstanceConfig::new("rig1", "http://rig1")).unwrap();
        assert!(!json.contains("token"));
    }
}
