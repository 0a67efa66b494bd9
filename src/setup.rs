//! Instance setup: validation, wiring and start-up.

use std::sync::Arc;

use tracing::{info, warn};

use xmrwatch_adapters::{probe, Fetcher, SetupError, SummaryEndpoint};
use xmrwatch_sdk::{EntityHost, MetricRegistry, PollingController};
use xmrwatch_types::InstanceConfig;

/// Health of an instance as shown in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum InstanceHealth {
    /// Has a snapshot.
    Healthy,
    /// Not refreshed yet.
    Pending,
    /// Last refresh produced no usable data.
    Errored,
}

impl InstanceHealth {
    /// Returns the status symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            InstanceHealth::Healthy => "●",
            InstanceHealth::Pending => "○",
            InstanceHealth::Errored => "✗",
        }
    }
}

/// A validated instance with its controller and registry.
#[derive(Debug)]
pub struct Instance {
    pub config: InstanceConfig,
    pub controller: Arc<PollingController>,
    pub registry: Arc<MetricRegistry>,
}

impl Instance {
    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn health(&self) -> InstanceHealth {
        if self.controller.last_refresh().is_none() {
            InstanceHealth::Pending
        } else if self.controller.is_in_error() {
            InstanceHealth::Errored
        } else {
            InstanceHealth::Healthy
        }
    }
}

/// An instance that failed validation.
#[derive(Debug)]
pub struct Rejected {
    pub config: InstanceConfig,
    pub error: SetupError,
}

/// Validate every configured instance in order and wire up the accepted ones.
///
/// Each candidate is checked against the instances accepted before it.
/// Controllers are created but not started; see [`start`].
///
/// ```no_run
/// use std::sync::Arc;
/// use xmrwatch::{setup_instances, TuiHost};
/// use xmrwatch_adapters::HttpFetcher;
/// use xmrwatch_types::InstanceConfig;
///
/// # tokio_test::block_on(async {
/// let fetcher = Arc::new(HttpFetcher::builder().build().unwrap());
/// let configs = vec![InstanceConfig::new("rig1", "http://10.0.0.5:8080")];
///
/// let (instances, rejected) = setup_instances(configs, fetcher, Arc::new(TuiHost::new())).await;
/// for r in &rejected {
///     println!("{}: {}", r.config.name, r.error.code());
/// }
/// xmrwatch::setup::start(&instances).await;
/// # });
/// ```
pub async fn setup_instances(
    configs: Vec<InstanceConfig>,
    fetcher: Arc<dyn Fetcher>,
    host: Arc<dyn EntityHost>,
) -> (Vec<Instance>, Vec<Rejected>) {
    let mut accepted: Vec<InstanceConfig> = Vec::new();
    let mut instances = Vec::new();
    let mut rejected = Vec::new();

    for config in configs {
        if let Err(error) = probe::validate(&config, &accepted, fetcher.as_ref()).await {
            warn!("setup({}) rejected: {} ({})", config.name, error, error.code());
            rejected.push(Rejected { config, error });
            continue;
        }

        info!("setup({}) accepted at {}", config.name, config.address);
        let endpoint = SummaryEndpoint::new(config.connection());
        let controller = Arc::new(PollingController::new(
            config.name.clone(),
            Arc::new(endpoint),
            fetcher.clone(),
        ));
        let registry = MetricRegistry::attach(config.name.clone(), controller.clone(), host.clone());

        accepted.push(config.clone());
        instances.push(Instance {
            config,
            controller,
            registry,
        });
    }

    (instances, rejected)
}

/// Run each controller's first refresh and arm its timer.
pub async fn start(instances: &[Instance]) {
    for instance in instances {
        instance.controller.initialize().await;
    }
}

/// Stop every controller.
pub fn shutdown(instances: &[Instance]) {
    for instance in instances {
        instance.controller.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use xmrwatch_adapters::{Endpoint, FetchResponse};

    use crate::host::TuiHost;

    /// Answers by resource URL; unknown URLs fail.
    #[derive(Debug, Default)]
    struct MapFetcher {
        responses: HashMap<String, (u16, &'static str)>,
        requests: Mutex<Vec<String>>,
    }

    impl MapFetcher {
        fn with(mut self, address: &str, status: u16, body: &'static str) -> Self {
            self.responses.insert(format!("{}/2/summary", address), (status, body));
            self
        }
    }

    #[async_trait]
    impl Fetcher for MapFetcher {
        async fn fetch(&self, endpoint: &dyn Endpoint) -> FetchResponse {
            let resource = endpoint.resource();
            self.requests.lock().push(resource.clone());
            match self.responses.get(&resource) {
                Some((status, body)) => FetchResponse::new(*status, *body),
                None => FetchResponse::failed(),
            }
        }
    }

    #[tokio::test]
    async fn test_setup_accepts_and_rejects() {
        let fetcher = Arc::new(
            MapFetcher::default()
                .with("http://rig1", 200, r#"{"algo":"rx/0"}"#)
                .with("http://rig2", 403, "")
                .with("http://rig3", 200, ""),
        );
        let configs = vec![
            InstanceConfig::new("rig1", "http://rig1"),
            InstanceConfig::new("rig2", "http://rig2"),
            InstanceConfig::new("rig3", "http://rig3"),
            InstanceConfig::new("rig1", "http://elsewhere"),
            InstanceConfig::new("copy", "http://rig1"),
        ];

        let (instances, rejected) = setup_instances(configs, fetcher.clone(), Arc::new(TuiHost::new())).await;

        let names: Vec<&str> = instances.iter().map(|i| i.name()).collect();
        assert_eq!(names, vec!["rig1"]);

        let codes: Vec<(&str, &str)> = rejected
            .iter()
            .map(|r| (r.config.name.as_str(), r.error.code()))
            .collect();
        assert_eq!(
            codes,
            vec![
                ("rig2", "not_authorized"),
                ("rig3", "no_answer"),
                ("rig1", "name_exists"),
                ("copy", "address_exists"),
            ]
        );

        // Collisions are rejected without a probe
        assert_eq!(fetcher.requests.lock().len(), 3);
    }

    #[tokio::test]
    async fn test_rejected_instance_does_not_block_its_address() {
        let fetcher = Arc::new(
            MapFetcher::default()
                .with("http://rig1", 200, "")
                .with("http://rig2", 200, "{}"),
        );
        let configs = vec![
            InstanceConfig::new("first", "http://rig1"),
            InstanceConfig::new("first", "http://rig2"),
        ];

        let (instances, rejected) = setup_instances(configs, fetcher, Arc::new(TuiHost::new())).await;
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].config.address, "http://rig2");
        assert_eq!(rejected.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_and_shutdown() {
        let fetcher = Arc::new(MapFetcher::default().with("http://rig1", 200, r#"{"algo":"rx/0"}"#));
        let host = Arc::new(TuiHost::new());
        let (instances, _) = setup_instances(
            vec![InstanceConfig::new("rig1", "http://rig1")],
            fetcher.clone(),
            host.clone(),
        )
        .await;

        assert_eq!(instances[0].health(), InstanceHealth::Pending);

        start(&instances).await;
        assert_eq!(instances[0].health(), InstanceHealth::Healthy);
        assert!(instances[0].controller.is_polling());
        assert_eq!(host.entities_for("rig1").len(), 8);

        shutdown(&instances);
        assert!(!instances[0].controller.is_polling());

        // Probe plus the first refresh
        assert_eq!(fetcher.requests.lock().len(), 2);
    }
}
