//! Controller, registry and HTTP fetcher wired together against a loopback
//! miner API.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use xmrwatch_adapters::{HttpFetcher, SummaryEndpoint};
use xmrwatch_sdk::{EntityHost, MetricEntity, MetricRegistry, MetricState, PollingController, RefreshOutcome};
use xmrwatch_types::ConnectionConfig;

const SUMMARY: &str = r#"{"results":{"diff_current":1234,"shares_good":5,"shares_total":7},"algo":"rx/0","connection":{"pool":"pool.example:3333"},"hashrate":{"total":[100,90,80]}}"#;

/// Answer one connection per scripted response, in order.
async fn serve(responses: Vec<(&'static str, &'static str)>) -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        for (status_line, body) in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        }
    });

    (format!("http://{}", addr), handle)
}

/// Host that records every state it is asked to show.
#[derive(Default)]
struct TableHost {
    entities: Mutex<Vec<Arc<MetricEntity>>>,
    rendered: Mutex<Vec<(String, MetricState)>>,
}

impl EntityHost for TableHost {
    fn add_entities(&self, entities: Vec<Arc<MetricEntity>>) {
        let mut rendered = self.rendered.lock();
        for entity in &entities {
            rendered.push((entity.key().to_string(), entity.state()));
        }
        self.entities.lock().extend(entities);
    }

    fn schedule_update(&self, entity: &Arc<MetricEntity>) {
        self.rendered
            .lock()
            .push((entity.key().to_string(), entity.state()));
    }
}

fn controller(address: String) -> Arc<PollingController> {
    let fetcher = HttpFetcher::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    let endpoint = SummaryEndpoint::new(ConnectionConfig::new(address));
    Arc::new(PollingController::new("rig1", Arc::new(endpoint), Arc::new(fetcher)))
}

#[tokio::test]
async fn summary_metrics_are_published() {
    let (address, server) = serve(vec![("200 OK", SUMMARY)]).await;
    let controller = controller(address);
    let host = Arc::new(TableHost::default());
    let registry = MetricRegistry::attach("rig1", controller.clone(), host.clone());

    assert_eq!(controller.refresh().await, RefreshOutcome::Updated);
    server.await.unwrap();

    let states: Vec<(&str, MetricState)> = registry
        .entities()
        .iter()
        .map(|e| (e.key(), e.state()))
        .collect();
    assert_eq!(
        states,
        vec![
            ("hashrate10s", MetricState::Value(json!(100))),
            ("hashrate1m", MetricState::Value(json!(90))),
            ("hashrate15m", MetricState::Value(json!(80))),
            ("difficulty", MetricState::Value(json!(1234))),
            ("shares_good", MetricState::Value(json!(5))),
            ("shares_total", MetricState::Value(json!(7))),
            ("connection", MetricState::Value(json!("pool.example:3333"))),
            ("algo", MetricState::Value(json!("rx/0"))),
        ]
    );

    assert_eq!(host.entities.lock().len(), 8);
    assert_eq!(registry.get("algo").unwrap().state().to_string(), "rx/0");
    controller.reset();
}

#[tokio::test]
async fn outage_and_recovery() {
    let (address, server) = serve(vec![
        ("200 OK", SUMMARY),
        ("500 Internal Server Error", r#"{"error":"boom"}"#),
        ("200 OK", ""),
        ("200 OK", SUMMARY),
    ])
    .await;
    let controller = controller(address);
    let host = Arc::new(TableHost::default());
    let registry = MetricRegistry::attach("rig1", controller.clone(), host.clone());

    assert_eq!(controller.refresh().await, RefreshOutcome::Updated);
    assert_eq!(controller.refresh().await, RefreshOutcome::NoData);
    assert!(controller.is_in_error());
    assert!(registry.entities().iter().all(|e| e.state().is_unknown()));

    assert_eq!(controller.refresh().await, RefreshOutcome::NoData);
    assert_eq!(controller.refresh().await, RefreshOutcome::Updated);
    assert!(!controller.is_in_error());
    server.await.unwrap();

    // One creation batch, then a full update pass per refresh
    assert_eq!(host.entities.lock().len(), 8);
    assert_eq!(host.rendered.lock().len(), 8 * 4);

    let rendered = host.rendered.lock();
    let last_algo = rendered.iter().rev().find(|(key, _)| key == "algo").unwrap();
    assert_eq!(last_algo.1, MetricState::Value(json!("rx/0")));
}

#[tokio::test]
async fn unreachable_miner_stays_in_error() {
    // Bind and drop to get a port with nothing listening
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let controller = controller(address);
    let host = Arc::new(TableHost::default());
    let registry = MetricRegistry::attach("rig1", controller.clone(), host.clone());

    assert_eq!(controller.refresh().await, RefreshOutcome::NoData);
    assert!(controller.is_in_error());
    assert_eq!(registry.entities().len(), 8);
    assert!(registry.get("difficulty").unwrap().state().is_unknown());
    assert!(registry.get("algo").unwrap().device_info().sw_version.is_none());
}
