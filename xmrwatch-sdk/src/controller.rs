//! The polling controller: periodic refresh, snapshot cache and change
//! notification for one miner endpoint.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use xmrwatch_adapters::{Endpoint, Fetcher};
use xmrwatch_types::DOMAIN;

use crate::dispatcher::{Dispatcher, Unsubscribe};
use crate::projector::lookup;

/// Period of the refresh timer.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Maximum time a refresh waits for the refresh lock before giving up.
pub const LOCK_TIMEOUT: Duration = Duration::from_secs(10);

/// What a call to [`PollingController::refresh`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A body was received and parsed; the snapshot was replaced.
    Updated,
    /// No body was received; the snapshot is now absent.
    NoData,
    /// A body was received but did not parse; the snapshot is now absent.
    Malformed,
    /// The refresh lock could not be acquired in time; nothing changed.
    Skipped,
}

/// Polls one endpoint and caches the latest parsed response.
///
/// The controller is either healthy (a snapshot is present) or in error (no
/// snapshot). Every refresh that gets past the lock replaces the snapshot
/// wholesale and then sends exactly one change notification.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use xmrwatch_adapters::{HttpFetcher, SummaryEndpoint};
/// use xmrwatch_sdk::PollingController;
/// use xmrwatch_types::ConnectionConfig;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let endpoint = SummaryEndpoint::new(ConnectionConfig::new("http://localhost:8080"));
///     let controller = Arc::new(PollingController::new(
///         "rig1",
///         Arc::new(endpoint),
///         Arc::new(HttpFetcher::builder().build()?),
///     ));
///
///     controller.listen(|| println!("new data"));
///     controller.initialize().await;
///
///     println!("algo: {:?}", controller.read(&["algo"]));
///     controller.reset();
///     Ok(())
/// }
/// ```
pub struct PollingController {
    instance_name: String,
    id: String,
    endpoint: Arc<dyn Endpoint>,
    fetcher: Arc<dyn Fetcher>,
    refresh_lock: tokio::sync::Mutex<()>,
    snapshot: RwLock<Option<Arc<Value>>>,
    last_refresh: RwLock<Option<Instant>>,
    dispatcher: Dispatcher,
    listeners: Mutex<Vec<Unsubscribe>>,
    timer: Mutex<Option<RefreshTimer>>,
    initialized: AtomicBool,
    closed: AtomicBool,
}

impl PollingController {
    /// Create a controller for an instance polling the given endpoint.
    pub fn new(
        instance_name: impl Into<String>,
        endpoint: Arc<dyn Endpoint>,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        let instance_name = instance_name.into();
        let id = format!("{}-{}", instance_name, endpoint.kind());
        let dispatcher = Dispatcher::new(format!("{}-update-{}", DOMAIN, id));

        Self {
            instance_name,
            id,
            endpoint,
            fetcher,
            refresh_lock: tokio::sync::Mutex::new(()),
            snapshot: RwLock::new(None),
            last_refresh: RwLock::new(None),
            dispatcher,
            listeners: Mutex::new(Vec::new()),
            timer: Mutex::new(None),
            initialized: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }

    /// Refresh once, then refresh every [`REFRESH_INTERVAL`].
    ///
    /// Each timer tick spawns its own refresh, so a tick that lands while a
    /// slow refresh holds the lock waits for it (up to [`LOCK_TIMEOUT`])
    /// rather than being queued behind the timer. Only the first call has
    /// any effect.
    pub async fn initialize(self: &Arc<Self>) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            warn!("initialize({}) called more than once", self.id);
            return;
        }

        self.refresh().await;

        let mut timer = self.timer.lock();
        if self.closed.load(Ordering::SeqCst) {
            debug!("initialize({}) - reset before timer was armed", self.id);
            return;
        }
        *timer = Some(RefreshTimer::start(Arc::downgrade(self), REFRESH_INTERVAL));
    }

    /// Fetch, parse and store the endpoint's data, then notify listeners.
    ///
    /// Waits at most [`LOCK_TIMEOUT`] for a refresh already in progress; if it
    /// is still running the refresh is abandoned without touching the
    /// snapshot or notifying anyone.
    pub async fn refresh(&self) -> RefreshOutcome {
        debug!("refresh({})", self.id);

        let _guard = match tokio::time::timeout(LOCK_TIMEOUT, self.refresh_lock.lock()).await {
            Ok(guard) => guard,
            Err(_) => {
                warn!("refresh({}) lock failed", self.id);
                return RefreshOutcome::Skipped;
            }
        };

        let response = self.fetcher.fetch(self.endpoint.as_ref()).await;

        let (snapshot, outcome) = match response.into_payload() {
            None => {
                info!("refresh({}) - no data received", self.id);
                (None, RefreshOutcome::NoData)
            }
            Some(body) => match serde_json::from_str::<Value>(&body) {
                Ok(document) => (Some(Arc::new(document)), RefreshOutcome::Updated),
                Err(e) => {
                    warn!("refresh({}) - unparsable response: {}", self.id, e);
                    (None, RefreshOutcome::Malformed)
                }
            },
        };

        *self.snapshot.write() = snapshot;
        *self.last_refresh.write() = Some(Instant::now());

        let delivered = self.dispatcher.send();
        debug!("refresh({}) -> {:?}, notified {} listener(s)", self.id, outcome, delivered);

        outcome
    }

    /// Stop the refresh timer and drop every listener registration.
    ///
    /// Safe to call more than once. A refresh already in flight still
    /// completes, but its notification reaches nobody.
    pub fn reset(&self) {
        self.closed.store(true, Ordering::SeqCst);

        if let Some(timer) = self.timer.lock().take() {
            timer.stop();
        }

        let listeners: Vec<Unsubscribe> = self.listeners.lock().drain(..).collect();
        if !listeners.is_empty() {
            debug!("reset({}) - removing {} listener(s)", self.id, listeners.len());
        }
        for listener in listeners {
            listener.unsubscribe();
        }
    }

    /// Register a callback for this controller's change notifications.
    ///
    /// The registration is owned by the controller and removed by
    /// [`reset`](Self::reset). After a reset the callback is dropped
    /// without being registered.
    pub fn listen<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut listeners = self.listeners.lock();
        if self.closed.load(Ordering::SeqCst) {
            debug!("listen({}) after reset - ignored", self.id);
            return;
        }
        listeners.push(self.dispatcher.connect(callback));
    }

    /// Whether the controller has no snapshot.
    pub fn is_in_error(&self) -> bool {
        self.snapshot.read().is_none()
    }

    /// Read the value at `path` in the current snapshot.
    ///
    /// Returns `None` if there is no snapshot, any key along the path is
    /// missing, or the value is `null`.
    pub fn read(&self, path: &[&str]) -> Option<Value> {
        let snapshot = self.snapshot();
        snapshot.as_deref().and_then(|root| lookup(root, path).cloned())
    }

    /// The current snapshot, if any.
    pub fn snapshot(&self) -> Option<Arc<Value>> {
        self.snapshot.read().clone()
    }

    /// Name of the notification channel this controller sends on.
    pub fn update_signal(&self) -> &str {
        self.dispatcher.signal()
    }

    /// The configured instance name.
    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    /// `"<instance>-<endpoint kind>"`, used in log lines.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The endpoint being polled.
    pub fn endpoint(&self) -> &dyn Endpoint {
        self.endpoint.as_ref()
    }

    /// When the last refresh that got past the lock finished.
    pub fn last_refresh(&self) -> Option<Instant> {
        *self.last_refresh.read()
    }

    /// Whether the refresh timer is armed.
    pub fn is_polling(&self) -> bool {
        self.timer.lock().is_some()
    }
}

impl std::fmt::Debug for PollingController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollingController")
            .field("id", &self.id)
            .field("resource", &self.endpoint.resource())
            .field("in_error", &self.is_in_error())
            .finish()
    }
}

/// Background task that spawns a refresh on every tick.
struct RefreshTimer {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl RefreshTimer {
    fn start(controller: std::sync::Weak<PollingController>, period: Duration) -> Self {
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut ticker = tokio::time::interval_at(start, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = stop_rx.changed() => break,
                    _ = ticker.tick() => {
                        let Some(controller) = controller.upgrade() else {
                            break;
                        };
                        tokio::spawn(async move {
                            controller.refresh().await;
                        });
                    }
                }
            }
        });

        Self { stop_tx, task }
    }

    fn stop(self) {
        let _ = self.stop_tx.send(true);
        self.task.abort();
    }
}
