//! Change notification channel for a single controller.
//!
//! Each controller owns one [`Dispatcher`]. Listeners register a callback and
//! get back an [`Unsubscribe`] handle; sending a notification invokes every
//! registered callback with no payload. Receivers re-read the controller to
//! find out what changed.

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

/// A registered change callback.
pub type Callback = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    callbacks: BTreeMap<u64, Callback>,
}

/// Fire-and-forget notification channel identified by a signal name.
pub struct Dispatcher {
    signal: String,
    listeners: Arc<RwLock<Listeners>>,
}

impl Dispatcher {
    /// Create a dispatcher for the given signal name.
    pub fn new(signal: impl Into<String>) -> Self {
        Self {
            signal: signal.into(),
            listeners: Arc::new(RwLock::new(Listeners::default())),
        }
    }

    /// The signal name this dispatcher delivers.
    pub fn signal(&self) -> &str {
        &self.signal
    }

    /// Register a callback.
    ///
    /// The callback stays registered until the returned handle is used to
    /// unsubscribe.
    pub fn connect<F>(&self, callback: F) -> Unsubscribe
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut listeners = self.listeners.write();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.callbacks.insert(id, Arc::new(callback));

        Unsubscribe {
            listeners: Arc::downgrade(&self.listeners),
            id,
        }
    }

    /// Invoke every registered callback.
    ///
    /// Callbacks run outside the listener lock, so they may connect or
    /// unsubscribe. Returns the number of callbacks invoked.
    pub fn send(&self) -> usize {
        let callbacks: Vec<Callback> = self.listeners.read().callbacks.values().cloned().collect();
        for callback in &callbacks {
            callback();
        }
        callbacks.len()
    }

    /// Number of registered callbacks.
    pub fn listener_count(&self) -> usize {
        self.listeners.read().callbacks.len()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("signal", &self.signal)
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Handle that removes one callback from its dispatcher.
///
/// Unsubscribing more than once, or after the dispatcher is gone, is a no-op.
#[derive(Debug)]
pub struct Unsubscribe {
    listeners: Weak<RwLock<Listeners>>,
    id: u64,
}

impl Unsubscribe {
    /// Remove the callback. Returns `true` if it was still registered.
    pub fn unsubscribe(&self) -> bool {
        match self.listeners.upgrade() {
            Some(listeners) => listeners.write().callbacks.remove(&self.id).is_some(),
            None => false,
        }
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let handle = count.clone();
        (count, move || {
            handle.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_send_reaches_all_listeners() {
        let dispatcher = Dispatcher::new("xmrig-update-rig1-summary");
        let (a, callback_a) = counter();
        let (b, callback_b) = counter();
        let _ua = dispatcher.connect(callback_a);
        let _ub = dispatcher.connect(callback_b);

        assert_eq!(dispatcher.send(), 2);
        assert_eq!(a.load(Ordering::SeqCst), 1);
        assert_eq!(b.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let dispatcher = Dispatcher::new("signal");
        let (count, callback) = counter();
        let handle = dispatcher.connect(callback);

        assert!(handle.unsubscribe());
        assert!(!handle.unsubscribe());

        assert_eq!(dispatcher.send(), 0);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unsubscribe_after_dispatcher_dropped() {
        let dispatcher = Dispatcher::new("signal");
        let handle = dispatcher.connect(|| {});
        drop(dispatcher);

        assert!(!handle.unsubscribe());
    }

    #[test]
    fn callback_can_unsubscribe_during_send() {
        let dispatcher = Arc::new(Dispatcher::new("signal"));
        let slot: Arc<parking_lot::Mutex<Option<Unsubscribe>>> = Arc::default();

        let inner = slot.clone();
        let handle = dispatcher.connect(move || {
            if let Some(handle) = inner.lock().take() {
                handle.unsubscribe();
            }
        });
        *slot.lock() = Some(handle);

        assert_eq!(dispatcher.send(), 1);
        assert_eq!(dispatcher.listener_count(), 0);
    }
}
