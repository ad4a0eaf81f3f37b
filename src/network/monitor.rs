//! Network status monitor.
//!
//! One `NetworkMonitor` is built at startup and handed to whoever needs it.
//! Clones share the same state.
//!
//! # Lifecycle
//!
//! ```ignore
//! let monitor = NetworkMonitor::spawn(config, Arc::new(RouteSignal), Arc::new(HttpProbe::new()?));
//! let sub = monitor.subscribe(|status| log!("net"; "{}", status));
//! // ...
//! sub.unsubscribe();
//! monitor.destroy();
//! ```
//!
//! `new` only reads the signal; `start` launches the background work:
//! - a periodic quality check (`quality_interval`)
//! - a signal watcher that turns signal edges into online/offline transitions
//! - a one-shot speed classification

use super::listeners::{Listener, Registry, Subscription, notify_all};
use super::{ConnectionType, ConnectivitySignal, NetworkStatus, ProbeTransport};
use crate::{config::NetworkConfig, debug, log};
use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use parking_lot::{Mutex, ReentrantMutex};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant, SystemTime},
};

struct Shared {
    config: NetworkConfig,
    signal: Arc<dyn ConnectivitySignal>,
    transport: Arc<dyn ProbeTransport>,
    status: Mutex<NetworkStatus>,
    listeners: Arc<Mutex<Registry>>,
    /// Held across a status change and its fan-out so listeners see changes
    /// in order. Reentrant: a listener may itself update the status.
    notify: ReentrantMutex<()>,
    /// Bumped by `destroy`; background results from an older epoch are dropped
    epoch: AtomicU64,
    cancelled: AtomicBool,
    /// Signal value seen by the last `poll_signal`
    last_signal: AtomicBool,
}

#[derive(Default)]
struct Workers {
    /// Dropping the sender wakes and stops every worker
    stop_tx: Option<Sender<()>>,
    handles: Vec<JoinHandle<()>>,
}

/// Shared view of network reachability and quality.
#[derive(Clone)]
pub struct NetworkMonitor {
    shared: Arc<Shared>,
    workers: Arc<Mutex<Workers>>,
}

impl NetworkMonitor {
    /// Build a monitor from the signal's current reading. No background work.
    pub fn new(
        config: NetworkConfig,
        signal: Arc<dyn ConnectivitySignal>,
        transport: Arc<dyn ProbeTransport>,
    ) -> Self {
        let online = signal.is_online();
        Self {
            shared: Arc::new(Shared {
                config,
                signal,
                transport,
                status: Mutex::new(NetworkStatus::initial(online)),
                listeners: Arc::new(Mutex::new(Registry::default())),
                notify: ReentrantMutex::new(()),
                epoch: AtomicU64::new(0),
                cancelled: AtomicBool::new(false),
                last_signal: AtomicBool::new(online),
            }),
            workers: Arc::new(Mutex::new(Workers::default())),
        }
    }

    /// `new` followed by `start`.
    pub fn spawn(
        config: NetworkConfig,
        signal: Arc<dyn ConnectivitySignal>,
        transport: Arc<dyn ProbeTransport>,
    ) -> Self {
        let monitor = Self::new(config, signal, transport);
        monitor.start();
        monitor
    }

    /// Launch the periodic check, the signal watcher and the initial speed
    /// probe. Calling it again while running does nothing.
    pub fn start(&self) {
        let mut workers = self.workers.lock();
        if workers.stop_tx.is_some() {
            return;
        }

        let (stop_tx, stop_rx) = channel::bounded::<()>(0);
        let config = &self.shared.config;

        let monitor = self.clone();
        workers.handles.push(every(
            config.quality_interval(),
            stop_rx.clone(),
            move || monitor.check_connection_quality(),
        ));

        let monitor = self.clone();
        workers.handles.push(every(
            config.signal_poll_interval(),
            stop_rx,
            move || monitor.poll_signal(),
        ));

        workers.stop_tx = Some(stop_tx);
        drop(workers);

        self.detect_in_background();
    }

    /// Stop background work and drop every listener.
    ///
    /// A speed probe still in flight is left to finish, but its result is
    /// discarded. The monitor stays usable for direct calls; `start` may be
    /// called again.
    pub fn destroy(&self) {
        let handles = {
            let mut workers = self.workers.lock();
            workers.stop_tx = None;
            std::mem::take(&mut workers.handles)
        };
        for handle in handles {
            let _ = handle.join();
        }

        let _pass = self.shared.notify.lock();
        self.shared.epoch.fetch_add(1, Ordering::SeqCst);
        self.shared.listeners.lock().clear();
    }

    /// Abandon pending connection waits and retries, now and from here on.
    pub fn cancel(&self) {
        self.shared.cancelled.store(true, Ordering::SeqCst);
    }

    /// Set by [`NetworkMonitor::cancel`] or a process shutdown request.
    pub fn is_cancelled(&self) -> bool {
        self.shared.cancelled.load(Ordering::SeqCst) || crate::core::is_shutdown()
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.shared.config
    }

    /// Snapshot of the current status.
    pub fn status(&self) -> NetworkStatus {
        self.shared.status.lock().clone()
    }

    pub fn is_slow_connection(&self) -> bool {
        self.shared.status.lock().is_slow()
    }

    pub fn should_reduce_animations(&self) -> bool {
        self.shared.status.lock().should_reduce_animations()
    }

    /// Whether the platform signal currently reports online.
    pub fn signal_online(&self) -> bool {
        self.shared.signal.is_online()
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    /// Register a listener and call it once with the current status.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&NetworkStatus) + Send + Sync + 'static,
    {
        self.subscribe_shared(Arc::new(listener))
    }

    /// Like `subscribe`, but registering the same `Arc` twice is a no-op.
    pub fn subscribe_shared(&self, listener: Listener) -> Subscription {
        let _pass = self.shared.notify.lock();
        let id = self.shared.listeners.lock().insert(Arc::clone(&listener));
        let subscription = Subscription::new(id, &self.shared.listeners);

        let status = self.status();
        notify_all(std::slice::from_ref(&listener), &status);
        subscription
    }

    /// Channel-based subscription for consumers that poll or block.
    pub fn watch(&self) -> StatusWatch {
        let (tx, rx) = channel::unbounded();
        let subscription = self.subscribe(move |status| {
            let _ = tx.send(status.clone());
        });
        StatusWatch { rx, subscription }
    }

    pub fn listener_count(&self) -> usize {
        self.shared.listeners.lock().len()
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Apply a change and notify listeners.
    ///
    /// Listeners run without the status lock, but one pass completes before
    /// the next change is applied.
    fn update_status(&self, change: impl FnOnce(&mut NetworkStatus)) {
        let _pass = self.shared.notify.lock();
        let snapshot = {
            let mut status = self.shared.status.lock();
            change(&mut status);
            status.clone()
        };
        let listeners = self.shared.listeners.lock().snapshot();
        notify_all(&listeners, &snapshot);
    }

    /// The platform reports the link is up.
    pub fn handle_online(&self) {
        log!("net"; "connection restored");
        self.update_status(|status| {
            status.is_online = true;
            status.last_online = Some(SystemTime::now());
            status.retry_count = 0;
        });
        self.detect_in_background();
    }

    /// The platform reports the link is down.
    pub fn handle_offline(&self) {
        log!("net"; "connection lost");
        self.update_status(|status| {
            status.is_online = false;
            status.connection_type = ConnectionType::Unknown;
        });
    }

    /// Turn a change of the platform signal into a transition.
    pub fn poll_signal(&self) {
        let online = self.shared.signal.is_online();
        let before = self.shared.last_signal.swap(online, Ordering::SeqCst);
        match (before, online) {
            (false, true) => self.handle_online(),
            (true, false) => self.handle_offline(),
            _ => {}
        }
    }

    pub fn increment_retry_count(&self) {
        self.update_status(|status| status.retry_count += 1);
    }

    pub fn reset_retry_count(&self) {
        self.update_status(|status| status.retry_count = 0);
    }

    // ========================================================================
    // Probes
    // ========================================================================

    /// Periodic check compensating for an unreliable platform signal.
    pub fn check_connection_quality(&self) {
        if !self.shared.signal.is_online() {
            return;
        }
        let Some(url) = self.shared.config.quality_url() else {
            return;
        };

        let result = self
            .shared
            .transport
            .head(url, self.shared.config.quality_timeout());
        let was_online = self.shared.status.lock().is_online;

        match result {
            Ok(_) if !was_online => self.handle_online(),
            Err(e) if was_online => {
                log!("net"; "connection quality check failed, might be offline ({})", e);
                self.handle_offline();
            }
            _ => {}
        }
    }

    /// Classify the connection by one round trip. Returns the recorded class,
    /// or `None` when skipped because the signal reports offline.
    pub fn detect_connection_speed(&self) -> Option<ConnectionType> {
        let connection_type = self.measure_connection_speed()?;
        self.update_status(|status| status.connection_type = connection_type);
        Some(connection_type)
    }

    fn measure_connection_speed(&self) -> Option<ConnectionType> {
        if !self.shared.signal.is_online() {
            return None;
        }
        let config = &self.shared.config;
        let url = config.speed_url()?;

        let connection_type = match self.shared.transport.head(url, config.speed_timeout()) {
            Ok(response) => {
                let class = if response.elapsed < config.fast_threshold() {
                    ConnectionType::Fast
                } else {
                    ConnectionType::Slow
                };
                debug!("net"; "connection speed {} ({}ms)", class, response.elapsed.as_millis());
                class
            }
            Err(e) => {
                log!("net"; "speed detection failed: {}", e);
                config.probe_failure_class
            }
        };
        Some(connection_type)
    }

    fn detect_in_background(&self) {
        let monitor = self.clone();
        let epoch = self.shared.epoch.load(Ordering::SeqCst);
        thread::spawn(move || {
            let Some(connection_type) = monitor.measure_connection_speed() else {
                return;
            };
            let _pass = monitor.shared.notify.lock();
            if monitor.shared.epoch.load(Ordering::SeqCst) != epoch {
                debug!("net"; "monitor destroyed, dropping speed result");
                return;
            }
            monitor.update_status(|status| status.connection_type = connection_type);
        });
    }

    /// Best-effort reachability check independent of the cached status.
    pub fn test_connectivity(&self) -> bool {
        if !self.shared.signal.is_online() {
            return false;
        }
        let timeout = self.shared.config.speed_timeout();
        self.shared.config.probe_urls.iter().any(|url| {
            match self.shared.transport.head(url, timeout) {
                Ok(response) => response.is_success(),
                Err(e) => {
                    debug!("net"; "{}", e);
                    false
                }
            }
        })
    }

    /// Block until the monitor reports online, or `max_wait` elapses.
    ///
    /// The signal is polled every `signal_poll_interval` while waiting, so
    /// this works without `start`. Returns early with `false` once cancelled.
    /// The temporary subscription is removed on every outcome.
    pub fn wait_for_connection(&self, max_wait: Duration) -> bool {
        if self.shared.status.lock().is_online {
            return true;
        }

        let (tx, rx) = channel::bounded::<()>(1);
        let subscription = self.subscribe(move |status| {
            if status.is_online {
                let _ = tx.try_send(());
            }
        });

        let deadline = Instant::now() + max_wait;
        let tick = self.shared.config.signal_poll_interval();
        let connected = loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() || self.is_cancelled() {
                break false;
            }
            match rx.recv_timeout(remaining.min(tick)) {
                Ok(()) => break true,
                Err(RecvTimeoutError::Timeout) => self.poll_signal(),
                Err(RecvTimeoutError::Disconnected) => break false,
            }
        };
        subscription.unsubscribe();
        connected
    }
}

/// Run `tick` every `interval` until the stop channel closes.
fn every(
    interval: Duration,
    stop_rx: Receiver<()>,
    tick: impl Fn() + Send + 'static,
) -> JoinHandle<()> {
    thread::spawn(move || {
        loop {
            match stop_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => tick(),
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}

/// Status updates delivered over a channel. Unsubscribes on drop.
pub struct StatusWatch {
    rx: Receiver<NetworkStatus>,
    subscription: Subscription,
}

impl StatusWatch {
    pub fn receiver(&self) -> &Receiver<NetworkStatus> {
        &self.rx
    }
}

impl Drop for StatusWatch {
    fn drop(&mut self) {
        self.subscription.unsubscribe();
    }
}
