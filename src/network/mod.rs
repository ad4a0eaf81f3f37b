//! Network status monitoring.
//!
//! - [`NetworkMonitor`]: tracks reachability and quality, notifies listeners
//! - [`ConnectivitySignal`]: the platform's cheap online/offline indicator
//! - [`ProbeTransport`]: bounded round-trip probes that correct the signal
//! - retry and service-fallback wrappers built on the monitor

mod listeners;
mod monitor;
mod probe;
mod retry;
mod service;
mod signal;
mod status;

pub use listeners::{Listener, Subscription, SubscriptionId};
pub use monitor::{NetworkMonitor, StatusWatch};
pub use probe::{HttpProbe, ProbeError, ProbeResponse, ProbeTransport};
pub use retry::{AttemptError, RetryError, RetryPolicy};
pub use service::{ServiceError, is_network_error};
pub use signal::{ConnectivitySignal, ManualSignal, RouteSignal};
pub use status::{ConnectionType, LinkState, NetworkStatus};
