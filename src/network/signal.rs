//! Platform connectivity indicators.
//!
//! A signal answers "does the platform think we are online right now". It is
//! cheap and may be wrong; the monitor's probes correct it.

use std::sync::atomic::{AtomicBool, Ordering};

/// Instantaneous online/offline indicator.
pub trait ConnectivitySignal: Send + Sync {
    fn is_online(&self) -> bool;
}

/// Online when the OS has a route to the public internet.
#[derive(Debug, Default, Clone, Copy)]
pub struct RouteSignal;

impl ConnectivitySignal for RouteSignal {
    fn is_online(&self) -> bool {
        crate::utils::net::outbound_ipv4().is_some()
    }
}

/// Signal driven by hand, for embedding hosts that get their own
/// online/offline events, and for tests.
#[derive(Debug)]
pub struct ManualSignal {
    online: AtomicBool,
}

impl ManualSignal {
    pub const fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

impl ConnectivitySignal for ManualSignal {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}
