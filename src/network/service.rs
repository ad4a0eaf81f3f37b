//! Backend service calls: network-error classification and fallback.

use super::{NetworkMonitor, RetryError, RetryPolicy};
use crate::log;
use std::{fmt, io};

/// Service error codes that mean "the network got in the way".
const NETWORK_CODES: &[&str] = &["unavailable", "deadline-exceeded", "cancelled", "unknown"];

/// Message fragments that mean the same.
const NETWORK_WORDS: &[&str] = &["network", "offline", "timeout"];

/// An error that may carry a service status code.
pub trait ServiceError: fmt::Display {
    fn code(&self) -> Option<&str> {
        None
    }
}

impl ServiceError for &str {}
impl ServiceError for String {}

impl ServiceError for io::Error {
    fn code(&self) -> Option<&str> {
        io_code(self.kind())
    }
}

impl ServiceError for reqwest::Error {
    fn code(&self) -> Option<&str> {
        if self.is_timeout() {
            Some("deadline-exceeded")
        } else if self.is_connect() {
            Some("unavailable")
        } else {
            None
        }
    }
}

impl ServiceError for anyhow::Error {
    fn code(&self) -> Option<&str> {
        self.chain().find_map(|cause| {
            if let Some(e) = cause.downcast_ref::<reqwest::Error>() {
                e.code()
            } else if let Some(e) = cause.downcast_ref::<io::Error>() {
                e.code()
            } else {
                None
            }
        })
    }
}

fn io_code(kind: io::ErrorKind) -> Option<&'static str> {
    use io::ErrorKind::*;
    match kind {
        TimedOut => Some("deadline-exceeded"),
        ConnectionRefused | ConnectionReset | ConnectionAborted | NotConnected
        | AddrNotAvailable | NetworkUnreachable | HostUnreachable | NetworkDown => {
            Some("unavailable")
        }
        Interrupted => Some("cancelled"),
        _ => None,
    }
}

/// Whether a failure looks network-related, by code or by message.
pub fn is_network_error(code: Option<&str>, message: &str) -> bool {
    if code.is_some_and(|code| NETWORK_CODES.contains(&code)) {
        return true;
    }
    let message = message.to_lowercase();
    NETWORK_WORDS.iter().any(|word| message.contains(word))
}

impl<E: ServiceError> RetryError<E> {
    /// Classify the whole failure: the last cause's code, then the message.
    pub fn is_network_error(&self) -> bool {
        let code = self.last.operation().and_then(|e| e.code());
        is_network_error(code, &self.to_string())
    }
}

impl NetworkMonitor {
    /// Retry a service call with [`RetryPolicy::SERVICE`]; on a network
    /// failure, answer from `fallback` instead.
    pub fn with_service_fallback<T, E, F, G>(
        &self,
        op: F,
        fallback: Option<G>,
    ) -> Result<T, RetryError<E>>
    where
        E: ServiceError,
        F: FnMut() -> Result<T, E>,
        G: FnOnce() -> T,
    {
        self.with_service_fallback_policy(RetryPolicy::SERVICE, op, fallback)
    }

    pub(crate) fn with_service_fallback_policy<T, E, F, G>(
        &self,
        policy: RetryPolicy,
        op: F,
        fallback: Option<G>,
    ) -> Result<T, RetryError<E>>
    where
        E: ServiceError,
        F: FnMut() -> Result<T, E>,
        G: FnOnce() -> T,
    {
        match self.with_network_retry(policy, op) {
            Ok(value) => Ok(value),
            Err(e) => match fallback {
                Some(fallback) if e.is_network_error() => {
                    log!("net"; "using fallback due to network error: {}", e);
                    Ok(fallback())
                }
                _ => Err(e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkConfig;
    use crate::network::{ManualSignal, ProbeError, ProbeResponse, ProbeTransport};
    use std::sync::Arc;
    use std::time::Duration;

    struct Unreachable;

    impl ProbeTransport for Unreachable {
        fn head(&self, url: &str, _timeout: Duration) -> Result<ProbeResponse, ProbeError> {
            Err(ProbeError::Failed {
                url: url.to_string(),
                reason: "unreachable".into(),
            })
        }
    }

    /// Error with an explicit service code.
    #[derive(Debug)]
    struct Coded(&'static str);

    impl fmt::Display for Coded {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "request rejected ({})", self.0)
        }
    }

    impl ServiceError for Coded {
        fn code(&self) -> Option<&str> {
            Some(self.0)
        }
    }

    const FAST: RetryPolicy = RetryPolicy::new(1, Duration::from_millis(1));

    fn monitor(online: bool) -> NetworkMonitor {
        let config = NetworkConfig {
            offline_wait_ms: 10,
            ..NetworkConfig::default()
        };
        NetworkMonitor::new(config, Arc::new(ManualSignal::new(online)), Arc::new(Unreachable))
    }

    #[test]
    fn test_is_network_error() {
        for code in ["unavailable", "deadline-exceeded", "cancelled", "unknown"] {
            assert!(is_network_error(Some(code), "whatever"));
        }
        assert!(!is_network_error(Some("permission-denied"), "denied"));

        assert!(is_network_error(None, "Network request failed"));
        assert!(is_network_error(None, "client is offline"));
        assert!(is_network_error(None, "deadline: TIMEOUT"));
        assert!(!is_network_error(None, "document not found"));
    }

    #[test]
    fn test_io_error_codes() {
        let refused = io::Error::from(io::ErrorKind::ConnectionRefused);
        assert_eq!(refused.code(), Some("unavailable"));
        let timed_out = io::Error::from(io::ErrorKind::TimedOut);
        assert_eq!(timed_out.code(), Some("deadline-exceeded"));
        let other = io::Error::from(io::ErrorKind::PermissionDenied);
        assert_eq!(other.code(), None);

        let wrapped = anyhow::Error::new(refused).context("loading menu");
        assert_eq!(ServiceError::code(&wrapped), Some("unavailable"));
    }

    #[test]
    fn test_fallback_on_network_error() {
        let monitor = monitor(true);
        let value = monitor
            .with_service_fallback_policy(FAST, || Err(Coded("unavailable")), Some(|| "cached"))
            .unwrap();
        assert_eq!(value, "cached");
    }

    #[test]
    fn test_fallback_when_offline() {
        // "network connection timeout" classifies as a network error
        let monitor = monitor(false);
        let value = monitor
            .with_service_fallback_policy(FAST, || Ok::<_, &str>(1), Some(|| 0))
            .unwrap();
        assert_eq!(value, 0);
    }

    #[test]
    fn test_non_network_error_propagates() {
        let monitor = monitor(true);
        let err = monitor
            .with_service_fallback_policy(FAST, || Err::<u8, _>(Coded("permission-denied")), Some(|| 0))
            .unwrap_err();
        assert!(!err.is_network_error());
        assert_eq!(err.attempts, 2);
    }

    #[test]
    fn test_network_error_without_fallback_propagates() {
        let monitor = monitor(true);
        let err = monitor
            .with_service_fallback_policy(FAST, || Err::<u8, _>("network unreachable"), None::<fn() -> u8>)
            .unwrap_err();
        assert!(err.is_network_error());
    }

    #[test]
    fn test_success_skips_fallback() {
        let monitor = monitor(true);
        let value = monitor
            .with_service_fallback_policy(FAST, || Ok::<_, &str>(7), Some(|| -> i32 { unreachable!() }))
            .unwrap();
        assert_eq!(value, 7);
    }
}
