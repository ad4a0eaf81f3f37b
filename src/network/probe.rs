//! Reachability probe transport.
//!
//! Probes are HEAD requests against well-known endpoints. They carry no
//! business data; only success and round-trip time matter.

use std::time::{Duration, Instant};
use thiserror::Error;

/// Probe failures. Expected and non-fatal; they only drive reclassification.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("probe to {url} timed out after {}ms", .timeout.as_millis())]
    Timeout { url: String, timeout: Duration },

    #[error("probe to {url} failed: {reason}")]
    Failed { url: String, reason: String },
}

/// Answer to a completed probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status: u16,
    pub elapsed: Duration,
}

impl ProbeResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues a single bounded probe.
///
/// Any HTTP answer counts as a completed probe; callers decide whether the
/// status code matters.
pub trait ProbeTransport: Send + Sync {
    fn head(&self, url: &str, timeout: Duration) -> Result<ProbeResponse, ProbeError>;
}

/// Probe transport backed by a blocking `reqwest` client.
pub struct HttpProbe {
    client: reqwest::blocking::Client,
}

impl HttpProbe {
    pub fn new() -> Result<Self, ProbeError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("cucina/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProbeError::Failed {
                url: String::new(),
                reason: e.to_string(),
            })?;
        Ok(Self { client })
    }

    /// Use a preconfigured client (custom proxy or TLS settings).
    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl ProbeTransport for HttpProbe {
    fn head(&self, url: &str, timeout: Duration) -> Result<ProbeResponse, ProbeError> {
        let start = Instant::now();
        let response = self
            .client
            .head(url)
            .header("Cache-Control", "no-cache")
            .timeout(timeout)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    ProbeError::Timeout {
                        url: url.to_string(),
                        timeout,
                    }
                } else {
                    ProbeError::Failed {
                        url: url.to_string(),
                        reason: e.to_string(),
                    }
                }
            })?;

        Ok(ProbeResponse {
            status: response.status().as_u16(),
            elapsed: start.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// One-shot HTTP responder on loopback.
    fn respond_once(status_line: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf);
            let reply = format!("{status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
            stream.write_all(reply.as_bytes()).unwrap();
        });
        format!("http://{addr}/")
    }

    fn direct_probe() -> HttpProbe {
        let client = reqwest::blocking::Client::builder()
            .no_proxy()
            .build()
            .unwrap();
        HttpProbe::with_client(client)
    }

    #[test]
    fn test_response_success_range() {
        let ok = ProbeResponse {
            status: 204,
            elapsed: Duration::ZERO,
        };
        assert!(ok.is_success());
        let not_found = ProbeResponse {
            status: 404,
            elapsed: Duration::ZERO,
        };
        assert!(!not_found.is_success());
    }

    #[test]
    fn test_http_probe_reports_status() {
        let url = respond_once("HTTP/1.1 404 Not Found");
        let probe = direct_probe();

        let response = probe.head(&url, Duration::from_secs(2)).unwrap();
        assert_eq!(response.status, 404);
        assert!(!response.is_success());
    }

    #[test]
    fn test_http_probe_connection_refused() {
        // Bind then drop to get a port nobody listens on
        let addr = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
        let probe = direct_probe();

        let err = probe
            .head(&format!("http://{addr}/"), Duration::from_secs(2))
            .unwrap_err();
        assert!(matches!(err, ProbeError::Failed { .. }));
    }
}
