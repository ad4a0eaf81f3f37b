//! Network status snapshot and derived state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

/// Measured connection quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    Slow,
    Fast,
    #[default]
    Unknown,
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Slow => "slow",
            Self::Fast => "fast",
            Self::Unknown => "unknown",
        })
    }
}

/// Combined reachability and quality, as observers see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    OnlineFast,
    OnlineSlow,
    OnlineUnknown,
    Offline,
}

/// Current view of the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkStatus {
    pub is_online: bool,
    pub connection_type: ConnectionType,
    /// Last time the monitor saw the link come (or start) up
    pub last_online: Option<SystemTime>,
    pub retry_count: u32,
}

impl NetworkStatus {
    /// Initial status from the platform's reachability indicator.
    pub fn initial(is_online: bool) -> Self {
        Self {
            is_online,
            connection_type: ConnectionType::Unknown,
            last_online: is_online.then(SystemTime::now),
            retry_count: 0,
        }
    }

    pub fn state(&self) -> LinkState {
        match (self.is_online, self.connection_type) {
            (false, _) => LinkState::Offline,
            (true, ConnectionType::Fast) => LinkState::OnlineFast,
            (true, ConnectionType::Slow) => LinkState::OnlineSlow,
            (true, ConnectionType::Unknown) => LinkState::OnlineUnknown,
        }
    }

    pub fn is_slow(&self) -> bool {
        self.connection_type == ConnectionType::Slow
    }

    /// Presentation layers should tone down motion when this holds.
    pub fn should_reduce_animations(&self) -> bool {
        !self.is_online || self.is_slow()
    }
}

impl fmt::Display for NetworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_online {
            write!(f, "online ({})", self.connection_type)?;
        } else {
            f.write_str("offline")?;
        }
        if self.retry_count > 0 {
            write!(f, ", {} retries", self.retry_count)?;
        }
        Ok(())
    }
}
