//! Configuration section definitions.

mod network;
mod serve;

pub use network::NetworkConfig;
pub use serve::{DEFAULT_PORT, ServeConfig};
