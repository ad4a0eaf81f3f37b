//! `[serve]` section configuration.
//!
//! Contains preview server settings.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! dir = "dist"                     # Built site, relative to the config file
//! interface = "0.0.0.0"            # Network interface (0.0.0.0 = LAN accessible)
//! port = 8000                      # HTTP port number
//! asset_prefix = "assets"          # Missing files under this segment are 404s
//! index = "index.html"             # Document served for SPA routes
//! build_command = "npm run build"  # Suggested when the build output is missing
//! open_browser = true              # Try to open the site after startup
//! workers = 4                      # Request handler threads
//! ```

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default port when neither the config nor the command line sets one.
pub const DEFAULT_PORT: u16 = 8000;

/// Preview server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Directory with the built site.
    pub dir: PathBuf,

    /// Network interface to bind.
    /// - `0.0.0.0` (default): all interfaces (LAN accessible)
    /// - `127.0.0.1`: localhost only
    pub interface: IpAddr,

    /// HTTP port number.
    pub port: u16,

    /// First path segment that marks a request as a static asset.
    pub asset_prefix: String,

    /// Root document for directories and SPA routes.
    pub index: String,

    /// Command that produces `dir`, quoted in startup errors.
    pub build_command: String,

    /// Open the site in a browser once the server is listening.
    pub open_browser: bool,

    /// Number of request handler threads.
    pub workers: usize,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("dist"),
            interface: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            asset_prefix: "assets".to_string(),
            index: "index.html".to_string(),
            build_command: "npm run build".to_string(),
            open_browser: true,
            workers: 4,
        }
    }
}

impl ServeConfig {
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.index.is_empty() || self.index.contains('/') {
            return Err(format!(
                "serve.index must be a plain file name, got `{}`",
                self.index
            ));
        }
        if self.workers == 0 {
            return Err("serve.workers must be at least 1".into());
        }
        Ok(())
    }
}
