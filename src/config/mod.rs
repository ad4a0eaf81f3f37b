//! Configuration management for `cucina.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── network    # [network]
//! │   └── serve      # [serve]
//! ├── error          # ConfigError
//! └── mod.rs         # AppConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section     | Purpose                                            |
//! |-------------|----------------------------------------------------|
//! | `[serve]`   | Preview server (dir, port, interface, routing)     |
//! | `[network]` | Network monitor probes, intervals and timeouts     |
//!
//! The config file is optional: without it every section uses its defaults
//! and paths are resolved against the current directory.

mod error;
pub mod section;

pub use error::ConfigError;
pub use section::{DEFAULT_PORT, NetworkConfig, ServeConfig};

use crate::{
    cli::{Cli, Commands},
    debug, log,
};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing cucina.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Directory relative paths are resolved against (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Preview server settings
    #[serde(default)]
    pub serve: ServeConfig,

    /// Network monitor settings
    #[serde(default)]
    pub network: NetworkConfig,
}

impl AppConfig {
    /// Load configuration from CLI arguments.
    ///
    /// The project root is the config file's parent directory, or the current
    /// directory when no config file exists.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_path = std::path::absolute(&cli.config)
            .map_err(|err| ConfigError::Io(cli.config.clone(), err))?;
        let exists = config_path.is_file();

        let mut config = if exists {
            Self::from_path(&config_path)?
        } else {
            debug!("config"; "{} not found, using defaults", cli.config.display());
            Self::default()
        };

        config.root = match config_path.parent() {
            Some(parent) if exists => parent.to_path_buf(),
            _ => std::env::current_dir().map_err(|err| ConfigError::Io(PathBuf::from("."), err))?,
        };
        config.config_path = config_path;
        config.serve.dir = config.root.join(&config.serve.dir);

        config.apply_cli(cli)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::from)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "ignoring unknown fields in {}: {}", display_path, fields.join(", "));
    }

    /// Apply command-line overrides on top of file values.
    fn apply_cli(&mut self, cli: &Cli) -> Result<()> {
        match &cli.command {
            Commands::Serve {
                port,
                dir,
                interface,
                no_open,
                ..
            } => {
                if let Some(raw) = port {
                    match parse_port(raw) {
                        Some(port) => self.serve.port = port,
                        None => {
                            log!("warning"; "invalid port number: {}", raw);
                            log!("warning"; "using default port: {}", self.serve.port);
                        }
                    }
                }
                if let Some(dir) = dir {
                    self.serve.dir =
                        std::path::absolute(dir).map_err(|err| ConfigError::Io(dir.clone(), err))?;
                }
                if let Some(interface) = interface {
                    self.serve.interface = *interface;
                }
                if *no_open {
                    self.serve.open_browser = false;
                }
            }
            Commands::Net { .. } => {}
        }
        Ok(())
    }

    /// Validate all sections, reporting the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.serve.validate().map_err(ConfigError::Validation)?;
        self.network.validate().map_err(ConfigError::Validation)?;
        Ok(())
    }
}

/// Parse a port argument; anything that is not a valid `u16` is rejected.
pub fn parse_port(raw: &str) -> Option<u16> {
    raw.trim().parse().ok()
}

#[cfg(test)]
pub fn test_parse_config(extra: &str) -> AppConfig {
    let (parsed, ignored) = AppConfig::parse_with_ignored(extra).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_from_str_invalid_toml() {
        assert!(AppConfig::from_str("[serve\nport = 1").is_err());
        assert!(AppConfig::from_str("[serve]\nport = \"eighty\"").is_err());
    }

    #[test]
    fn test_unknown_fields_are_collected() {
        let (_, ignored) =
            AppConfig::parse_with_ignored("[serve]\nport = 9000\nhotreload = true").unwrap();
        assert_eq!(ignored, vec!["serve.hotreload".to_string()]);
    }

    #[test]
    fn test_parse_port() {
        assert_eq!(parse_port("8080"), Some(8080));
        assert_eq!(parse_port(" 3000 "), Some(3000));
        assert_eq!(parse_port("abc"), None);
        assert_eq!(parse_port("70000"), None);
        assert_eq!(parse_port("-1"), None);
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("cucina.toml");
        let cli = Cli::parse_from(["cucina", "-C", missing.to_str().unwrap(), "net"]);

        let config = AppConfig::load(&cli).unwrap();
        assert_eq!(config.serve.port, DEFAULT_PORT);
        assert!(config.serve.dir.is_absolute());
        assert!(config.serve.dir.ends_with("dist"));
    }

    #[test]
    fn test_load_resolves_dir_against_config_parent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cucina.toml");
        fs::write(&path, "[serve]\ndir = \"public\"\nport = 9100").unwrap();
        let cli = Cli::parse_from(["cucina", "-C", path.to_str().unwrap(), "serve"]);

        let config = AppConfig::load(&cli).unwrap();
        assert_eq!(config.serve.port, 9100);
        assert_eq!(config.serve.dir, dir.path().join("public"));
        assert_eq!(config.root, dir.path());
    }

    #[test]
    fn test_cli_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cucina.toml");
        fs::write(&path, "[serve]\nport = 9100\nopen_browser = true").unwrap();
        let cli = Cli::parse_from([
            "cucina",
            "-C",
            path.to_str().unwrap(),
            "serve",
            "9200",
            "--no-open",
            "-i",
            "127.0.0.1",
        ]);

        let config = AppConfig::load(&cli).unwrap();
        assert_eq!(config.serve.port, 9200);
        assert!(!config.serve.open_browser);
        assert!(config.serve.interface.is_loopback());
    }

    #[test]
    fn test_invalid_port_keeps_configured_port() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cucina.toml");
        let cli = Cli::parse_from(["cucina", "-C", path.to_str().unwrap(), "serve", "http"]);

        let config = AppConfig::load(&cli).unwrap();
        assert_eq!(config.serve.port, DEFAULT_PORT);
    }

    #[test]
    fn test_load_rejects_invalid_section() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cucina.toml");
        fs::write(&path, "[network]\nprobe_urls = []").unwrap();
        let cli = Cli::parse_from(["cucina", "-C", path.to_str().unwrap(), "net"]);

        let err = AppConfig::load(&cli).unwrap_err();
        assert!(err.to_string().contains("probe_urls"));
    }
}
