//! Preview server startup errors.

use crate::config::ServeConfig;
use std::{io, net::SocketAddr, path::PathBuf};
use thiserror::Error;

/// Fatal conditions detected before the request loop starts.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("{} directory not found", .0.display())]
    MissingDir(PathBuf),

    #[error("{} directory is empty", .0.display())]
    EmptyDir(PathBuf),

    #[error("IO error when reading `{}`", .0.display())]
    Io(PathBuf, #[source] io::Error),

    #[error("port {0} is already in use")]
    PortInUse(u16),

    #[error("failed to bind {addr}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("failed to start HTTP server on {addr}: {reason}")]
    Server { addr: SocketAddr, reason: String },

    #[error("failed to start request workers: {0}")]
    Workers(String),
}

impl ServeError {
    /// Actionable follow-up for the operator, if there is one.
    pub fn hint(&self, config: &ServeConfig) -> Option<String> {
        match self {
            Self::MissingDir(_) | Self::EmptyDir(_) => Some(format!(
                "run `{}` first to create the production build",
                config.build_command
            )),
            Self::PortInUse(port) => Some(format!(
                "try a different port: cucina serve {}",
                port.saturating_add(1)
            )),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hints() {
        let config = ServeConfig::default();

        let hint = ServeError::MissingDir(PathBuf::from("dist"))
            .hint(&config)
            .unwrap();
        assert!(hint.contains("npm run build"));

        let hint = ServeError::PortInUse(8000).hint(&config).unwrap();
        assert!(hint.ends_with("cucina serve 8001"));

        assert!(ServeError::Workers("boom".into()).hint(&config).is_none());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ServeError::PortInUse(8000).to_string(),
            "port 8000 is already in use"
        );
        assert_eq!(
            ServeError::EmptyDir(PathBuf::from("dist")).to_string(),
            "dist directory is empty"
        );
    }
}
