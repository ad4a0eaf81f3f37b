//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Cucina preview server and network diagnostics
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: cucina.toml, optional)
    #[arg(short = 'C', long, global = true, default_value = "cucina.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve the built site with SPA routing
    #[command(visible_alias = "s")]
    Serve {
        /// Port number to listen on (non-numeric values fall back to the default)
        port: Option<String>,

        /// Directory containing the built site (default: dist)
        #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
        dir: Option<PathBuf>,

        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Do not try to open a browser after startup
        #[arg(long)]
        no_open: bool,

        /// Enable verbose output for debugging
        #[arg(short = 'V', long)]
        verbose: bool,
    },

    /// Check network reachability and connection quality
    #[command(visible_alias = "n")]
    Net {
        /// Keep running and report every status change until Ctrl+C
        #[arg(short, long)]
        watch: bool,

        /// Retries for the connectivity test before giving up
        #[arg(short, long, default_value_t = 2)]
        retries: u32,

        /// Enable verbose output for debugging
        #[arg(short = 'V', long)]
        verbose: bool,
    },
}

impl Cli {
    pub const fn is_serve(&self) -> bool {
        matches!(self.command, Commands::Serve { .. })
    }

    pub const fn verbose(&self) -> bool {
        match self.command {
            Commands::Serve { verbose, .. } | Commands::Net { verbose, .. } => verbose,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_positional_port() {
        let cli = Cli::parse_from(["cucina", "serve", "3000"]);
        assert!(cli.is_serve());
        match cli.command {
            Commands::Serve { port, no_open, .. } => {
                assert_eq!(port.as_deref(), Some("3000"));
                assert!(!no_open);
            }
            Commands::Net { .. } => panic!("expected serve"),
        }
    }

    #[test]
    fn test_serve_accepts_non_numeric_port() {
        // Validation happens later so a bad value only warns
        let cli = Cli::parse_from(["cucina", "s", "abc", "--no-open"]);
        match cli.command {
            Commands::Serve { port, no_open, .. } => {
                assert_eq!(port.as_deref(), Some("abc"));
                assert!(no_open);
            }
            Commands::Net { .. } => panic!("expected serve"),
        }
    }

    #[test]
    fn test_net_defaults() {
        let cli = Cli::parse_from(["cucina", "net", "-V"]);
        assert!(!cli.is_serve());
        assert!(cli.verbose());
        assert_eq!(cli.config, PathBuf::from("cucina.toml"));
        match cli.command {
            Commands::Net { watch, retries, .. } => {
                assert!(!watch);
                assert_eq!(retries, 2);
            }
            Commands::Serve { .. } => panic!("expected net"),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::parse_from(["cucina", "serve", "-C", "site/preview.toml"]);
        assert_eq!(cli.config, PathBuf::from("site/preview.toml"));
    }
}
