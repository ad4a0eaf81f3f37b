//! Server lifecycle management.

use super::error::ServeError;
use crate::{config::ServeConfig, core, log, utils::net};
use std::{
    io::ErrorKind,
    net::{SocketAddr, TcpListener},
    sync::Arc,
};
use tiny_http::Server;

/// Bind to the configured interface and port.
///
/// A port conflict is reported rather than retried on another port, so the
/// printed URL always matches what the operator asked for.
pub fn bind(addr: SocketAddr) -> Result<(Server, SocketAddr), ServeError> {
    let listener = TcpListener::bind(addr).map_err(|source| match source.kind() {
        ErrorKind::AddrInUse => ServeError::PortInUse(addr.port()),
        _ => ServeError::Bind { addr, source },
    })?;
    let local = listener
        .local_addr()
        .map_err(|source| ServeError::Bind { addr, source })?;

    let server = Server::from_listener(listener, None).map_err(|e| ServeError::Server {
        addr: local,
        reason: e.to_string(),
    })?;
    Ok((server, local))
}

/// Register server for graceful shutdown.
///
/// When Ctrl+C or SIGTERM arrives, the global handler unblocks the accept loop.
pub fn register_server_for_shutdown(server: Arc<Server>) {
    core::register_server(server);
}

/// Print the startup banner.
pub fn print_banner(site_dir: &std::path::Path, config: &ServeConfig, addr: SocketAddr) {
    let local_url = format!("http://{}:{}", net::local_host(config.interface), addr.port());

    log!("serve"; "serving files from: {}", site_dir.display());
    log!("serve"; "local:   {}", local_url);
    if config.interface.is_unspecified() {
        log!("serve"; "network: http://{}:{}", net::lan_host(), addr.port());
    }
    log!("serve"; "SPA routing on, files sent with no-cache headers");
    log!("serve"; "press Ctrl+C to stop");
}

/// Try to open the site in the default browser. Failure is only reported.
pub fn open_browser(config: &ServeConfig, addr: SocketAddr) {
    let url = format!("http://{}:{}", net::local_host(config.interface), addr.port());
    match webbrowser::open(&url) {
        Ok(()) => log!("serve"; "opening {} in your browser", url),
        Err(e) => {
            log!("warning"; "could not open browser automatically: {}", e);
            log!("warning"; "please open {} manually", url);
        }
    }
}
