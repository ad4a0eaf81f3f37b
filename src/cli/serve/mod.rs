//! Preview server for the built site with SPA routing.

mod error;
mod lifecycle;
mod path;
mod response;

pub use error::ServeError;
pub use path::{SiteRoot, Target};

use crate::{config::AppConfig, config::ServeConfig, debug, log};
use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tiny_http::{Request, Server};

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
    addr: SocketAddr,
    site: Arc<SiteRoot>,
    workers: usize,
}

/// Check the site directory and bind the HTTP server without starting the
/// request loop.
pub fn bind_server(config: &ServeConfig) -> Result<BoundServer, ServeError> {
    let site = SiteRoot::open(config)?;
    let (server, addr) = lifecycle::bind(SocketAddr::new(config.interface, config.port))?;

    Ok(BoundServer {
        server: Arc::new(server),
        addr,
        site: Arc::new(site),
        workers: config.workers,
    })
}

impl BoundServer {
    /// Get the bound address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Start the request loop (blocking until the server is unblocked).
    pub fn run(self) -> Result<(), ServeError> {
        run_request_loop(&self.server, &self.site, self.workers)
    }
}

/// Run the `serve` command.
///
/// Startup failures are reported with a hint and exit the process with
/// status 1; a graceful shutdown returns normally.
pub fn serve(config: &AppConfig) -> Result<()> {
    let serve = &config.serve;

    let bound = match bind_server(serve) {
        Ok(bound) => bound,
        Err(e) => exit_with(&e, serve),
    };

    lifecycle::register_server_for_shutdown(Arc::clone(&bound.server));
    lifecycle::print_banner(bound.site.path(), serve, bound.addr);
    if serve.open_browser {
        lifecycle::open_browser(serve, bound.addr);
    }

    if let Err(e) = bound.run() {
        exit_with(&e, serve);
    }
    Ok(())
}

fn exit_with(error: &ServeError, config: &ServeConfig) -> ! {
    log!("error"; "{}", error);
    if let Some(hint) = error.hint(config) {
        log!("error"; "{}", hint);
    }
    std::process::exit(1);
}

fn run_request_loop(server: &Server, site: &Arc<SiteRoot>, workers: usize) -> Result<(), ServeError> {
    // Reads are blocking, so spread them over a small pool
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| ServeError::Workers(e.to_string()))?;

    for request in server.incoming_requests() {
        let site = Arc::clone(site);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &site) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(request: Request, site: &SiteRoot) -> Result<()> {
    let target = site.resolve(request.url());
    let reply = response::reply_for(&target);
    debug!("serve"; "{} {} -> {}", request.method(), request.url(), reply.status);
    response::send(request, reply)
}
