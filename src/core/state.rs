//! Process-wide shutdown state.
//!
//! The Ctrl+C / SIGTERM handler is installed once in `main`. Long-running
//! commands register what needs waking:
//! - the preview server (its accept loop is unblocked)
//! - a shutdown channel (for watch loops sleeping on it)

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use crossbeam::channel::Sender;
use tiny_http::Server;

/// Shutdown has been requested (Ctrl+C or SIGTERM received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// HTTP server reference for graceful shutdown
static SERVER: OnceLock<Arc<Server>> = OnceLock::new();

/// Shutdown signal sender for blocking watch loops
static SHUTDOWN_TX: OnceLock<Sender<()>> = OnceLock::new();

/// Setup the global signal handler. Call once at program start
///
/// The handler behavior depends on what has been registered:
/// - Nothing registered: exit immediately, there is nothing to drain
/// - Server and/or channel registered: graceful shutdown
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);

        let mut graceful = false;
        if let Some(tx) = SHUTDOWN_TX.get() {
            wake(tx);
            graceful = true;
        }
        if let Some(server) = SERVER.get() {
            crate::log!("serve"; "server stopped");
            server.unblock();
            graceful = true;
        }
        if !graceful {
            std::process::exit(0);
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Wake a watcher without blocking; one pending signal is enough, so a
/// repeated Ctrl+C is dropped while the first is still queued.
fn wake(tx: &Sender<()>) {
    let _ = tx.try_send(());
}

/// Register the HTTP server for graceful shutdown
///
/// Call this after binding the server, before entering the request loop
pub fn register_server(server: Arc<Server>) {
    let _ = SERVER.set(server);
}

/// Register a channel that receives `()` once shutdown is requested
pub fn register_shutdown_channel(tx: Sender<()>) {
    let _ = SHUTDOWN_TX.set(tx);
}

/// Check if shutdown has been requested
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}
