//! `net` command: report reachability and connection quality.

use crate::{
    config::AppConfig,
    core::{is_shutdown, register_shutdown_channel},
    debug, log,
    logger::{StatusLine, clock},
    network::{HttpProbe, NetworkMonitor, NetworkStatus, RetryPolicy, RouteSignal},
};
use anyhow::{Context, Result, bail};
use crossbeam::channel::{self, Receiver, select};
use std::sync::Arc;

/// Run the `net` command.
pub fn run(config: &AppConfig, watch: bool, retries: u32) -> Result<()> {
    // Registered up front so Ctrl+C ends the retries and skips the watch
    let shutdown_rx = watch.then(|| {
        let (tx, rx) = channel::bounded(1);
        register_shutdown_channel(tx);
        rx
    });

    let probe = HttpProbe::new().context("failed to create HTTP client")?;
    let monitor = NetworkMonitor::new(config.network.clone(), Arc::new(RouteSignal), Arc::new(probe));

    if let Some(class) = monitor.detect_connection_speed() {
        debug!("net"; "classified as {}", class);
    }
    log!("net"; "status: {}", monitor.status());

    let policy = RetryPolicy::new(retries, RetryPolicy::default().retry_delay);
    let reachable = monitor.with_network_retry(policy, || {
        if monitor.test_connectivity() {
            Ok(())
        } else {
            Err("no probe endpoint reachable")
        }
    });

    match &reachable {
        Ok(()) => log!("net"; "connectivity ok"),
        Err(e) => log!("error"; "{}", e),
    }

    if let Some(shutdown_rx) = shutdown_rx {
        if !is_shutdown() {
            watch_until_shutdown(&monitor, &shutdown_rx);
        }
    } else if let Err(e) = reachable {
        bail!("network check failed after {} attempts", e.attempts);
    }
    Ok(())
}

/// Print every status change until Ctrl+C.
fn watch_until_shutdown(monitor: &NetworkMonitor, shutdown_rx: &Receiver<()>) {
    monitor.start();
    let watch = monitor.watch();
    let mut line = StatusLine::new();
    log!("net"; "watching for changes, press Ctrl+C to stop");

    loop {
        select! {
            recv(watch.receiver()) -> status => match status {
                Ok(status) => report(&mut line, &status),
                Err(_) => break,
            },
            recv(shutdown_rx) -> _ => break,
        }
    }

    drop(watch);
    monitor.destroy();
}

fn report(line: &mut StatusLine, status: &NetworkStatus) {
    if status.is_online && !status.should_reduce_animations() {
        line.success(&status.to_string());
    } else if status.is_online {
        line.warning(&status.to_string());
    } else {
        let detail = status
            .last_online
            .map(|t| format!("last online {}", clock(t)))
            .unwrap_or_default();
        line.error(&status.to_string(), &detail);
    }
}
