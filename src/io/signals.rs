//! Unix signal handling.
//!
//! SIGINT, SIGTERM and SIGHUP all request a graceful shutdown. Signals are
//! received on a dedicated thread with `signal-hook` and turned into a
//! [`Shutdown`] future that any number of tasks can await.

use anyhow::{Context, Result};
use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use std::thread;
use tokio::sync::watch;

/// Requests shutdown.
#[derive(Debug, Clone)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

impl ShutdownTrigger {
    pub fn trigger(&self) {
        let _ = self.tx.send(true);
    }
}

/// Resolves once shutdown has been requested.
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait for the trigger. Also returns if every trigger was dropped.
    pub async fn wait(mut self) {
        let _ = self.rx.wait_for(|requested| *requested).await;
    }
}

pub fn shutdown_channel() -> (ShutdownTrigger, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, Shutdown { rx })
}

/// Fire `trigger` on the first termination signal.
pub fn install_signal_handler(trigger: ShutdownTrigger) -> Result<()> {
    let mut signals =
        Signals::new([SIGINT, SIGTERM, SIGHUP]).context("failed to register signal handlers")?;

    thread::spawn(move || {
        for sig in signals.forever() {
            let name = match sig {
                SIGINT => "SIGINT",
                SIGTERM => "SIGTERM",
                SIGHUP => "SIGHUP",
                _ => continue,
            };
            log_pipe!();
            log_info!("Received {name}, shutting down");
            trigger.trigger();
            break;
        }
    });

    Ok(())
}
