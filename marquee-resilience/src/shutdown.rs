//! Graceful shutdown coordination
//!
//! A shutdown request never cancels work in progress. Long-running loops hold
//! a [`ShutdownListener`], race it against their idle wait, and check it
//! between units of work.

use log::{info, warn};
use std::sync::Arc;
use tokio::sync::watch;

/// Shutdown coordinator shared between the signal handler and the workers
pub struct ShutdownCoordinator {
    sender: watch::Sender<bool>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self { sender }
    }

    /// Subscribe to the shutdown request
    ///
    /// Listeners created after the request still observe it.
    pub fn subscribe(&self) -> ShutdownListener {
        ShutdownListener {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn is_shutting_down(&self) -> bool {
        *self.sender.borrow()
    }

    /// Request shutdown
    pub fn shutdown(&self) -> Result<(), ShutdownError> {
        let changed = self.sender.send_if_modified(|requested| {
            if *requested {
                false
            } else {
                *requested = true;
                true
            }
        });

        if !changed {
            return Err(ShutdownError::AlreadyShuttingDown);
        }

        info!("Shutdown requested; finishing in-flight work");
        Ok(())
    }

    /// Request shutdown when the process receives Ctrl-C (SIGINT)
    pub fn shutdown_on_ctrl_c(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let coordinator = Arc::clone(self);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received interrupt signal");
                    if coordinator.shutdown().is_err() {
                        warn!("Shutdown already in progress");
                    }
                }
                Err(e) => warn!("Failed to listen for interrupt signal: {}", e),
            }
        })
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving half of a [`ShutdownCoordinator`]
#[derive(Clone)]
pub struct ShutdownListener {
    receiver: watch::Receiver<bool>,
}

impl ShutdownListener {
    pub fn is_triggered(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolve once shutdown has been requested
    ///
    /// Also resolves if the coordinator is dropped, since nothing can
    /// request shutdown any more and waiting would hang forever.
    pub async fn wait(&mut self) {
        if self.receiver.wait_for(|requested| *requested).await.is_err() {
            warn!("Shutdown coordinator dropped; treating as shutdown");
        }
    }
}

/// Shutdown error types
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ShutdownError {
    /// Shutdown already in progress
    #[error("Shutdown already in progress")]
    AlreadyShuttingDown,
}
