//! Graceful shutdown handling
//!
//! Listens for SIGTERM and SIGINT and fans the notification out to the HTTP
//! server and to every in-flight request context derived from the signal.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::RequestContext;

/// Shutdown signal that can be cloned and shared across tasks
#[derive(Clone, Default)]
pub struct ShutdownSignal {
    token: CancellationToken,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if shutdown has been triggered
    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Trigger shutdown
    pub fn trigger(&self) {
        if !self.token.is_cancelled() {
            info!("Shutdown signal triggered");
            self.token.cancel();
        }
    }

    /// Wait for shutdown signal
    pub async fn wait(&self) {
        self.token.cancelled().await;
    }

    /// Request context cancelled when shutdown is triggered and expiring
    /// after `timeout`.
    pub fn request_context(&self, timeout: Duration) -> RequestContext {
        RequestContext::from_token(self.token.child_token()).child_with_timeout(timeout)
    }
}

/// Listen for shutdown signals (SIGTERM, SIGINT) and trigger the shutdown signal
pub async fn listen_for_shutdown_signals(shutdown: ShutdownSignal) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(term), Ok(int)) => (term, int),
                (Err(e), _) | (_, Err(e)) => {
                    error!("Failed to install signal handlers: {}", e);
                    return;
                }
            };

        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM signal"),
            _ = sigint.recv() => info!("Received SIGINT signal (Ctrl+C)"),
        }

        shutdown.trigger();
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            return;
        }
        info!("Received Ctrl+C signal");
        shutdown.trigger();
    }
}

/// Graceful shutdown coordinator
pub struct ShutdownCoordinator {
    signal: ShutdownSignal,
    /// Timeout for graceful shutdown (in seconds)
    timeout_secs: u64,
}

impl ShutdownCoordinator {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            signal: ShutdownSignal::new(),
            timeout_secs,
        }
    }

    /// Get the shutdown signal for sharing with components
    pub fn signal(&self) -> ShutdownSignal {
        self.signal.clone()
    }

    /// Start listening for shutdown signals in the background
    pub fn start_signal_listener(&self) {
        let signal = self.signal.clone();
        tokio::spawn(async move {
            listen_for_shutdown_signals(signal).await;
        });
    }

    /// Wait for the signal, then run `cleanup` bounded by the timeout.
    /// Returns false if the cleanup timed out.
    pub async fn shutdown_with_cleanup<F, Fut>(&self, cleanup: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ()>,
    {
        self.signal.wait().await;

        info!("Starting graceful shutdown (timeout: {}s)...", self.timeout_secs);

        match tokio::time::timeout(Duration::from_secs(self.timeout_secs), cleanup()).await {
            Ok(()) => {
                info!("Graceful shutdown completed");
                true
            }
            Err(_) => {
                warn!("Graceful shutdown timed out after {}s", self.timeout_secs);
                false
            }
        }
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new(30)
    }
}
