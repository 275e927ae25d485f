// Signal handling module
//
// Supported signals:
// - SIGTERM: Graceful shutdown
// - SIGINT:  Graceful shutdown (Ctrl+C)

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use crate::logger;

/// Signal handler state
pub struct SignalHandler {
    /// Shutdown signal (SIGTERM, SIGINT)
    pub shutdown: Arc<Notify>,
    /// Whether shutdown has been requested
    pub shutdown_requested: Arc<AtomicBool>,
}

impl SignalHandler {
    pub fn new() -> Self {
        Self {
            shutdown: Arc::new(Notify::new()),
            shutdown_requested: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag shutdown and wake the accept loop.
    ///
    /// Uses `notify_one` so the permit is kept if the loop is not parked on
    /// `notified()` at this instant.
    pub fn request_shutdown(&self) {
        if !self.shutdown_requested.swap(true, Ordering::SeqCst) {
            logger::log_shutdown_requested();
        }
        self.shutdown.notify_one();
    }
}

impl Default for SignalHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Start signal handlers (Unix only)
///
/// | Signal  | Action        |
/// |---------|---------------|
/// | SIGTERM | Graceful stop |
/// | SIGINT  | Graceful stop |
#[cfg(unix)]
pub fn start_signal_handler(handler: Arc<SignalHandler>) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(term), Ok(int)) => (term, int),
                (Err(e), _) | (_, Err(e)) => {
                    logger::log_error(&format!(
                        "Failed to register signal handlers: {e}; falling back to Ctrl+C only"
                    ));
                    if tokio::signal::ctrl_c().await.is_ok() {
                        handler.request_shutdown();
                    }
                    return;
                }
            };

        logger::log_debug(&format!(
            "Signal handlers registered for process {}",
            std::process::id()
        ));

        tokio::select! {
            _ = sigterm.recv() => logger::log_debug("SIGTERM received"),
            _ = sigint.recv() => logger::log_debug("SIGINT received"),
        }
        handler.request_shutdown();
    });
}

/// Non-Unix fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub fn start_signal_handler(handler: Arc<SignalHandler>) {
    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            handler.request_shutdown();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_request_shutdown_is_not_lost() {
        let handler = SignalHandler::new();
        // Nobody is waiting yet; the permit must survive until someone does
        handler.request_shutdown();
        assert!(handler.shutdown_requested.load(Ordering::SeqCst));

        let woke = tokio::time::timeout(Duration::from_secs(1), handler.shutdown.notified()).await;
        assert!(woke.is_ok());
    }
}
