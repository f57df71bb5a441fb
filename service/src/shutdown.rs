//! Stop signal for the farm's writer task.
//!
//! The writer drains its queue until told to stop. A stop comes from the
//! host (SIGINT/SIGTERM) or from code, and reaches every writer subscribed
//! to the same [`ShutdownController`].

use tokio::signal;
use tokio::sync::broadcast;

/// Broadcasts one stop signal to every farm writer that subscribed.
///
/// The writer `select!`s on its receiver ahead of the request queue. The
/// request in hand completes and is persisted; requests still queued are
/// dropped and their callers see `ChannelClosed`.
pub struct ShutdownController {
    tx: broadcast::Sender<()>,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Receiver handed to [`FarmService::spawn`](crate::FarmService::spawn).
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Stop every subscribed writer. Returns how many were notified.
    pub fn shutdown(&self) -> usize {
        let notified = self.tx.send(()).unwrap_or(0);
        tracing::debug!(writers = notified, "farm stop signalled");
        notified
    }

    /// Block until the host asks the farm to stop, then stop it.
    pub async fn wait_for_signal(&self) -> std::io::Result<()> {
        let ctrl_c = signal::ctrl_c();

        #[cfg(unix)]
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        #[cfg(unix)]
        let terminate = sigterm.recv();

        #[cfg(not(unix))]
        let terminate = std::future::pending::<Option<()>>();

        let source = tokio::select! {
            _ = ctrl_c => "SIGINT",
            _ = terminate => "SIGTERM",
        };
        tracing::info!(signal = source, "stopping farm");

        self.shutdown();
        Ok(())
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}
