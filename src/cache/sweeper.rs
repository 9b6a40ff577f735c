//! Background sweeping of expired cache entries
//!
//! Reads already evict expired entries lazily, but keys that are never read
//! again would otherwise stay in memory. The sweeper periodically calls
//! [`HoroscopeCache::sweep_expired`] on a tokio task.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use super::HoroscopeCache;

/// Configuration for the periodic sweep
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Time between sweeps
    pub interval: Duration,
    /// Whether sweeping is enabled
    pub enabled: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3600), // 1 hour
            enabled: true,
        }
    }
}

/// Handle for controlling the background sweep task
pub struct SweepHandle {
    /// Signals the task to stop; `None` when no task was spawned
    shutdown_tx: Option<mpsc::Sender<()>>,
}

impl SweepHandle {
    /// Spawns the sweep task for `cache`
    ///
    /// Must be called from within a tokio runtime. With sweeping disabled or
    /// a zero interval nothing is spawned.
    pub fn spawn(cache: Arc<HoroscopeCache>, config: SweepConfig) -> Self {
        if !config.enabled || config.interval.is_zero() {
            return Self { shutdown_tx: None };
        }

        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let sweep_interval = config.interval;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(sweep_interval);
            // Skip the first tick (immediate)
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let removed = cache.sweep_expired();
                        debug!(removed, remaining = cache.len(), "Swept expired cache entries");
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }
        });

        Self {
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Whether a sweep task was started
    pub fn is_running(&self) -> bool {
        self.shutdown_tx
            .as_ref()
            .is_some_and(|tx| !tx.is_closed())
    }

    /// Stops the background sweep task
    pub async fn shutdown(self) {
        if let Some(tx) = self.shutdown_tx {
            let _ = tx.send(()).await;
        }
    }
}
