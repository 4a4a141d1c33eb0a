//! Simulated upload progress.
//!
//! The value is cosmetic: it climbs on a timer while the request is in
//! flight and has no relation to bytes transferred.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Timer settings of the simulated progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressConfig {
    pub interval: Duration,
    pub step: u8,
    /// Highest value reached before the response arrives.
    pub cap: u8,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(300),
            step: 5,
            cap: 95,
        }
    }
}

/// A running progress timer. Dropping it without `finish` stops the timer.
pub struct ProgressTicker {
    progress: Arc<watch::Sender<u8>>,
    task: JoinHandle<()>,
}

impl ProgressTicker {
    /// Reset progress to 0 and start climbing.
    pub fn start(progress: Arc<watch::Sender<u8>>, config: ProgressConfig) -> Self {
        progress.send_replace(0);

        let sender = progress.clone();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(config.interval);
            // first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let mut capped = false;
                sender.send_modify(|value| {
                    *value = value.saturating_add(config.step).min(config.cap);
                    capped = *value >= config.cap;
                });
                if capped {
                    break;
                }
            }
        });

        Self { progress, task }
    }

    /// Stop the timer and snap to 100.
    pub fn finish(self) {
        self.task.abort();
        self.progress.send_replace(100);
    }

    /// Stop the timer and drop back to 0.
    pub fn discard(self) {
        self.task.abort();
        self.progress.send_replace(0);
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.task.abort();
    }
}
