//! Background monitor that periodically re-inspects stored values.

use crate::alerts::{AlertChannel, AlertPolicy};
use crate::error::{Result, StoreError};
use crate::store::SharedEntries;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Watcher configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Pause between sweeps.
    /// Default: 5s
    pub interval: Duration,

    /// Integer entry incremented on every sweep (None = no counter).
    pub counter_key: Option<String>,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            counter_key: None,
        }
    }
}

impl WatcherConfig {
    pub fn every(interval: Duration) -> Self {
        Self {
            interval,
            ..Default::default()
        }
    }

    /// Increment the integer under `key` on every sweep.
    ///
    /// The sweep never runs the alert policy over this key.
    pub fn with_counter(mut self, key: impl Into<String>) -> Self {
        self.counter_key = Some(key.into());
        self
    }
}

/// Handle to a running watcher thread.
pub(crate) struct Watcher {
    /// Dropping this wakes the thread and makes it exit.
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

impl Watcher {
    pub(crate) fn spawn(
        config: WatcherConfig,
        entries: SharedEntries,
        alerts: AlertChannel,
        policy: Arc<dyn AlertPolicy>,
    ) -> Result<Self> {
        let (stop, stopped) = bounded(0);
        let handle = thread::Builder::new()
            .name("store-watcher".to_string())
            .spawn(move || run(config, entries, alerts, policy, stopped))
            .map_err(|e| StoreError::Watcher(e.to_string()))?;
        debug!("watcher started");
        Ok(Self { stop, handle })
    }

    /// Signal the thread and wait for it to exit.
    pub(crate) fn stop(self) {
        drop(self.stop);
        if self.handle.join().is_err() {
            warn!("watcher thread panicked");
        } else {
            debug!("watcher stopped");
        }
    }
}

fn run(
    config: WatcherConfig,
    entries: SharedEntries,
    alerts: AlertChannel,
    policy: Arc<dyn AlertPolicy>,
    stopped: Receiver<()>,
) {
    let mut sweeps: u64 = 0;
    loop {
        match stopped.recv_timeout(config.interval) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }

        let snapshot = {
            let mut guard = entries.lock();
            let Some(current) = guard.as_mut() else {
                break;
            };
            if let Some(key) = &config.counter_key {
                current.increment(key);
            }
            current.snapshot()
        };

        let mut raised = Vec::new();
        for (key, value) in &snapshot {
            // The counter is bookkeeping, not a user value.
            if config.counter_key.as_deref() == Some(key.as_str()) {
                continue;
            }
            policy.inspect(key, value, &mut raised);
        }
        sweeps += 1;
        trace!(sweep = sweeps, entries = snapshot.len(), alerts = raised.len(), "watcher sweep");
        alerts.notify_all(raised);
    }
}
