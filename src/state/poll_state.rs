use dashmap::DashMap;
use log::{debug, info, trace};
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PollerKey {
    ModsWatcher,
    LogsRefresh,
    LoginPoll,
}

/// What a poll body wants to happen after its tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Stop,
}

/// Handed to the poll body on every tick.
#[derive(Clone)]
pub struct PollTick {
    pub key: PollerKey,
    /// 1-based tick counter of this poller run.
    pub tick: u64,
    fingerprint: Arc<Mutex<Option<String>>>,
}

impl PollTick {
    pub async fn fingerprint(&self) -> Option<String> {
        self.fingerprint.lock().await.clone()
    }

    /// Stores `fingerprint` and returns the one seen on the previous tick.
    pub async fn replace_fingerprint(&self, fingerprint: String) -> Option<String> {
        self.fingerprint.lock().await.replace(fingerprint)
    }
}

struct PollHandle {
    generation: u64,
    cancel: CancellationToken,
    fingerprint: Arc<Mutex<Option<String>>>,
}

/// Runs named repeating tasks, at most one per [`PollerKey`].
///
/// Stopping a poller cancels its timer only. A tick that is already awaiting a
/// backend call finishes that call and then exits without running again.
pub struct PollSupervisor {
    pollers: Arc<DashMap<PollerKey, PollHandle>>,
    next_generation: AtomicU64,
}

impl Default for PollSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl PollSupervisor {
    pub fn new() -> Self {
        Self {
            pollers: Arc::new(DashMap::new()),
            next_generation: AtomicU64::new(1),
        }
    }

    pub fn start<F, Fut>(&self, key: PollerKey, every: Duration, body: F)
    where
        F: Fn(PollTick) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = TickOutcome> + Send + 'static,
    {
        self.start_seeded(key, every, None, body);
    }

    /// Like [`start`](Self::start), with the fingerprint slot pre-filled so the
    /// first tick compares against known state.
    pub fn start_seeded<F, Fut>(
        &self,
        key: PollerKey,
        every: Duration,
        fingerprint: Option<String>,
        body: F,
    ) where
        F: Fn(PollTick) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = TickOutcome> + Send + 'static,
    {
        self.stop(key);

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();
        let fingerprint = Arc::new(Mutex::new(fingerprint));

        self.pollers.insert(
            key,
            PollHandle {
                generation,
                cancel: cancel.clone(),
                fingerprint: Arc::clone(&fingerprint),
            },
        );
        info!(
            "Started poller {:?} (generation {}) every {:?}",
            key, generation, every
        );

        let pollers = Arc::clone(&self.pollers);
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + every, every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut tick = 0u64;

            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                tick += 1;
                trace!("Poller {:?} tick {}", key, tick);
                let outcome = body(PollTick {
                    key,
                    tick,
                    fingerprint: Arc::clone(&fingerprint),
                })
                .await;

                if cancel.is_cancelled() {
                    break;
                }
                if outcome == TickOutcome::Stop {
                    // A newer run under the same key must survive this exit
                    pollers.remove_if(&key, |_, handle| handle.generation == generation);
                    debug!("Poller {:?} (generation {}) finished on its own", key, generation);
                    break;
                }
            }
        });
    }

    /// Cancels the poller under `key` and drops its fingerprint.
    pub fn stop(&self, key: PollerKey) {
        if let Some((_, handle)) = self.pollers.remove(&key) {
            handle.cancel.cancel();
            info!("Stopped poller {:?} (generation {})", key, handle.generation);
        }
    }

    pub fn stop_all(&self) {
        let keys: Vec<PollerKey> = self.pollers.iter().map(|entry| *entry.key()).collect();
        for key in keys {
            self.stop(key);
        }
    }

    pub fn is_running(&self, key: PollerKey) -> bool {
        self.pollers.contains_key(&key)
    }

    pub async fn fingerprint(&self, key: PollerKey) -> Option<String> {
        let slot = self
            .pollers
            .get(&key)
            .map(|handle| Arc::clone(&handle.fingerprint))?;
        let value = slot.lock().await.clone();
        value
    }
}

impl Drop for PollSupervisor {
    fn drop(&mut self) {
        for entry in self.pollers.iter() {
            entry.value().cancel.cancel();
        }
    }
}
