// ABOUTME: Countdown timer that feeds periodic ticks into the session's trigger queue.
// ABOUTME: The handle owns the ticking task; cancelling or dropping it stops further ticks.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::controller::Trigger;

/// A running countdown. Ticks carry the epoch so the controller can discard
/// any that were already queued when the countdown was cancelled.
pub struct Countdown {
    epoch: u64,
    task: JoinHandle<()>,
}

impl Countdown {
    /// Spawn the ticking task. The first tick fires one full period after start.
    pub fn start(epoch: u64, period: Duration, tx: mpsc::Sender<Trigger>) -> Self {
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(Trigger::Tick { epoch }).await.is_err() {
                    break;
                }
            }
        });
        tracing::debug!("Countdown {epoch} started, period {period:?}");
        Self { epoch, task }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn cancel(self) {
        tracing::debug!("Countdown {} cancelled", self.epoch);
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.task.abort();
    }
}
