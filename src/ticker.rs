//! Process-wide one-second ticker driving countdown badges.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::registry::{Wakeup, WakeupSender};

/// Countdown refresh period.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Sends [`Wakeup::CountdownTick`] once per second while running.
#[derive(Debug, Default)]
pub struct CountdownTicker {
    task: Option<JoinHandle<()>>,
}

impl CountdownTicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Start ticking. Does nothing if already running.
    pub fn start(&mut self, wakeups: &WakeupSender) {
        if self.task.is_some() {
            return;
        }

        let wakeups = wakeups.clone();
        self.task = Some(tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if wakeups.send(Wakeup::CountdownTick).is_err() {
                    break;
                }
            }
        }));
        tracing::debug!("Countdown ticker started");
    }

    /// Stop ticking. Safe to call when already stopped.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("Countdown ticker stopped");
        }
    }
}

impl Drop for CountdownTicker {
    fn drop(&mut self) {
        self.stop();
    }
}
