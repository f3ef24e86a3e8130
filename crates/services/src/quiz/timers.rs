//! Cancellable deferred effects for the quiz controller.
//!
//! Timer tasks never touch a session. They only deliver an event back to the
//! controller's queue, stamped with the epoch that scheduled them, so a superseded
//! question can recognise and drop late deliveries.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// An event delivered by a timer, tagged with the epoch that scheduled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamped<E> {
    pub epoch: u64,
    pub event: E,
}

/// Handle to one scheduled effect. Dropping it does not cancel the effect.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    abort: AbortHandle,
}

impl TimerHandle {
    pub fn cancel(&self) {
        self.abort.abort();
    }
}

/// Owns every outstanding timer for one controller.
#[derive(Debug)]
pub struct TimerSet<E> {
    tx: mpsc::UnboundedSender<Stamped<E>>,
    handles: Vec<TimerHandle>,
    epoch: u64,
}

impl<E: Copy + Send + 'static> TimerSet<E> {
    #[must_use]
    pub fn new(tx: mpsc::UnboundedSender<Stamped<E>>) -> Self {
        Self {
            tx,
            handles: Vec::new(),
            epoch: 0,
        }
    }

    /// Epoch of timers scheduled from now on.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// True when `stamped` was scheduled before the latest `cancel_all`.
    #[must_use]
    pub fn is_stale(&self, stamped: &Stamped<E>) -> bool {
        stamped.epoch != self.epoch
    }

    /// Number of handles scheduled since the last `cancel_all`.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.handles.len()
    }

    /// Deliver `event` once after `delay`.
    pub fn after(&mut self, delay: Duration, event: E) -> TimerHandle {
        let tx = self.tx.clone();
        let stamped = Stamped {
            epoch: self.epoch,
            event,
        };
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(stamped);
        });
        self.track(task.abort_handle())
    }

    /// Deliver `event` every `period`, first after one full period.
    pub fn every(&mut self, period: Duration, event: E) -> TimerHandle {
        let tx = self.tx.clone();
        let stamped = Stamped {
            epoch: self.epoch,
            event,
        };
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(stamped).is_err() {
                    break;
                }
            }
        });
        self.track(task.abort_handle())
    }

    /// Cancel every outstanding timer and start a new epoch.
    pub fn cancel_all(&mut self) {
        for handle in self.handles.drain(..) {
            handle.cancel();
        }
        self.epoch = self.epoch.wrapping_add(1);
    }

    fn track(&mut self, abort: AbortHandle) -> TimerHandle {
        let handle = TimerHandle { abort };
        self.handles.push(handle.clone());
        handle
    }
}

impl<E> Drop for TimerSet<E> {
    fn drop(&mut self) {
        for handle in self.handles.drain(..) {
            handle.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Ping {
        Once,
        Tick,
    }

    #[tokio::test(start_paused = true)]
    async fn after_delivers_once_with_epoch() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timers = TimerSet::new(tx);
        let start = Instant::now();
        let _handle = timers.after(Duration::from_millis(800), Ping::Once);

        let got = rx.recv().await.unwrap();
        assert_eq!(got, Stamped { epoch: 0, event: Ping::Once });
        assert!(start.elapsed() >= Duration::from_millis(800));
        assert!(!timers.is_stale(&got));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_all_stops_delivery_and_bumps_epoch() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timers = TimerSet::new(tx);
        let _a = timers.after(Duration::from_secs(1), Ping::Once);
        let _b = timers.every(Duration::from_millis(100), Ping::Tick);
        assert_eq!(timers.tracked(), 2);

        timers.cancel_all();
        assert_eq!(timers.tracked(), 0);
        assert_eq!(timers.epoch(), 1);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn every_repeats_until_cancelled() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timers = TimerSet::new(tx);
        let handle = timers.every(Duration::from_millis(100), Ping::Tick);

        for _ in 0..3 {
            assert_eq!(rx.recv().await.unwrap().event, Ping::Tick);
        }
        handle.cancel();
        tokio::time::sleep(Duration::from_secs(1)).await;
        while rx.try_recv().is_ok() {}
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn events_from_old_epoch_are_stale() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut timers = TimerSet::new(tx);
        let old = Stamped {
            epoch: timers.epoch(),
            event: Ping::Once,
        };
        timers.cancel_all();
        assert!(timers.is_stale(&old));
    }
}
