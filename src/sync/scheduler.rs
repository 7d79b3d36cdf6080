//! Fixed-period poll timer.
//!
//! One interval for the whole client. It restarts whenever the focused chat
//! or the signed-in identity changes, so a new focus never inherits a
//! half-elapsed period from the previous one. The requests a tick issues are
//! computed by the caller at tick time, never captured here.

use std::time::Duration;

use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use crate::models::Role;

/// State the poll timer is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollKey {
    pub focus: Option<i64>,
    pub identity: Option<(i64, Role)>,
}

pub struct PollScheduler {
    period: Duration,
    key: PollKey,
    interval: Interval,
}

impl PollScheduler {
    pub fn new(period: Duration, key: PollKey) -> Self {
        Self {
            period,
            key,
            interval: Self::fresh_interval(period),
        }
    }

    fn fresh_interval(period: Duration) -> Interval {
        // First tick one full period out; an immediate tick would duplicate
        // the read the triggering action already issued.
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    }

    /// Restart the timer if the key changed. Returns true on restart.
    pub fn sync_key(&mut self, key: PollKey) -> bool {
        if key == self.key {
            return false;
        }
        tracing::debug!("Poll key changed {:?} -> {:?}, restarting timer", self.key, key);
        self.key = key;
        self.interval = Self::fresh_interval(self.period);
        true
    }

    /// Wait for the next tick. Cancel-safe, for use in `tokio::select!`.
    pub async fn tick(&mut self) {
        self.interval.tick().await;
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_pending, assert_ready, task};

    const PERIOD: Duration = Duration::from_secs(3);

    fn key(focus: Option<i64>) -> PollKey {
        PollKey {
            focus,
            identity: Some((2, Role::Operator)),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_after_full_period() {
        let start = Instant::now();
        let mut sched = PollScheduler::new(PERIOD, key(None));
        sched.tick().await;
        assert_eq!(start.elapsed(), PERIOD);
        sched.tick().await;
        assert_eq!(start.elapsed(), PERIOD * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_key_does_not_restart() {
        let mut sched = PollScheduler::new(PERIOD, key(Some(1)));
        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(!sched.sync_key(key(Some(1))));

        let start = Instant::now();
        sched.tick().await;
        assert_eq!(start.elapsed(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_focus_change_restarts_period() {
        let mut sched = PollScheduler::new(PERIOD, key(Some(1)));
        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(sched.sync_key(key(Some(2))));
        assert!(!sched.sync_key(key(Some(2))));

        let start = Instant::now();
        sched.tick().await;
        assert_eq!(start.elapsed(), PERIOD);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_pending_until_period() {
        let mut sched = PollScheduler::new(PERIOD, key(None));
        {
            let mut tick = task::spawn(sched.tick());
            assert_pending!(tick.poll());
        }
        tokio::time::advance(PERIOD).await;
        let mut tick = task::spawn(sched.tick());
        assert_ready!(tick.poll());
    }
}
