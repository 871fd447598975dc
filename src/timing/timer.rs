/// Single-shot timer
///
/// A timer is armed with an interval and fires at most once per arming. It
/// does nothing on its own: the owner calls `take_if_due` from its poll path.
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default)]
pub struct SingleShotTimer {
    interval: Duration,
    deadline: Option<Instant>,
}

impl SingleShotTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) the timer to fire `interval` after `now`
    pub fn start(&mut self, interval: Duration, now: Instant) {
        self.interval = interval;
        self.deadline = Some(now + interval);
    }

    /// Disarm without firing
    pub fn stop(&mut self) {
        self.deadline = None;
    }

    pub fn is_active(&self) -> bool {
        self.deadline.is_some()
    }

    /// Interval of the most recent arming
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Disarm and return the deadline if it has passed
    ///
    /// Returning the deadline rather than `now` lets a self-rescheduling owner
    /// re-arm from the scheduled instant and catch up after a late poll.
    pub fn take_if_due(&mut self, now: Instant) -> Option<Instant> {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                Some(deadline)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_fires_once_at_deadline() {
        let start = Instant::now();
        let mut timer = SingleShotTimer::new();
        timer.start(Duration::from_millis(500), start);

        assert!(timer.is_active());
        assert_eq!(timer.interval(), Duration::from_millis(500));
        assert!(timer.take_if_due(start + Duration::from_millis(499)).is_none());

        let fired = timer.take_if_due(start + Duration::from_millis(500));
        assert_eq!(fired, Some(start + Duration::from_millis(500)));
        assert!(!timer.is_active());
        assert!(timer.take_if_due(start + Duration::from_secs(10)).is_none());
    }

    #[test]
    fn test_timer_stop_disarms() {
        let start = Instant::now();
        let mut timer = SingleShotTimer::new();
        timer.start(Duration::from_millis(10), start);
        timer.stop();

        assert!(!timer.is_active());
        assert!(timer.take_if_due(start + Duration::from_secs(1)).is_none());
    }

    #[test]
    fn test_zero_interval_fires_on_next_poll() {
        let start = Instant::now();
        let mut timer = SingleShotTimer::new();
        timer.start(Duration::ZERO, start);
        assert!(timer.take_if_due(start).is_some());
    }
}
