/// Fade-out curve
///
/// Each fade step lowers the device volume by one and waits
/// `budget_ms / current_volume` before the next step. The wait grows as the
/// volume shrinks, so the ramp is not linear in time.
use std::time::Duration;

pub const DEFAULT_FADE_BUDGET_MS: u64 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FadeOut {
    budget_ms: u64,
}

impl FadeOut {
    pub fn new(budget_ms: u64) -> Self {
        Self { budget_ms }
    }

    pub fn budget_ms(&self) -> u64 {
        self.budget_ms
    }

    /// Delay before the step that leaves `volume` behind; `None` once silent
    pub fn step_interval(&self, volume: u8) -> Option<Duration> {
        if volume == 0 {
            return None;
        }
        Some(Duration::from_millis(self.budget_ms / u64::from(volume)))
    }

    /// Total time to fade from `volume` to zero
    pub fn total_duration(&self, volume: u8) -> Duration {
        (1..=volume)
            .filter_map(|level| self.step_interval(level))
            .sum()
    }
}

impl Default for FadeOut {
    fn default() -> Self {
        Self {
            budget_ms: DEFAULT_FADE_BUDGET_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_interval_recurrence() {
        let fade = FadeOut::default();
        assert_eq!(fade.step_interval(50), Some(Duration::from_millis(40)));
        assert_eq!(fade.step_interval(49), Some(Duration::from_millis(40)));
        assert_eq!(fade.step_interval(3), Some(Duration::from_millis(666)));
        assert_eq!(fade.step_interval(1), Some(Duration::from_millis(2000)));
        assert_eq!(fade.step_interval(0), None);
    }

    #[test]
    fn test_steps_slow_down_as_volume_drops() {
        let fade = FadeOut::default();
        let loud = fade.step_interval(100).unwrap();
        let quiet = fade.step_interval(10).unwrap();
        assert!(quiet > loud);
    }

    #[test]
    fn test_total_duration() {
        let fade = FadeOut::new(100);
        // 100/2 + 100/1
        assert_eq!(fade.total_duration(2), Duration::from_millis(150));
        assert_eq!(fade.total_duration(0), Duration::ZERO);
    }
}
