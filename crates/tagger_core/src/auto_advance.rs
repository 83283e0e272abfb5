//! Timed auto-advance through the subset

use std::time::{Duration, Instant};

pub const MIN_INTERVAL: Duration = Duration::from_millis(100);
pub const MAX_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AutoAdvanceState {
    #[default]
    Stopped,
    Running,
}

/// Auto-advance timer
///
/// Time is passed in by the caller so the session loop and tests share one
/// clock.
#[derive(Clone, Debug)]
pub struct AutoAdvance {
    state: AutoAdvanceState,
    interval: Duration,
    last_tick: Option<Instant>,
}

impl AutoAdvance {
    pub fn new(interval: Duration) -> Self {
        Self {
            state: AutoAdvanceState::Stopped,
            interval: interval.clamp(MIN_INTERVAL, MAX_INTERVAL),
            last_tick: None,
        }
    }

    pub fn start(&mut self, now: Instant) {
        self.state = AutoAdvanceState::Running;
        self.last_tick = Some(now);
    }

    pub fn stop(&mut self) {
        self.state = AutoAdvanceState::Stopped;
        self.last_tick = None;
    }

    /// Returns true when the timer is running afterwards
    pub fn toggle(&mut self, now: Instant) -> bool {
        match self.state {
            AutoAdvanceState::Stopped => self.start(now),
            AutoAdvanceState::Running => self.stop(),
        }
        self.is_running()
    }

    /// Push the next tick a full interval out; no-op when stopped
    pub fn restart(&mut self, now: Instant) {
        if self.is_running() {
            self.last_tick = Some(now);
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == AutoAdvanceState::Running
    }

    pub fn state(&self) -> AutoAdvanceState {
        self.state
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn set_interval(&mut self, interval: Duration, now: Instant) {
        self.interval = interval.clamp(MIN_INTERVAL, MAX_INTERVAL);
        self.restart(now);
    }

    /// Lengthen (positive) or shorten (negative) the interval by `delta_ms`
    pub fn adjust_interval(&mut self, delta_ms: i64, now: Instant) -> Duration {
        let current = self.interval.as_millis() as i64;
        let next = current.saturating_add(delta_ms).max(0) as u64;
        self.set_interval(Duration::from_millis(next), now);
        self.interval
    }

    /// Check if it's time to advance; consumes the tick when it is
    pub fn should_advance(&mut self, now: Instant) -> bool {
        if !self.is_running() {
            return false;
        }

        match self.last_tick {
            Some(last) if now.saturating_duration_since(last) >= self.interval => {
                self.last_tick = Some(now);
                true
            }
            _ => false,
        }
    }

    /// How long the caller may sleep before the next tick is due
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        if !self.is_running() {
            return None;
        }
        let last = self.last_tick?;
        Some(self.interval.saturating_sub(now.saturating_duration_since(last)))
    }

    /// Short indicator for the display; `None` while stopped
    pub fn status_label(&self) -> Option<String> {
        match self.state {
            AutoAdvanceState::Stopped => None,
            AutoAdvanceState::Running => Some(format!("Auto {:.1}s", self.interval.as_secs_f32())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_stopped_never_advances() {
        let mut timer = AutoAdvance::new(ms(500));
        let t0 = Instant::now();
        assert!(!timer.should_advance(t0 + ms(10_000)));
        assert_eq!(timer.time_until_next(t0), None);
        assert_eq!(timer.status_label(), None);
    }

    #[test]
    fn test_tick_cycle() {
        let mut timer = AutoAdvance::new(ms(500));
        let t0 = Instant::now();
        timer.start(t0);

        assert!(!timer.should_advance(t0 + ms(499)));
        assert_eq!(timer.time_until_next(t0 + ms(200)), Some(ms(300)));
        assert!(timer.should_advance(t0 + ms(500)));
        // Tick consumed; next one is a full interval later
        assert!(!timer.should_advance(t0 + ms(600)));
        assert!(timer.should_advance(t0 + ms(1000)));
    }

    #[test]
    fn test_toggle_and_restart() {
        let mut timer = AutoAdvance::new(ms(500));
        let t0 = Instant::now();
        assert!(timer.toggle(t0));
        assert_eq!(timer.state(), AutoAdvanceState::Running);

        timer.restart(t0 + ms(400));
        assert!(!timer.should_advance(t0 + ms(600)));
        assert!(timer.should_advance(t0 + ms(900)));

        assert!(!timer.toggle(t0 + ms(950)));
        timer.restart(t0 + ms(1000));
        assert!(!timer.is_running());
    }

    #[test]
    fn test_adjust_interval_clamps() {
        let mut timer = AutoAdvance::new(ms(500));
        let t0 = Instant::now();
        assert_eq!(timer.adjust_interval(250, t0), ms(750));
        assert_eq!(timer.adjust_interval(-10_000, t0), MIN_INTERVAL);
        assert_eq!(timer.adjust_interval(i64::MAX, t0), MAX_INTERVAL);

        assert_eq!(AutoAdvance::new(ms(1)).interval(), MIN_INTERVAL);
    }

    #[test]
    fn test_adjust_restarts_running_timer() {
        let mut timer = AutoAdvance::new(ms(500));
        let t0 = Instant::now();
        timer.start(t0);
        timer.adjust_interval(500, t0 + ms(400));
        assert!(!timer.should_advance(t0 + ms(1000)));
        assert!(timer.should_advance(t0 + ms(1400)));
        assert_eq!(timer.status_label().as_deref(), Some("Auto 1.0s"));
    }
}
