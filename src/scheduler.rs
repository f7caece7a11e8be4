// Cooperative software timers
//
// A timer is polled with the current loop time. When its period has elapsed it
// raises a due flag (and runs its callback, if any) at most once per poll;
// polling slower than the period only delays firing, polling faster is a no-op.

use std::fmt;

use tracing::debug;

use crate::config::UPDATE_PERIOD_MS;

pub type TimerCallback = Box<dyn FnMut(u64) + Send>;

#[derive(Default)]
pub struct SoftTimer {
    period_ms: u64,
    enabled: bool,
    due: bool,
    last_fired_ms: u64,
    callback: Option<TimerCallback>,
}

impl fmt::Debug for SoftTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoftTimer")
            .field("period_ms", &self.period_ms)
            .field("enabled", &self.enabled)
            .field("due", &self.due)
            .field("last_fired_ms", &self.last_fired_ms)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

impl SoftTimer {
    pub fn new(period_ms: u64) -> Self {
        Self {
            period_ms,
            ..Self::default()
        }
    }

    pub fn set_delay(&mut self, ms: u64) {
        self.period_ms = ms;
    }

    /// Called with the loop time every time the timer fires
    pub fn set_callback(&mut self, callback: impl FnMut(u64) + Send + 'static) {
        self.callback = Some(Box::new(callback));
    }

    /// Start (or restart) the period from `now_ms`
    pub fn enable(&mut self, now_ms: u64) {
        self.enabled = true;
        self.last_fired_ms = now_ms;
    }

    /// Stop firing; a pending due flag is dropped
    pub fn disable(&mut self) {
        self.enabled = false;
        self.due = false;
    }

    /// Returns true if the timer fired on this call
    pub fn update(&mut self, now_ms: u64) -> bool {
        if !self.enabled || now_ms.saturating_sub(self.last_fired_ms) < self.period_ms {
            return false;
        }
        self.last_fired_ms = now_ms;
        self.due = true;
        if let Some(callback) = self.callback.as_mut() {
            callback(now_ms);
        }
        true
    }

    pub fn is_due(&self) -> bool {
        self.due
    }

    /// Consume the due flag
    pub fn take_due(&mut self) -> bool {
        std::mem::take(&mut self.due)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// The two periodic activities of the control loop
#[derive(Debug)]
pub struct Scheduler {
    /// Telemetry cadence
    pub telemetry: SoftTimer,
    /// Duration of a timed drive pulse; armed on demand
    pub pulse: SoftTimer,
}

impl Scheduler {
    /// Telemetry starts running at `now_ms`; the pulse timer stays idle
    pub fn new(telemetry_period_ms: u64, now_ms: u64) -> Self {
        let mut telemetry = SoftTimer::new(telemetry_period_ms);
        telemetry.enable(now_ms);
        Self {
            telemetry,
            pulse: SoftTimer::default(),
        }
    }

    pub fn update(&mut self, now_ms: u64) {
        if self.telemetry.update(now_ms) {
            debug!("Telemetry due at {}ms", now_ms);
        }
        if self.pulse.update(now_ms) {
            debug!("Pulse timer expired at {}ms", now_ms);
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(UPDATE_PERIOD_MS, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[test]
    fn test_fires_once_per_period() {
        let mut timer = SoftTimer::new(100);
        timer.enable(0);

        let fired: Vec<u64> = (0..=350).filter(|&t| timer.update(t)).collect();
        assert_eq!(fired, vec![100, 200, 300]);
    }

    #[test]
    fn test_undersampling_delays_without_bursts() {
        let mut timer = SoftTimer::new(100);
        timer.enable(0);

        assert!(timer.update(250));
        // the missed period is not made up
        assert!(!timer.update(260));
        assert!(!timer.update(349));
        assert!(timer.update(350));
    }

    #[test]
    fn test_due_flag_cleared_once_consumed() {
        let mut timer = SoftTimer::new(10);
        timer.enable(0);
        timer.update(10);
        assert!(timer.is_due());
        assert!(timer.take_due());
        assert!(!timer.take_due());
    }

    #[test]
    fn test_disabled_timer_never_fires() {
        let mut timer = SoftTimer::new(10);
        assert!(!timer.update(1_000));
        timer.enable(1_000);
        timer.update(1_010);
        timer.disable();
        assert!(!timer.is_due());
        assert!(!timer.update(5_000));
    }

    #[test]
    fn test_callback_runs_on_fire() {
        let last = Arc::new(AtomicU64::new(0));
        let mut timer = SoftTimer::new(50);
        {
            let last = Arc::clone(&last);
            timer.set_callback(move |now| last.store(now, Ordering::Relaxed));
        }
        timer.enable(0);
        timer.update(49);
        assert_eq!(last.load(Ordering::Relaxed), 0);
        timer.update(75);
        assert_eq!(last.load(Ordering::Relaxed), 75);
    }

    #[test]
    fn test_scheduler_pulse_idle_by_default() {
        let mut scheduler = Scheduler::new(100, 0);
        scheduler.update(10_000);
        assert!(scheduler.telemetry.is_due());
        assert!(!scheduler.pulse.is_due());
    }
}
