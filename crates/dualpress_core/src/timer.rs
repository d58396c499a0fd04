use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::Clock;

/// Period of the display-refresh tick while a job runs.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Elapsed-time tracking for a single run.
///
/// The periodic tick itself is scheduled by the runtime (see
/// `Effect::StartTicker`); this type only owns the instants.
#[derive(Debug, Clone)]
pub struct ElapsedTimer {
    clock: Clock,
    started_at: Option<DateTime<Utc>>,
    stopped_at: Option<DateTime<Utc>>,
    last_tick: TimeDelta,
}

impl ElapsedTimer {
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            started_at: None,
            stopped_at: None,
            last_tick: TimeDelta::zero(),
        }
    }

    pub fn start(&mut self) {
        self.started_at = Some(self.clock.now());
        self.stopped_at = None;
        self.last_tick = TimeDelta::zero();
    }

    /// Freezes the elapsed time. Calling it on a timer that is not running
    /// does nothing.
    pub fn stop(&mut self) {
        if self.is_running() {
            self.stopped_at = Some(self.clock.now());
        }
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some() && self.stopped_at.is_none()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Zero before the first start, now minus the start instant while
    /// running, and the final run time once stopped. Never negative.
    pub fn elapsed(&self) -> TimeDelta {
        let Some(started_at) = self.started_at else {
            return TimeDelta::zero();
        };
        let end = self.stopped_at.unwrap_or_else(|| self.clock.now());
        clamp_non_negative(end - started_at)
    }

    /// Handles one firing of the periodic tick.
    pub fn tick(&mut self) -> TimeDelta {
        self.last_tick = self.elapsed();
        self.last_tick
    }

    /// Elapsed time as of the most recent tick.
    pub fn last_tick(&self) -> TimeDelta {
        self.last_tick
    }
}

fn clamp_non_negative(delta: TimeDelta) -> TimeDelta {
    delta.max(TimeDelta::zero())
}

/// Renders a duration as `MM:SS`. Minutes are not wrapped at 60 and
/// negative durations render as `00:00`.
pub fn format_elapsed(elapsed: TimeDelta) -> String {
    let total_seconds = clamp_non_negative(elapsed).num_seconds();
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{minutes:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::TimeZone;

    use super::*;

    fn manual_clock() -> (Clock, Arc<Mutex<DateTime<Utc>>>) {
        let now = Arc::new(Mutex::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        ));
        let handle = now.clone();
        (Clock::from_fn(move || *handle.lock().unwrap()), now)
    }

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_elapsed(TimeDelta::milliseconds(75_000)), "01:15");
        assert_eq!(format_elapsed(TimeDelta::milliseconds(5_000)), "00:05");
        assert_eq!(format_elapsed(TimeDelta::milliseconds(3_661_000)), "61:01");
        assert_eq!(format_elapsed(TimeDelta::milliseconds(999)), "00:00");
    }

    #[test]
    fn negative_durations_clamp_to_zero() {
        assert_eq!(format_elapsed(TimeDelta::seconds(-42)), "00:00");
    }

    #[test]
    fn elapsed_is_zero_before_start() {
        let (clock, _) = manual_clock();
        let timer = ElapsedTimer::new(clock);
        assert_eq!(timer.elapsed(), TimeDelta::zero());
        assert!(!timer.is_running());
    }

    #[test]
    fn elapsed_tracks_clock_and_freezes_on_stop() {
        let (clock, now) = manual_clock();
        let mut timer = ElapsedTimer::new(clock);
        timer.start();

        *now.lock().unwrap() += TimeDelta::seconds(3);
        assert_eq!(timer.tick(), TimeDelta::seconds(3));
        assert_eq!(timer.last_tick(), TimeDelta::seconds(3));

        *now.lock().unwrap() += TimeDelta::seconds(2);
        timer.stop();
        *now.lock().unwrap() += TimeDelta::seconds(10);

        assert!(!timer.is_running());
        assert_eq!(timer.elapsed(), TimeDelta::seconds(5));

        // Stopping again is harmless.
        timer.stop();
        assert_eq!(timer.elapsed(), TimeDelta::seconds(5));
    }

    #[test]
    fn clock_skew_never_yields_negative_elapsed() {
        let (clock, now) = manual_clock();
        let mut timer = ElapsedTimer::new(clock);
        timer.start();
        *now.lock().unwrap() -= TimeDelta::seconds(30);
        assert_eq!(timer.elapsed(), TimeDelta::zero());
    }
}
