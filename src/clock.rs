// Fixed-tempo step clock. `beat()` blocks until the next step boundary on the
// wall-clock grid, so work done between beats never accumulates drift.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::config::{DEFAULT_BPM, DEFAULT_STEP_COUNT, SECONDS_PER_MINUTE};
use crate::error::{Result, SamplerError};

#[derive(Debug)]
pub struct Clock {
    step_count: usize,
    bpm: u32,
    steps_per_second: f64,
    counter: usize,
    running: Arc<AtomicBool>,
}

/// Cloneable stop handle. `play_loop` blocks its thread inside `beat()`, so
/// the only way to stop it is from another thread holding one of these.
#[derive(Clone)]
pub struct ClockSwitch(Arc<AtomicBool>);

impl ClockSwitch {
    pub fn stop(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self {
            step_count: DEFAULT_STEP_COUNT,
            bpm: DEFAULT_BPM,
            steps_per_second: SECONDS_PER_MINUTE / DEFAULT_BPM as f64
                * DEFAULT_STEP_COUNT as f64,
            counter: 0,
            running: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Clock {
    /// Both parameters must be positive: a zero bpm has no period to wait
    /// out, and a zero step count leaves the counter nowhere to wrap.
    pub fn new(step_count: usize, bpm: u32) -> Result<Self> {
        if bpm == 0 {
            return Err(SamplerError::InvalidBpm(bpm));
        }
        if step_count == 0 {
            return Err(SamplerError::InvalidStepCount(step_count));
        }
        Ok(Self {
            step_count,
            bpm,
            steps_per_second: SECONDS_PER_MINUTE / bpm as f64 * step_count as f64,
            counter: 0,
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Wait out the remainder of the current step, then advance.
    ///
    /// When stopped this returns the counter unchanged without sleeping, so a
    /// polling caller pays nothing. When running, the sleep is the time left
    /// until the next boundary of the absolute wall-clock grid rather than a
    /// fixed period; the counter wraps back to 0 at `step_count`.
    pub fn beat(&mut self) -> usize {
        if !self.is_running() {
            return self.counter;
        }

        let period = 1.0 / self.steps_per_second;
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64();
        thread::sleep(Duration::from_secs_f64(period - now % period));

        self.counter += 1;
        if self.counter == self.step_count {
            self.counter = 0;
        }
        self.counter
    }

    pub fn start(&self) {
        self.running.store(true, Ordering::Relaxed);
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub fn switch(&self) -> ClockSwitch {
        ClockSwitch(Arc::clone(&self.running))
    }

    pub fn bpm(&self) -> u32 {
        self.bpm
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn counter(&self) -> usize {
        self.counter
    }

    pub fn steps_per_second(&self) -> f64 {
        self.steps_per_second
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn derives_steps_per_second_from_bpm() {
        let clock = Clock::new(16, 120).unwrap();
        assert_eq!(clock.steps_per_second(), 8.0);

        let clock = Clock::new(4, 120).unwrap();
        assert_eq!(clock.steps_per_second(), 2.0);
    }

    #[test]
    fn rejects_zero_bpm_and_zero_step_count() {
        assert!(matches!(Clock::new(16, 0), Err(SamplerError::InvalidBpm(0))));
        assert!(matches!(Clock::new(0, 120), Err(SamplerError::InvalidStepCount(0))));
    }

    #[test]
    fn beat_while_stopped_returns_counter_without_waiting() {
        let mut clock = Clock::new(16, 120).unwrap();
        let started = Instant::now();
        assert_eq!(clock.beat(), 0);
        assert_eq!(clock.beat(), 0);
        // a running clock at these settings would have slept 125ms per beat
        assert!(started.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn counter_wraps_at_step_count() {
        // 64 steps per second keeps the whole sweep under half a second
        let mut clock = Clock::new(16, 15).unwrap();
        clock.start();
        for expected in 1..=16 {
            assert_eq!(clock.beat(), expected % 16);
        }
        assert_eq!(clock.counter(), 0);
    }

    #[test]
    fn beat_sleeps_at_most_one_period() {
        let mut clock = Clock::new(16, 15).unwrap(); // 64 steps/sec, ~15.6ms period
        clock.start();
        let started = Instant::now();
        clock.beat();
        assert!(started.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn consecutive_beats_land_on_the_period_grid() {
        // 64 steps/sec: after the first beat aligns to the grid, each of the
        // next beats should wait one full ~15.6ms period, give or take
        // scheduler jitter
        let mut clock = Clock::new(16, 15).unwrap();
        let period = 1.0 / clock.steps_per_second();
        clock.start();
        clock.beat();
        let started = Instant::now();
        for _ in 0..4 {
            clock.beat();
        }
        let elapsed = started.elapsed().as_secs_f64();
        assert!(elapsed > 4.0 * period * 0.5, "beats returned early: {elapsed}s");
        assert!(elapsed < 4.0 * period * 2.0, "beats overslept: {elapsed}s");
    }

    #[test]
    fn switch_stops_the_clock() {
        let clock = Clock::default();
        clock.start();
        assert!(clock.is_running());
        clock.switch().stop();
        assert!(!clock.is_running());
    }
}
