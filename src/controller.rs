use crate::metrics;
use crate::session::{SessionStatus, TestMode};
use crate::time_series::{wpm_values, WpmSnapshot, SNAPSHOT_INTERVAL_SECS};
use crate::timer::TickSchedule;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Owns test status, the display timer and the WPM sample history.
///
/// ```text
/// idle --start--> running --blur--> paused --start--> running
///                    |                 |
///                    +--finish---------+--> finished
/// any --reset--> idle
/// ```
#[derive(Debug)]
pub struct TestController {
    mode: TestMode,
    status: SessionStatus,
    /// Seconds shown to the user: remaining for timed tests, elapsed otherwise.
    timer: u32,
    ticks: TickSchedule,
    /// Start of the current running stretch.
    resumed_at: Option<Instant>,
    /// Running time accumulated before the current stretch.
    active_before: Duration,
    snapshots: Vec<WpmSnapshot>,
    last_snapshot_secs: f64,
}

impl TestController {
    pub fn new(mode: TestMode) -> Self {
        Self {
            mode,
            status: SessionStatus::Idle,
            timer: initial_timer(mode),
            ticks: TickSchedule::default(),
            resumed_at: None,
            active_before: Duration::ZERO,
            snapshots: Vec::new(),
            last_snapshot_secs: 0.0,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn mode(&self) -> TestMode {
        self.mode
    }

    pub fn timer(&self) -> u32 {
        self.timer
    }

    pub fn snapshots(&self) -> &[WpmSnapshot] {
        &self.snapshots
    }

    /// Start from idle or resume from paused. Returns false from any other state.
    pub fn start(&mut self, now: Instant) -> bool {
        match self.status {
            SessionStatus::Idle => {
                self.active_before = Duration::ZERO;
                self.snapshots.clear();
                self.last_snapshot_secs = 0.0;
                self.timer = initial_timer(self.mode);
                info!(mode = %self.mode, "test started");
            }
            SessionStatus::Paused => {
                info!(elapsed_secs = self.active_before.as_secs_f64(), "test resumed");
            }
            SessionStatus::Running | SessionStatus::Finished => return false,
        }
        self.status = SessionStatus::Running;
        self.resumed_at = Some(now);
        self.ticks.start(now);
        true
    }

    /// Host lost focus. Only a running test pauses; content is untouched.
    pub fn pause(&mut self, now: Instant) -> bool {
        if self.status != SessionStatus::Running {
            return false;
        }
        self.halt(now);
        self.status = SessionStatus::Paused;
        info!(timer = self.timer, "test paused");
        true
    }

    pub fn finish(&mut self, now: Instant) -> bool {
        if !matches!(self.status, SessionStatus::Running | SessionStatus::Paused) {
            return false;
        }
        self.halt(now);
        self.status = SessionStatus::Finished;
        info!(
            timer = self.timer,
            samples = self.snapshots.len(),
            "test finished"
        );
        true
    }

    /// Back to idle from any state, dropping timer and samples.
    pub fn reset(&mut self) {
        self.ticks.cancel();
        self.status = SessionStatus::Idle;
        self.timer = initial_timer(self.mode);
        self.resumed_at = None;
        self.active_before = Duration::ZERO;
        self.snapshots.clear();
        self.last_snapshot_secs = 0.0;
        debug!(mode = %self.mode, "controller reset");
    }

    pub fn reset_with_mode(&mut self, mode: TestMode) {
        self.mode = mode;
        self.reset();
    }

    /// Apply any timer ticks due at `now`. Returns true if this call finished the test.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.status != SessionStatus::Running {
            return false;
        }
        for _ in 0..self.ticks.due(now) {
            if self.mode.is_timed() {
                self.timer = self.timer.saturating_sub(1);
                if self.timer == 0 {
                    return self.finish(now);
                }
            } else {
                self.timer += 1;
            }
        }
        false
    }

    /// Running time, excluding pauses.
    pub fn elapsed(&self, now: Instant) -> Duration {
        let current = self
            .resumed_at
            .map_or(Duration::ZERO, |t| now.saturating_duration_since(t));
        self.active_before + current
    }

    /// Sample WPM when at least [`SNAPSHOT_INTERVAL_SECS`] passed since the last sample.
    pub fn on_stats_changed(&mut self, correct: usize, now: Instant) {
        if self.status != SessionStatus::Running {
            return;
        }
        let elapsed = self.elapsed(now).as_secs_f64();
        if elapsed - self.last_snapshot_secs >= SNAPSHOT_INTERVAL_SECS {
            let snapshot = WpmSnapshot::new(elapsed.floor() as u64, metrics::wpm(correct, elapsed));
            debug!(t = snapshot.time_secs, wpm = snapshot.wpm, "wpm snapshot");
            self.snapshots.push(snapshot);
            self.last_snapshot_secs = elapsed;
        }
    }

    pub fn consistency(&self) -> u32 {
        metrics::consistency(&wpm_values(&self.snapshots))
    }

    /// Duration credited to the test: the configured length for timed tests,
    /// the count-up timer otherwise.
    pub fn duration_secs(&self) -> u32 {
        match self.mode {
            TestMode::Time { seconds } => seconds,
            _ => self.timer,
        }
    }

    fn halt(&mut self, now: Instant) {
        self.ticks.cancel();
        if let Some(t) = self.resumed_at.take() {
            self.active_before += now.saturating_duration_since(t);
        }
    }
}

fn initial_timer(mode: TestMode) -> u32 {
    match mode {
        TestMode::Time { seconds } => seconds,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    fn timed(seconds: u32) -> TestController {
        TestController::new(TestMode::Time { seconds })
    }

    fn words() -> TestController {
        TestController::new(TestMode::Words { count: 10 })
    }

    #[test]
    fn new_controller_is_idle() {
        let c = timed(30);
        assert_eq!(c.status(), SessionStatus::Idle);
        assert_eq!(c.timer(), 30);
        assert_eq!(words().timer(), 0);
    }

    #[test]
    fn start_only_from_idle_or_paused() {
        let t0 = Instant::now();
        let mut c = timed(30);

        assert!(c.start(t0));
        assert_eq!(c.status(), SessionStatus::Running);
        assert!(!c.start(t0));

        assert!(c.finish(t0 + secs(1.0)));
        assert!(!c.start(t0 + secs(2.0)));
        assert_eq!(c.status(), SessionStatus::Finished);
    }

    #[test]
    fn countdown_finishes_at_zero() {
        let t0 = Instant::now();
        let mut c = timed(3);
        c.start(t0);

        assert!(!c.poll(t0 + secs(1.0)));
        assert_eq!(c.timer(), 2);
        assert!(!c.poll(t0 + secs(2.5)));
        assert_eq!(c.timer(), 1);
        assert!(c.poll(t0 + secs(3.0)));
        assert_eq!(c.timer(), 0);
        assert_eq!(c.status(), SessionStatus::Finished);

        // no stale ticks once finished
        assert!(!c.poll(t0 + secs(10.0)));
        assert_eq!(c.timer(), 0);
    }

    #[test]
    fn late_poll_catches_up_and_stops_at_zero() {
        let t0 = Instant::now();
        let mut c = timed(2);
        c.start(t0);

        assert!(c.poll(t0 + secs(9.0)));
        assert_eq!(c.timer(), 0);
    }

    #[test]
    fn count_up_never_finishes_by_itself() {
        let t0 = Instant::now();
        let mut c = words();
        c.start(t0);

        assert!(!c.poll(t0 + secs(125.0)));
        assert_eq!(c.timer(), 125);
        assert_eq!(c.status(), SessionStatus::Running);
        assert_eq!(c.duration_secs(), 125);
    }

    #[test]
    fn pause_halts_timer_and_resume_needs_start() {
        let t0 = Instant::now();
        let mut c = timed(30);
        c.start(t0);
        c.poll(t0 + secs(2.0));

        assert!(c.pause(t0 + secs(2.5)));
        assert_eq!(c.status(), SessionStatus::Paused);
        assert!(!c.pause(t0 + secs(3.0)));

        // ticks while paused are discarded
        assert!(!c.poll(t0 + secs(20.0)));
        assert_eq!(c.timer(), 28);

        assert!(c.start(t0 + secs(20.0)));
        assert_eq!(c.timer(), 28);
        c.poll(t0 + secs(21.0));
        assert_eq!(c.timer(), 27);
    }

    #[test]
    fn elapsed_excludes_pauses() {
        let t0 = Instant::now();
        let mut c = words();
        c.start(t0);
        c.pause(t0 + secs(4.0));
        c.start(t0 + secs(10.0));

        assert_eq!(c.elapsed(t0 + secs(11.0)), secs(5.0));
    }

    #[test]
    fn pause_from_idle_is_ignored() {
        let mut c = words();
        assert!(!c.pause(Instant::now()));
        assert_eq!(c.status(), SessionStatus::Idle);
    }

    #[test]
    fn finish_from_paused() {
        let t0 = Instant::now();
        let mut c = words();
        c.start(t0);
        c.pause(t0 + secs(1.0));
        assert!(c.finish(t0 + secs(2.0)));
        assert_eq!(c.status(), SessionStatus::Finished);
    }

    #[test]
    fn reset_from_any_state() {
        let t0 = Instant::now();
        let mut c = timed(15);
        c.start(t0);
        c.on_stats_changed(10, t0 + secs(3.0));
        c.poll(t0 + secs(5.0));
        c.finish(t0 + secs(5.0));

        c.reset();

        assert_eq!(c.status(), SessionStatus::Idle);
        assert_eq!(c.timer(), 15);
        assert!(c.snapshots().is_empty());
        assert_eq!(c.elapsed(t0 + secs(50.0)), Duration::ZERO);
        assert!(!c.poll(t0 + secs(60.0)));
        assert_eq!(c.timer(), 15);
    }

    #[test]
    fn reset_with_mode_switches_timer() {
        let mut c = timed(15);
        c.reset_with_mode(TestMode::Time { seconds: 60 });
        assert_eq!(c.timer(), 60);
        c.reset_with_mode(TestMode::Words { count: 25 });
        assert_eq!(c.timer(), 0);
    }

    #[test]
    fn snapshots_every_two_seconds() {
        let t0 = Instant::now();
        let mut c = words();
        c.start(t0);

        c.on_stats_changed(5, t0 + secs(1.0));
        assert!(c.snapshots().is_empty());

        c.on_stats_changed(10, t0 + secs(2.0));
        c.on_stats_changed(11, t0 + secs(3.5));
        c.on_stats_changed(20, t0 + secs(4.0));

        // 10 chars in 2s = 60 wpm; 20 chars in 4s = 60 wpm
        assert_eq!(
            c.snapshots(),
            &[WpmSnapshot::new(2, 60), WpmSnapshot::new(4, 60)]
        );
    }

    #[test]
    fn snapshots_only_while_running() {
        let t0 = Instant::now();
        let mut c = words();
        c.on_stats_changed(10, t0 + secs(5.0));
        c.start(t0);
        c.pause(t0 + secs(1.0));
        c.on_stats_changed(10, t0 + secs(5.0));
        assert!(c.snapshots().is_empty());
    }

    #[test]
    fn restart_clears_snapshot_history() {
        let t0 = Instant::now();
        let mut c = words();
        c.start(t0);
        c.on_stats_changed(10, t0 + secs(2.0));
        c.finish(t0 + secs(3.0));
        c.reset();

        let t1 = t0 + secs(10.0);
        c.start(t1);
        c.on_stats_changed(10, t1 + secs(2.0));
        assert_eq!(c.snapshots(), &[WpmSnapshot::new(2, 60)]);
    }

    #[test]
    fn consistency_from_snapshots() {
        let t0 = Instant::now();
        let mut c = words();
        c.start(t0);
        assert_eq!(c.consistency(), 100);

        // 60, 60, 60 wpm
        c.on_stats_changed(10, t0 + secs(2.0));
        c.on_stats_changed(20, t0 + secs(4.0));
        c.on_stats_changed(30, t0 + secs(6.0));
        assert_eq!(c.consistency(), 100);
    }

    #[test]
    fn duration_for_timed_test_is_configured_length() {
        let t0 = Instant::now();
        let mut c = timed(30);
        c.start(t0);
        c.poll(t0 + secs(4.0));
        assert_eq!(c.duration_secs(), 30);
    }
}
