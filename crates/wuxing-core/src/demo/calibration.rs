//! Step calibration engine.
//!
//! Converts the raw cumulative step counter delivered by the pedometer
//! service into a trustworthy session-relative count. The raw counter is
//! monotonic under normal operation but jumps backwards when the service
//! restarts, and can deliver a backlog of pre-subscription steps on the
//! first real reading. At a 10-step goal both effects are larger than the
//! signal, so each one is filtered explicitly:
//!
//! - first callback baselines and reports 0
//! - a negative delta early in the session re-baselines; late, it is noise
//! - a large delta on the first post-baseline check is a stale backlog
//! - any delta beyond the spike cutoff is dropped outright

use crate::config::CalibrationConfig;
use crate::demo::session::CalibrationBaseline;

/// Backlog-jump guard applies only on the first post-baseline check.
/// Kept separate from `rebaseline_window_checks` for parity with the
/// shipped thresholds.
const BACKLOG_CHECK_INDEX: u32 = 1;

/// Filter from raw cumulative counts to session-relative counts.
///
/// Pure state machine, no I/O; the orchestrator feeds it one raw reading
/// at a time and persists its retained baseline.
#[derive(Debug, Clone)]
pub struct StepCalibrator {
    cfg: CalibrationConfig,
    state: Option<CalibrationBaseline>,
}

impl StepCalibrator {
    pub fn new(cfg: CalibrationConfig) -> Self {
        Self { cfg, state: None }
    }

    /// Begin a monitoring period. The baseline is deferred to the first
    /// callback rather than sampled here.
    pub fn start(&mut self) {
        self.state = None;
    }

    /// End the monitoring period, destroying the baseline. Idempotent.
    pub fn stop(&mut self) {
        self.state = None;
    }

    /// Rehydrate retained state from a persisted session.
    pub fn restore(&mut self, baseline: CalibrationBaseline) {
        self.state = Some(baseline);
    }

    pub fn baseline(&self) -> Option<CalibrationBaseline> {
        self.state
    }

    /// Observe one raw cumulative reading.
    ///
    /// Returns `Some(session_steps)` when the reading is accepted (the
    /// value may equal the previous one; redundant persistence is the
    /// caller's concern) and `None` when the reading is filtered out.
    pub fn observe(&mut self, raw: u64) -> Option<u32> {
        let Some(state) = self.state.as_mut() else {
            // Very first callback since monitoring started.
            self.state = Some(CalibrationBaseline {
                baseline: raw,
                checks_since_start: 1,
            });
            return Some(0);
        };

        let checks_before = state.checks_since_start;
        state.checks_since_start += 1;

        let delta = raw as i64 - state.baseline as i64;

        if delta < 0 {
            // Counter reset underneath us.
            if checks_before <= self.cfg.rebaseline_window_checks {
                state.baseline = raw;
                return Some(0);
            }
            // Late reset: noise, ignore.
            return None;
        }

        let delta = delta as u64;

        if checks_before == BACKLOG_CHECK_INDEX && delta > u64::from(self.cfg.backlog_jump_steps) {
            // Steps queued before monitoring began, not new motion.
            state.baseline = raw;
            return Some(0);
        }

        if delta > u64::from(self.cfg.spike_steps) {
            return None;
        }

        Some(delta as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calibrator() -> StepCalibrator {
        StepCalibrator::new(CalibrationConfig::default())
    }

    fn feed(cal: &mut StepCalibrator, raws: &[u64]) -> Vec<Option<u32>> {
        raws.iter().map(|&r| cal.observe(r)).collect()
    }

    #[test]
    fn first_callback_baselines_and_reports_zero() {
        let mut cal = calibrator();
        assert_eq!(feed(&mut cal, &[120, 120, 125]), vec![Some(0), Some(0), Some(5)]);
        assert_eq!(cal.baseline().unwrap().baseline, 120);
    }

    #[test]
    fn early_reset_rebaselines() {
        let mut cal = calibrator();
        assert_eq!(feed(&mut cal, &[50, 40]), vec![Some(0), Some(0)]);
        assert_eq!(cal.baseline().unwrap().baseline, 40);
    }

    #[test]
    fn late_reset_is_noise() {
        let mut cal = calibrator();
        // Six callbacks establish the session, then the counter resets.
        assert_eq!(
            feed(&mut cal, &[100, 101, 102, 103, 104, 105]),
            vec![Some(0), Some(1), Some(2), Some(3), Some(4), Some(5)]
        );
        assert_eq!(cal.observe(10), None);
        assert_eq!(cal.baseline().unwrap().baseline, 100);
        // Forward progress still measured against the old baseline.
        assert_eq!(cal.observe(106), Some(6));
    }

    #[test]
    fn backlog_jump_on_second_callback_rebaselines() {
        let mut cal = calibrator();
        assert_eq!(feed(&mut cal, &[1000, 1035]), vec![Some(0), Some(0)]);
        assert_eq!(cal.baseline().unwrap().baseline, 1035);
        assert_eq!(cal.observe(1040), Some(5));
    }

    #[test]
    fn jump_at_cutoff_is_accepted() {
        let mut cal = calibrator();
        // Exactly 30 on the second callback is real motion, not backlog.
        assert_eq!(feed(&mut cal, &[1000, 1030]), vec![Some(0), Some(30)]);
        assert_eq!(cal.baseline().unwrap().baseline, 1000);
    }

    #[test]
    fn large_jump_after_warmup_is_a_spike() {
        let mut cal = calibrator();
        assert_eq!(feed(&mut cal, &[100, 105]), vec![Some(0), Some(5)]);
        assert_eq!(cal.observe(500), None);
        assert_eq!(cal.baseline().unwrap().baseline, 100);
        // Subsequent sane readings continue from the same baseline.
        assert_eq!(cal.observe(110), Some(10));
    }

    #[test]
    fn checks_counter_advances_on_ignored_callbacks() {
        let mut cal = calibrator();
        assert_eq!(
            feed(&mut cal, &[100, 105, 1000, 1000, 1000, 1000]),
            vec![Some(0), Some(5), None, None, None, None]
        );
        // Four ignored spikes still consumed the rebaseline window.
        assert_eq!(cal.baseline().unwrap().checks_since_start, 6);
        assert_eq!(cal.observe(50), None);
    }

    #[test]
    fn stop_destroys_baseline() {
        let mut cal = calibrator();
        cal.observe(100);
        cal.stop();
        assert!(cal.baseline().is_none());
        cal.stop();
        // Next observation starts a fresh period.
        assert_eq!(cal.observe(4000), Some(0));
    }

    #[test]
    fn restore_resumes_mid_session() {
        let mut cal = calibrator();
        cal.restore(CalibrationBaseline {
            baseline: 200,
            checks_since_start: 3,
        });
        assert_eq!(cal.observe(207), Some(7));
    }
}
