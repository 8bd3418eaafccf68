//! Demo session data model.
//!
//! [`DemoSession`] is the whole persisted record: current stage, profile,
//! optional absolute deadline timestamps, calibration baseline and the
//! monitoring flag. It is overwritten in the store on every transition
//! and on every accepted calibration emission, and deleted on exit.

use serde::{Deserialize, Serialize};

use crate::element::{Element, Sex};

/// Stage of the guided demo, ordered by normal progression.
///
/// `Inactive` is also reachable out of band from any stage via exit or
/// reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DemoState {
    #[default]
    Inactive,
    BirthdaySelection,
    MainPage,
    SedentaryTrigger,
    StepDetection,
    VoiceInteraction,
    Completed,
}

/// Mutable user profile for one demo session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DemoProfile {
    /// Birthday as epoch milliseconds, if confirmed.
    #[serde(default)]
    pub birthday_epoch_ms: Option<i64>,
    #[serde(default)]
    pub sex: Option<Sex>,
    /// Persona element derived from the birth year.
    #[serde(default)]
    pub element: Element,
    /// 0..=100; raised by the goal-completion award, clamped.
    #[serde(default)]
    pub intimacy_level: u8,
    /// Calibration-engine output, reset to 0 each monitoring start.
    #[serde(default)]
    pub session_step_count: u32,
    /// Monotonic while the session is active: never reset to false.
    #[serde(default)]
    pub step_goal_completed: bool,
    /// Monotonic; implies `step_goal_completed`.
    #[serde(default)]
    pub has_completed_demo: bool,
    #[serde(default)]
    pub health_streak_days: u32,
}

/// Retained state of the step calibration engine, valid only while step
/// monitoring is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationBaseline {
    /// Raw counter value treated as zero for this monitoring period.
    pub baseline: u64,
    /// Callbacks observed since monitoring started.
    pub checks_since_start: u32,
}

/// The full persisted demo record.
///
/// Deadlines are stored as absolute epoch-ms end timestamps, never as
/// remaining durations, so elapsed real time during process suspension is
/// accounted for on resume. Invariant: a deadline field is `Some` iff the
/// state machine is in the corresponding stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DemoSession {
    #[serde(default)]
    pub state: DemoState,
    #[serde(default)]
    pub profile: DemoProfile,
    /// Absolute end of the sedentary countdown (`SedentaryTrigger` only).
    #[serde(default)]
    pub sedentary_deadline_ms: Option<u64>,
    /// Absolute end of the step-detection window (`StepDetection` only).
    #[serde(default)]
    pub step_detection_deadline_ms: Option<u64>,
    #[serde(default)]
    pub baseline: Option<CalibrationBaseline>,
    #[serde(default)]
    pub monitoring_active: bool,
    /// One-shot welcome animation has been queued for the UI layer.
    #[serde(default)]
    pub welcome_shown: bool,
}

impl DemoSession {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Deadline-iff-state and monotonic-flag invariants, used by tests
    /// and debug assertions.
    pub fn invariants_hold(&self) -> bool {
        let sedentary_ok =
            self.sedentary_deadline_ms.is_some() == (self.state == DemoState::SedentaryTrigger);
        let detection_ok = self.step_detection_deadline_ms.is_some()
            == (self.state == DemoState::StepDetection);
        let completion_ok = !self.profile.has_completed_demo || self.profile.step_goal_completed;
        let intimacy_ok = self.profile.intimacy_level <= 100;
        sedentary_ok && detection_ok && completion_ok && intimacy_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_session_is_inactive() {
        let s = DemoSession::default();
        assert_eq!(s.state, DemoState::Inactive);
        assert!(!s.monitoring_active);
        assert!(s.invariants_hold());
    }

    #[test]
    fn json_roundtrip_preserves_deadlines() {
        let mut s = DemoSession::default();
        s.state = DemoState::StepDetection;
        s.step_detection_deadline_ms = Some(1_700_000_180_000);
        s.monitoring_active = true;
        s.baseline = Some(CalibrationBaseline {
            baseline: 1200,
            checks_since_start: 3,
        });
        s.profile.session_step_count = 7;

        let json = s.to_json().unwrap();
        let parsed = DemoSession::from_json(&json).unwrap();
        assert_eq!(parsed, s);
        assert!(parsed.invariants_hold());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let parsed = DemoSession::from_json("{}").unwrap();
        assert_eq!(parsed, DemoSession::default());
    }

    #[test]
    fn malformed_json_is_an_error_not_a_panic() {
        assert!(DemoSession::from_json("{not json").is_err());
    }

    #[test]
    fn invariant_catches_orphan_deadline() {
        let mut s = DemoSession::default();
        s.sedentary_deadline_ms = Some(42);
        assert!(!s.invariants_hold());
    }

    #[test]
    fn invariant_catches_completion_without_goal() {
        let mut s = DemoSession::default();
        s.profile.has_completed_demo = true;
        assert!(!s.invariants_hold());
    }
}
