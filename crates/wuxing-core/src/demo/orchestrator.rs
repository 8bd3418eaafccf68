//! Guided-demo orchestrator.
//!
//! A wall-clock-based state machine. It owns the session record, the
//! countdown and the step calibrator, and drives every transition from
//! explicit calls, countdown expiry and raw sensor readings. It does not
//! use internal threads -- the host serializes all triggers (user calls,
//! periodic `tick()`, sensor callbacks, resume notifications) onto one
//! execution context.
//!
//! ## State transitions
//!
//! ```text
//! Inactive -> BirthdaySelection -> MainPage -> SedentaryTrigger
//!          -> StepDetection -> VoiceInteraction -> Completed
//! ```
//!
//! `Inactive` is reachable from any stage via `exit()`. Invalid triggers
//! (a guard not satisfied) are logged no-ops, never errors.
//!
//! Persistence is best effort: the session is snapshotted after every
//! transition and accepted step emission; a failed write is logged and
//! dropped, leaving the in-memory session authoritative.

use chrono::Utc;
use log::{debug, warn};

use crate::config::DemoConfig;
use crate::demo::calibration::StepCalibrator;
use crate::demo::countdown::{Countdown, CountdownKind};
use crate::demo::session::{DemoSession, DemoState};
use crate::element::{Element, Sex};
use crate::events::Event;
use crate::ports::{Clock, HealthMonitor, NotificationDispatcher, NotifyCategory, StepSource};
use crate::storage::SnapshotStore;

/// KV key holding the whole session record.
pub const SESSION_KEY: &str = "demo.session";

/// The demo state machine with its injected collaborators.
pub struct DemoOrchestrator<S, P, N, M, C>
where
    S: SnapshotStore,
    P: StepSource,
    N: NotificationDispatcher,
    M: HealthMonitor,
    C: Clock,
{
    config: DemoConfig,
    session: DemoSession,
    countdown: Countdown,
    calibrator: StepCalibrator,
    store: S,
    steps: P,
    notifier: N,
    monitor: M,
    clock: C,
}

impl<S, P, N, M, C> DemoOrchestrator<S, P, N, M, C>
where
    S: SnapshotStore,
    P: StepSource,
    N: NotificationDispatcher,
    M: HealthMonitor,
    C: Clock,
{
    /// Construct an inactive orchestrator. Call [`restore`](Self::restore)
    /// next to pick up a persisted session, if any.
    pub fn new(config: DemoConfig, store: S, steps: P, notifier: N, monitor: M, clock: C) -> Self {
        let calibrator = StepCalibrator::new(config.calibration.clone());
        Self {
            config,
            session: DemoSession::default(),
            countdown: Countdown::new(),
            calibrator,
            store,
            steps,
            notifier,
            monitor,
            clock,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> DemoState {
        self.session.state
    }

    pub fn session(&self) -> &DemoSession {
        &self.session
    }

    pub fn remaining_ms(&self) -> Option<u64> {
        self.countdown.remaining_ms(self.clock.now_ms())
    }

    /// Build a full state snapshot event for a polling UI.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.session.state,
            session_steps: self.session.profile.session_step_count,
            intimacy_level: self.session.profile.intimacy_level,
            remaining_ms: self.remaining_ms(),
            has_completed_demo: self.session.profile.has_completed_demo,
            at: Utc::now(),
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Load the persisted session, exactly once at startup.
    ///
    /// A missing, unreadable or inconsistent record means "no session":
    /// the orchestrator stays Inactive. When a session is restored, any
    /// already-elapsed deadline fires synchronously and the returned
    /// event reports that transition.
    pub fn restore(&mut self) -> Option<Event> {
        let loaded = match self.store.get(SESSION_KEY) {
            Ok(Some(json)) => match DemoSession::from_json(&json) {
                Ok(s) => Some(s),
                Err(e) => {
                    warn!("discarding malformed session snapshot: {e}");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("failed to read session snapshot: {e}");
                None
            }
        };

        let Some(session) = loaded.filter(|s| s.invariants_hold()) else {
            self.session = DemoSession::default();
            return None;
        };

        self.session = session;
        self.countdown.disarm();
        if let Some(end) = self.session.sedentary_deadline_ms {
            self.countdown.restore(CountdownKind::Sedentary, end);
        }
        if let Some(end) = self.session.step_detection_deadline_ms {
            self.countdown.restore(CountdownKind::StepDetection, end);
        }
        match self.session.baseline {
            Some(b) => self.calibrator.restore(b),
            None => self.calibrator.stop(),
        }
        self.recalculate_on_resume()
    }

    /// Begin a fresh session from any state.
    pub fn start(&mut self) -> Event {
        self.stop_monitoring();
        self.countdown.disarm();
        self.session = DemoSession {
            state: DemoState::BirthdaySelection,
            ..DemoSession::default()
        };
        self.persist();
        Event::DemoStarted { at: Utc::now() }
    }

    /// Tear the session down from any state. Idempotent: a second call is
    /// a no-op with the same end state and no repeated side effects.
    pub fn exit(&mut self) -> Event {
        self.stop_monitoring();
        self.countdown.disarm();
        self.session = DemoSession::default();
        if let Err(e) = self.store.remove(SESSION_KEY) {
            warn!("failed to delete session snapshot: {e}");
        }
        Event::DemoExited { at: Utc::now() }
    }

    /// Exit and immediately start over.
    pub fn reset(&mut self) -> Event {
        self.exit();
        self.start()
    }

    // ── User-flow transitions ────────────────────────────────────────

    /// Confirm the birthday selection; moves to the main page and queues
    /// the one-shot welcome for the UI layer.
    pub fn set_birthday(
        &mut self,
        birthday: chrono::DateTime<Utc>,
        sex: Sex,
    ) -> Option<Event> {
        if self.session.state != DemoState::BirthdaySelection {
            debug!(
                "set_birthday ignored in state {:?}",
                self.session.state
            );
            return None;
        }
        use chrono::Datelike;
        let element = Element::from_birth_year(birthday.year());
        let profile = &mut self.session.profile;
        profile.birthday_epoch_ms = Some(birthday.timestamp_millis());
        profile.sex = Some(sex);
        profile.element = element;
        self.session.state = DemoState::MainPage;
        self.session.welcome_shown = true;
        self.persist();
        Some(Event::BirthdayConfirmed {
            element,
            at: Utc::now(),
        })
    }

    /// Start the sedentary countdown. Valid only from the main page or
    /// voice interaction, and only while the step goal is still open.
    pub fn trigger_sedentary_detection(&mut self) -> Option<Event> {
        let in_valid_state = matches!(
            self.session.state,
            DemoState::MainPage | DemoState::VoiceInteraction
        );
        if !in_valid_state
            || self.session.profile.has_completed_demo
            || self.session.profile.step_goal_completed
        {
            debug!(
                "sedentary trigger ignored: state={:?} completed={}",
                self.session.state, self.session.profile.has_completed_demo
            );
            return None;
        }

        let now = self.clock.now_ms();
        let duration_ms = self.config.sedentary_countdown_ms();
        self.countdown.arm(CountdownKind::Sedentary, duration_ms, now);
        self.session.state = DemoState::SedentaryTrigger;
        self.session.sedentary_deadline_ms = self.countdown.end_epoch_ms();
        self.persist();
        Some(Event::SedentaryCountdownStarted {
            duration_ms,
            at: Utc::now(),
        })
    }

    /// The voice collaborator reports its exchange finished; moves to the
    /// terminal `Completed` stage.
    pub fn finish_voice_interaction(&mut self) -> Option<Event> {
        if self.session.state != DemoState::VoiceInteraction {
            debug!(
                "finish_voice_interaction ignored in state {:?}",
                self.session.state
            );
            return None;
        }
        self.session.state = DemoState::Completed;
        self.persist();
        Some(Event::DemoCompleted { at: Utc::now() })
    }

    // ── External event sources ───────────────────────────────────────

    /// Call about once per second while a countdown is armed. Applies the
    /// expiry transition when the deadline is reached, otherwise publishes
    /// the remaining time for display.
    pub fn tick(&mut self) -> Option<Event> {
        let now = self.clock.now_ms();
        if let Some(kind) = self.countdown.tick(now) {
            return Some(self.handle_expiry(kind, now));
        }
        self.countdown.remaining_ms(now).map(|remaining_ms| Event::CountdownTick {
            remaining_ms,
            at: Utc::now(),
        })
    }

    /// Feed one raw cumulative pedometer reading. The adapter that owns
    /// the sensor must marshal onto the host context before calling this.
    pub fn on_raw_step_count(&mut self, raw: u64) -> Option<Event> {
        if !self.session.monitoring_active || self.session.state != DemoState::StepDetection {
            debug!("raw step count ignored outside step detection: {raw}");
            return None;
        }

        let baseline_before = self.calibrator.baseline().map(|b| b.baseline);
        let Some(session_steps) = self.calibrator.observe(raw) else {
            // Filtered as noise; keep the check counter in memory but do
            // not count this as a calibration update worth persisting.
            self.session.baseline = self.calibrator.baseline();
            return None;
        };
        self.session.baseline = self.calibrator.baseline();

        let rebaselined = baseline_before != self.session.baseline.map(|b| b.baseline);
        let changed = session_steps != self.session.profile.session_step_count || rebaselined;
        if changed {
            self.session.profile.session_step_count = session_steps;
        }

        if session_steps >= self.config.step_goal.goal_steps
            && !self.session.profile.step_goal_completed
        {
            return Some(self.complete_goal());
        }

        if changed {
            self.persist();
            return Some(Event::StepCountUpdated {
                session_steps,
                goal_steps: self.config.step_goal.goal_steps,
                at: Utc::now(),
            });
        }
        None
    }

    /// Recompute the armed deadline after an app resume. Idempotent and
    /// safe to call redundantly: an already-elapsed deadline fires
    /// synchronously instead of waiting for the next tick, and a lost
    /// step subscription is re-established.
    pub fn recalculate_on_resume(&mut self) -> Option<Event> {
        let now = self.clock.now_ms();
        if let Some(kind) = self.countdown.tick(now) {
            return Some(self.handle_expiry(kind, now));
        }
        if self.session.state == DemoState::StepDetection
            && self.session.monitoring_active
            && !self.steps.is_running()
        {
            // The sibling monitor must be off whenever the pedometer is
            // subscribed; a fresh process starts with it running.
            self.monitor.pause();
            self.steps.start();
        }
        None
    }

    // ── Internal transitions ─────────────────────────────────────────

    fn handle_expiry(&mut self, kind: CountdownKind, now_ms: u64) -> Event {
        match kind {
            CountdownKind::Sedentary => self.enter_step_detection(now_ms),
            CountdownKind::StepDetection => self.step_detection_timeout(),
        }
    }

    /// Sedentary countdown elapsed: open the step-detection window and
    /// start step monitoring. The sibling monitor is paused first so the
    /// pedometer has a single consumer; the calibration baseline is
    /// deferred to the first raw callback.
    fn enter_step_detection(&mut self, now_ms: u64) -> Event {
        self.session.sedentary_deadline_ms = None;
        let duration_ms = self.config.step_detection_countdown_ms();
        self.countdown
            .arm(CountdownKind::StepDetection, duration_ms, now_ms);
        self.session.state = DemoState::StepDetection;
        self.session.step_detection_deadline_ms = self.countdown.end_epoch_ms();

        self.notifier
            .send_suggestion(self.session.profile.element, NotifyCategory::Sedentary);

        self.monitor.pause();
        self.calibrator.start();
        self.steps.start();
        self.session.monitoring_active = true;
        self.session.profile.session_step_count = 0;
        self.session.baseline = None;

        self.persist();
        Event::StepDetectionStarted {
            duration_ms,
            at: Utc::now(),
        }
    }

    /// Step-detection window elapsed with the goal not met: back to the
    /// main page, no award.
    fn step_detection_timeout(&mut self) -> Event {
        self.stop_monitoring();
        self.countdown.disarm();
        self.session.step_detection_deadline_ms = None;
        self.session.state = DemoState::MainPage;
        self.persist();
        Event::StepDetectionTimedOut {
            session_steps: self.session.profile.session_step_count,
            at: Utc::now(),
        }
    }

    /// The calibrated count reached the goal: award intimacy, mark the
    /// monotonic completion flags, stop monitoring and move to voice
    /// interaction. Fires at most once per session.
    fn complete_goal(&mut self) -> Event {
        let award = self.config.step_goal.intimacy_award;
        let profile = &mut self.session.profile;
        profile.step_goal_completed = true;
        profile.has_completed_demo = true;
        profile.intimacy_level = profile.intimacy_level.saturating_add(award).min(100);

        self.stop_monitoring();
        self.countdown.disarm();
        self.session.step_detection_deadline_ms = None;
        self.session.state = DemoState::VoiceInteraction;

        self.notifier
            .send_completion(self.session.profile.element, NotifyCategory::StepGoal);

        self.persist();
        Event::StepGoalCompleted {
            session_steps: self.session.profile.session_step_count,
            intimacy_level: self.session.profile.intimacy_level,
            at: Utc::now(),
        }
    }

    /// Stop step monitoring and hand the pedometer back to the sibling
    /// monitor. Idempotent: a no-op when monitoring is not active.
    fn stop_monitoring(&mut self) {
        if !self.session.monitoring_active {
            return;
        }
        self.steps.stop();
        self.monitor.resume();
        self.calibrator.stop();
        self.session.monitoring_active = false;
        self.session.baseline = None;
    }

    fn persist(&mut self) {
        debug_assert!(self.session.invariants_hold());
        match self.session.to_json() {
            Ok(json) => {
                if let Err(e) = self.store.set(SESSION_KEY, &json) {
                    warn!("dropping session snapshot write: {e}");
                }
            }
            Err(e) => warn!("failed to encode session snapshot: {e}"),
        }
    }
}
