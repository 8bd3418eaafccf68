use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::demo::session::DemoState;
use crate::element::Element;

/// Every observable change in the demo produces an Event.
/// The UI layer polls for events; it never reaches into the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    DemoStarted {
        at: DateTime<Utc>,
    },
    BirthdayConfirmed {
        element: Element,
        at: DateTime<Utc>,
    },
    SedentaryCountdownStarted {
        duration_ms: u64,
        at: DateTime<Utc>,
    },
    /// Published once per tick while a countdown is armed, for display.
    CountdownTick {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    StepDetectionStarted {
        duration_ms: u64,
        at: DateTime<Utc>,
    },
    StepCountUpdated {
        session_steps: u32,
        goal_steps: u32,
        at: DateTime<Utc>,
    },
    StepGoalCompleted {
        session_steps: u32,
        intimacy_level: u8,
        at: DateTime<Utc>,
    },
    /// Step-detection window elapsed without the goal being met.
    StepDetectionTimedOut {
        session_steps: u32,
        at: DateTime<Utc>,
    },
    /// Voice interaction finished; the demo is fully completed.
    DemoCompleted {
        at: DateTime<Utc>,
    },
    DemoExited {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: DemoState,
        session_steps: u32,
        intimacy_level: u8,
        remaining_ms: Option<u64>,
        has_completed_demo: bool,
        at: DateTime<Utc>,
    },
}
