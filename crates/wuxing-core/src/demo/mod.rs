//! The guided-demo subsystem: session model, countdown, step
//! calibration and the orchestrating state machine.

pub mod calibration;
pub mod countdown;
pub mod orchestrator;
pub mod session;

pub use calibration::StepCalibrator;
pub use countdown::{Countdown, CountdownKind};
pub use orchestrator::{DemoOrchestrator, SESSION_KEY};
pub use session::{CalibrationBaseline, DemoProfile, DemoSession, DemoState};
