//! # Wuxing Core Library
//!
//! Core business logic for the Wuxing wearable companion: the guided
//! demo that walks a new user from birthday selection through a
//! sensor-gated step goal to the voice-interaction stage. The watch UI
//! and the CLI are thin layers over this library.
//!
//! ## Architecture
//!
//! - **Demo Orchestrator**: a wall-clock-based state machine that
//!   requires the host to periodically invoke `tick()` and to feed raw
//!   pedometer readings in
//! - **Step Calibration**: converts the raw, resettable cumulative step
//!   counter into a trustworthy session-relative count
//! - **Countdown**: at most one deadline, stored as an absolute
//!   timestamp so suspension gaps are accounted for on resume
//! - **Storage**: SQLite-backed key-value snapshot of the session and
//!   TOML-based configuration
//!
//! ## Key Components
//!
//! - [`DemoOrchestrator`]: the state machine
//! - [`StepCalibrator`]: sensor-anomaly filter
//! - [`SnapshotStore`]: persistence gateway trait
//! - [`DemoConfig`]: tunable thresholds

pub mod config;
pub mod demo;
pub mod element;
pub mod error;
pub mod events;
pub mod ports;
pub mod storage;

pub use config::DemoConfig;
pub use demo::{
    CalibrationBaseline, Countdown, CountdownKind, DemoOrchestrator, DemoProfile, DemoSession,
    DemoState, StepCalibrator, SESSION_KEY,
};
pub use element::{Element, Sex};
pub use error::{ConfigError, StoreError};
pub use events::Event;
pub use ports::{Clock, HealthMonitor, NotificationDispatcher, NotifyCategory, StepSource, SystemClock};
pub use storage::{MemoryStore, SnapshotStore, SqliteStore};
