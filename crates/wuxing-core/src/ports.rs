//! Port traits -- the boundary between the demo core and platform services.
//!
//! Adapters for the watch platform (pedometer service, notification
//! center, the always-on health monitor, wall clock) implement these
//! traits. The orchestrator consumes them via generics, so the core never
//! touches a platform API directly and every collaborator can be mocked.
//!
//! Raw step counts flow the other way: the adapter that owns the sensor
//! thread marshals readings onto the host's single execution context and
//! calls [`DemoOrchestrator::on_raw_step_count`](crate::DemoOrchestrator::on_raw_step_count).
//! The core never calls back into the step source from a mutation path.

use crate::element::Element;

/// Wall-clock source, epoch milliseconds.
///
/// Injected rather than read ambiently so suspension gaps can be
/// simulated in tests.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// System wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Subscription control for the raw cumulative step counter.
///
/// `start`/`stop` must be idempotent: stopping an already-stopped source
/// is a no-op. `is_running` lets the orchestrator re-subscribe after an
/// app resume when monitoring was persisted as active but the adapter
/// lost its callback registration.
pub trait StepSource {
    fn start(&mut self);
    fn stop(&mut self);
    fn is_running(&self) -> bool;
}

/// Category tag attached to outbound demo notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyCategory {
    /// "You've been sitting a while, take a short walk."
    Sedentary,
    /// "Goal reached" celebration.
    StepGoal,
}

/// Fire-and-forget notification dispatch. No return value is consumed;
/// delivery failures are the dispatcher's own concern.
pub trait NotificationDispatcher {
    fn send_suggestion(&mut self, element: Element, category: NotifyCategory);
    fn send_completion(&mut self, element: Element, category: NotifyCategory);
}

/// The sibling always-on health monitoring service.
///
/// It consumes the same pedometer the demo does, so the orchestrator
/// pauses it before starting step monitoring and resumes it whenever
/// monitoring stops (goal met, timeout, or exit).
pub trait HealthMonitor {
    fn pause(&mut self);
    fn resume(&mut self);
}
