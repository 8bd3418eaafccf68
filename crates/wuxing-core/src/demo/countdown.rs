//! Single-deadline countdown.
//!
//! Holds zero or one armed deadline as an absolute epoch-ms end
//! timestamp. There is no internal thread -- the host calls `tick()`
//! about once per second while armed. Because the deadline is absolute,
//! a tick computed after an arbitrarily long suspension still yields a
//! correct, possibly already-zero, remaining value.

use serde::{Deserialize, Serialize};

/// Which deadline is armed. At most one exists at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountdownKind {
    Sedentary,
    StepDetection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Armed {
    kind: CountdownKind,
    end_epoch_ms: u64,
}

/// Zero-or-one active deadline.
#[derive(Debug, Clone, Default)]
pub struct Countdown {
    armed: Option<Armed>,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `kind` to fire `duration_ms` after `now_ms`, replacing any
    /// previously armed deadline.
    pub fn arm(&mut self, kind: CountdownKind, duration_ms: u64, now_ms: u64) {
        self.armed = Some(Armed {
            kind,
            end_epoch_ms: now_ms.saturating_add(duration_ms),
        });
    }

    /// Re-arm from a persisted absolute end timestamp.
    pub fn restore(&mut self, kind: CountdownKind, end_epoch_ms: u64) {
        self.armed = Some(Armed { kind, end_epoch_ms });
    }

    /// Cancel the armed deadline. Idempotent.
    pub fn disarm(&mut self) {
        self.armed = None;
    }

    pub fn kind(&self) -> Option<CountdownKind> {
        self.armed.map(|a| a.kind)
    }

    pub fn end_epoch_ms(&self) -> Option<u64> {
        self.armed.map(|a| a.end_epoch_ms)
    }

    /// `max(0, end - now)` for the armed deadline.
    pub fn remaining_ms(&self, now_ms: u64) -> Option<u64> {
        self.armed.map(|a| a.end_epoch_ms.saturating_sub(now_ms))
    }

    /// Check the deadline against `now_ms`. Fires at most once: when the
    /// remaining time reaches zero the kind is returned and the countdown
    /// disarms itself.
    pub fn tick(&mut self, now_ms: u64) -> Option<CountdownKind> {
        let armed = self.armed?;
        if now_ms >= armed.end_epoch_ms {
            self.armed = None;
            Some(armed.kind)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_exactly_once_then_disarms() {
        let mut c = Countdown::new();
        c.arm(CountdownKind::Sedentary, 30_000, 1_000);

        assert_eq!(c.tick(10_000), None);
        assert_eq!(c.remaining_ms(10_000), Some(21_000));

        assert_eq!(c.tick(31_000), Some(CountdownKind::Sedentary));
        assert_eq!(c.tick(31_000), None);
        assert_eq!(c.kind(), None);
    }

    #[test]
    fn long_suspension_gap_yields_zero_remaining() {
        let mut c = Countdown::new();
        c.arm(CountdownKind::StepDetection, 180_000, 0);

        // Tick arrives 200 seconds later than the arm.
        assert_eq!(c.remaining_ms(200_000), Some(0));
        assert_eq!(c.tick(200_000), Some(CountdownKind::StepDetection));
    }

    #[test]
    fn disarm_is_idempotent() {
        let mut c = Countdown::new();
        c.arm(CountdownKind::Sedentary, 1_000, 0);
        c.disarm();
        c.disarm();
        assert_eq!(c.tick(u64::MAX), None);
    }

    #[test]
    fn arm_replaces_previous_deadline() {
        let mut c = Countdown::new();
        c.arm(CountdownKind::Sedentary, 30_000, 0);
        c.arm(CountdownKind::StepDetection, 180_000, 0);
        assert_eq!(c.kind(), Some(CountdownKind::StepDetection));
        assert_eq!(c.tick(30_000), None);
    }

    #[test]
    fn restore_uses_absolute_end() {
        let mut c = Countdown::new();
        c.restore(CountdownKind::StepDetection, 50_000);
        assert_eq!(c.remaining_ms(20_000), Some(30_000));
        assert_eq!(c.tick(50_000), Some(CountdownKind::StepDetection));
    }
}
