use chrono::{DateTime, Utc};

/// Source of the instant used to select which rule-set version to compile.
/// Injected so tests and replay runs can pin the epoch.
pub trait ClockTrait: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockTrait for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
