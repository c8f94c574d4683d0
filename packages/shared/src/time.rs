//! Time utilities with a clock abstraction for testability.

use chrono::Local;

/// Clock trait for dependency injection and testing.
///
/// The broadcast engine stamps every relayed message with the wall-clock
/// time; injecting the clock keeps the stamp deterministic in tests.
pub trait Clock: Send + Sync {
    /// Current wall-clock time formatted as `HH:MM`.
    fn wall_time(&self) -> String;
}

/// System clock implementation (uses actual local time).
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn wall_time(&self) -> String {
        Local::now().format("%H:%M").to_string()
    }
}

/// Fixed clock implementation for testing (returns a fixed stamp).
#[derive(Debug, Clone)]
pub struct FixedClock {
    stamp: String,
}

impl FixedClock {
    /// Create a fixed clock that always reports the given `HH:MM` stamp.
    pub fn new(stamp: impl Into<String>) -> Self {
        Self {
            stamp: stamp.into(),
        }
    }
}

impl Clock for FixedClock {
    fn wall_time(&self) -> String {
        self.stamp.clone()
    }
}
