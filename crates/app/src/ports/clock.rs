//! Clock port — injectable source of "now".
//!
//! Occurrence math is pure; the only ambient input is the wall clock, so it
//! lives behind a trait and tests pin fixed instants.

use chrono::{DateTime, FixedOffset, Local};

/// Source of the current local time.
///
/// The returned instant carries the local UTC offset captured at call time,
/// which keeps downstream occurrence arithmetic total.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Reads the system wall clock in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}
