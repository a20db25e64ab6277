//! Step durations decomposed for carry-safe calendar arithmetic.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::{
    consts::{MICROS_PER_SECOND, SECONDS_PER_DAY},
    prelude::*,
};

/// A duration split into whole days, seconds and microseconds.
///
/// Fields may be signed and unreduced; [`crate::advance`] re-carries them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display(fmt = "{days}d {seconds}s {microseconds}us")]
pub struct StepTriple {
    #[serde(default)]
    pub days:         i64,
    #[serde(default)]
    pub seconds:      i64,
    #[serde(default)]
    pub microseconds: i64,
}

impl StepTriple {
    /// A step that leaves every value unchanged.
    pub const ZERO: Self = Self::new(0, 0, 0);

    /// Creates a triple from raw parts without reducing them.
    pub const fn new(days: i64, seconds: i64, microseconds: i64) -> Self {
        Self {
            days,
            seconds,
            microseconds,
        }
    }

    pub const fn from_days(days: i64) -> Self {
        Self::new(days, 0, 0)
    }

    pub const fn from_seconds(seconds: i64) -> Self {
        Self::new(0, seconds, 0)
    }

    pub const fn from_microseconds(microseconds: i64) -> Self {
        Self::new(0, 0, microseconds)
    }

    /// Exact length of the step in microseconds.
    pub const fn total_microseconds(&self) -> i128 {
        (self.days as i128 * SECONDS_PER_DAY as i128 + self.seconds as i128)
            * MICROS_PER_SECOND as i128
            + self.microseconds as i128
    }

    /// Length of the step in fractional seconds.
    #[allow(clippy::cast_precision_loss)]
    pub fn total_seconds(&self) -> f64 {
        self.total_microseconds() as f64 / MICROS_PER_SECOND as f64
    }

    /// Whether repeatedly applying this step moves strictly forward in time.
    pub const fn is_advancing(&self) -> bool {
        self.total_microseconds() > 0
    }
}

/// Splits a duration into `(days, seconds, microseconds)`.
///
/// Seconds end up in `0..86_400` and microseconds in `0..1_000_000`; the sign
/// lives in `days`, so `-1µs` becomes `(-1, 86_399, 999_999)`. Precision below
/// one microsecond is dropped.
pub fn decompose(duration: TimeDelta) -> StepTriple {
    let mut seconds = duration.num_seconds();
    // Carries the sign of the duration, so a negative remainder borrows a second.
    let mut microseconds = i64::from(duration.subsec_nanos() / 1_000);
    if microseconds < 0 {
        microseconds += MICROS_PER_SECOND;
        seconds -= 1;
    }
    StepTriple::new(
        seconds.div_euclid(SECONDS_PER_DAY),
        seconds.rem_euclid(SECONDS_PER_DAY),
        microseconds,
    )
}

impl From<TimeDelta> for StepTriple {
    fn from(duration: TimeDelta) -> Self {
        decompose(duration)
    }
}
