//! Calendar normalization shared by every range producer.

use crate::{
    CivilDateTime, MAX_YEAR, MIN_YEAR, RangeError, StepTriple,
    calendar::{civil_from_days, days_from_civil},
    consts::{MICROS_PER_SECOND, SECONDS_PER_DAY, SECONDS_PER_HOUR, SECONDS_PER_MINUTE},
};

const FIRST_DAY: i64 = days_from_civil(MIN_YEAR, 1, 1);
const LAST_DAY: i64 = days_from_civil(MAX_YEAR, 12, 31);

/// Applies `step` to `current` and returns the normalized result.
///
/// Microseconds carry into seconds and seconds into days with floor
/// division, so negative steps borrow across second, midnight, month and
/// year boundaries. The date moves through a linear day number, which keeps
/// the arithmetic exact over the whole `MIN_YEAR..=MAX_YEAR` range. The
/// timezone tag is forwarded untouched.
///
/// # Errors
/// Returns `RangeError::Overflow` if the result falls outside the
/// representable years.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn advance(current: &CivilDateTime, step: &StepTriple) -> Result<CivilDateTime, RangeError> {
    let overflow = || RangeError::Overflow {
        reason: format!("{current} + ({step}) leaves the supported calendar range"),
    };

    let total_micros = i64::from(current.microsecond())
        .checked_add(step.microseconds)
        .ok_or_else(overflow)?;
    let second_carry = total_micros.div_euclid(MICROS_PER_SECOND);
    let microsecond = total_micros.rem_euclid(MICROS_PER_SECOND);

    let total_seconds = current
        .seconds_of_day()
        .checked_add(step.seconds)
        .and_then(|seconds| seconds.checked_add(second_carry))
        .ok_or_else(overflow)?;
    let day_carry = total_seconds.div_euclid(SECONDS_PER_DAY);
    let seconds_of_day = total_seconds.rem_euclid(SECONDS_PER_DAY);

    let day_number = current
        .day_number()
        .checked_add(step.days)
        .and_then(|days| days.checked_add(day_carry))
        .filter(|days| (FIRST_DAY..=LAST_DAY).contains(days))
        .ok_or_else(overflow)?;
    let (year, month, day) = civil_from_days(day_number);

    // Every value below is reduced by the Euclidean remainders above.
    let hour = (seconds_of_day / SECONDS_PER_HOUR) as u8;
    let minute = (seconds_of_day % SECONDS_PER_HOUR / SECONDS_PER_MINUTE) as u8;
    let second = (seconds_of_day % SECONDS_PER_MINUTE) as u8;

    let next = CivilDateTime::from_normalized(
        year as i32,
        (month, day),
        (hour, minute, second),
        microsecond as u32,
        current.timezone().cloned(),
    );
    tracing::trace!(from = %current, to = %next, "advanced");
    Ok(next)
}
