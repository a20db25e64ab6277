mod calendar;
mod consts;
mod format;
mod normalize;
mod prelude;
mod range;
mod sequence;
mod step;
mod tz;

pub use calendar::{days_in_month, is_leap_year};
pub use consts::*;
pub use format::{FormatError, Formatter, StrftimeFormatter};
pub use normalize::advance;
pub use range::{RangeError, RangeRequest, datetime_range, strftime_range};
pub use sequence::{DateTimeSequence, FormattedSequence};
pub use step::{StepTriple, decompose};
pub use tz::{TimeZoneRef, TimeZoneTag};

use crate::prelude::*;
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// A proleptic Gregorian wall-clock timestamp with microsecond precision.
///
/// The optional timezone is an opaque tag: it is carried along and consulted
/// only when values in different zones are ordered or subtracted.
#[derive(Debug, Clone)]
pub struct CivilDateTime {
    year:        i32,
    month:       u8,
    day:         u8,
    hour:        u8,
    minute:      u8,
    second:      u8,
    microsecond: u32,
    timezone:    Option<TimeZoneRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum DateTimeError {
    #[display(fmt = "Invalid datetime format: {_0}")]
    InvalidFormat(String),
    #[display(fmt = "Invalid year: {} (must be {}-{})", "_0", MIN_YEAR, MAX_YEAR)]
    InvalidYear(i64),
    #[display(fmt = "Invalid month: {} (must be 1-{})", "_0", MAX_MONTH)]
    InvalidMonth(u8),
    #[display(fmt = "Invalid day {day} for month {year}-{month:02}")]
    InvalidDay { year: i32, month: u8, day: u8 },
    #[display(fmt = "Invalid time of day {hour:02}:{minute:02}:{second:02}.{microsecond:06}")]
    InvalidTime {
        hour:        u32,
        minute:      u32,
        second:      u32,
        microsecond: u32,
    },
    #[display(fmt = "Unknown timezone: {_0}")]
    UnknownTimeZone(String),
    #[display(fmt = "Empty datetime string")]
    EmptyInput,
}

impl std::error::Error for DateTimeError {}

impl CivilDateTime {
    /// Creates a naive (untagged) timestamp, validating every field.
    ///
    /// # Errors
    /// Returns `DateTimeError` if any field is out of range for the calendar.
    pub fn new(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        microsecond: u32,
    ) -> Result<Self, DateTimeError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(DateTimeError::InvalidYear(i64::from(year)));
        }
        if month == 0 || month > MAX_MONTH {
            return Err(DateTimeError::InvalidMonth(month));
        }
        if day < MIN_DAY || day > days_in_month(year, month) {
            return Err(DateTimeError::InvalidDay { year, month, day });
        }
        if hour > MAX_HOUR || minute > MAX_MINUTE || second > MAX_SECOND || microsecond > MAX_MICROSECOND {
            return Err(DateTimeError::InvalidTime {
                hour: hour.into(),
                minute: minute.into(),
                second: second.into(),
                microsecond,
            });
        }
        Ok(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            microsecond,
            timezone: None,
        })
    }

    /// Creates a naive timestamp at midnight of the given date.
    ///
    /// # Errors
    /// Returns `DateTimeError` if the date is invalid.
    pub fn from_ymd(year: i32, month: u8, day: u8) -> Result<Self, DateTimeError> {
        Self::new(year, month, day, 0, 0, 0, 0)
    }

    /// Builds a value from fields the caller has already reduced into range.
    pub(crate) const fn from_normalized(
        year: i32,
        (month, day): (u8, u8),
        (hour, minute, second): (u8, u8, u8),
        microsecond: u32,
        timezone: Option<TimeZoneRef>,
    ) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            microsecond,
            timezone,
        }
    }

    /// Returns the same wall-clock time carrying `timezone` instead.
    #[must_use]
    pub fn with_timezone(mut self, timezone: Option<TimeZoneRef>) -> Self {
        self.timezone = timezone;
        self
    }

    pub const fn year(&self) -> i32 {
        self.year
    }

    pub const fn month(&self) -> u8 {
        self.month
    }

    pub const fn day(&self) -> u8 {
        self.day
    }

    pub const fn hour(&self) -> u8 {
        self.hour
    }

    pub const fn minute(&self) -> u8 {
        self.minute
    }

    pub const fn second(&self) -> u8 {
        self.second
    }

    pub const fn microsecond(&self) -> u32 {
        self.microsecond
    }

    pub const fn timezone(&self) -> Option<&TimeZoneRef> {
        self.timezone.as_ref()
    }

    /// Whether a timezone tag is attached.
    pub const fn is_aware(&self) -> bool {
        self.timezone.is_some()
    }

    /// Days since 1970-01-01 of the date part.
    pub(crate) const fn day_number(&self) -> i64 {
        calendar::days_from_civil(self.year, self.month, self.day)
    }

    /// Seconds elapsed since midnight.
    pub(crate) const fn seconds_of_day(&self) -> i64 {
        self.hour as i64 * SECONDS_PER_HOUR + self.minute as i64 * SECONDS_PER_MINUTE + self.second as i64
    }

    /// Wall-clock microseconds since 1970-01-01T00:00:00, ignoring the timezone.
    fn local_micros(&self) -> i128 {
        (i128::from(self.day_number()) * i128::from(SECONDS_PER_DAY) + i128::from(self.seconds_of_day()))
            * i128::from(MICROS_PER_SECOND)
            + i128::from(self.microsecond)
    }

    /// The wall-clock time as a chrono value, dropping the timezone tag.
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.month.into(), self.day.into())?.and_hms_micro_opt(
            self.hour.into(),
            self.minute.into(),
            self.second.into(),
            self.microsecond,
        )
    }

    /// UTC offset in seconds reported by the attached tag for this instant.
    pub fn utc_offset(&self) -> Option<i32> {
        let timezone = self.timezone.as_ref()?;
        timezone.utc_offset(&self.to_naive()?)
    }

    /// Signed microseconds from `other` to `self`.
    ///
    /// Values in the same zone (or both naive) are subtracted as wall clocks;
    /// values in different zones are first shifted to UTC by their offsets.
    ///
    /// # Errors
    /// Returns `RangeError::ComparisonFailure` if exactly one value is
    /// timezone-aware, or if an offset cannot be determined.
    pub fn micros_since(&self, other: &Self) -> Result<i128, RangeError> {
        if tz::same_tag(self.timezone.as_ref(), other.timezone.as_ref()) {
            return Ok(self.local_micros() - other.local_micros());
        }
        if self.is_aware() != other.is_aware() {
            return Err(RangeError::ComparisonFailure {
                reason: "can't compare offset-naive and offset-aware datetimes".to_owned(),
            });
        }
        let offset_of = |value: &Self| {
            value.utc_offset().ok_or_else(|| RangeError::ComparisonFailure {
                reason: format!("no unambiguous UTC offset for {value}"),
            })
        };
        let utc = |value: &Self, offset: i32| {
            value.local_micros() - i128::from(offset) * i128::from(MICROS_PER_SECOND)
        };
        Ok(utc(self, offset_of(self)?) - utc(other, offset_of(other)?))
    }

    /// Orders two values using the same rules as [`Self::micros_since`].
    ///
    /// # Errors
    /// Returns `RangeError::ComparisonFailure` if the values cannot be ordered.
    pub fn try_cmp(&self, other: &Self) -> Result<Ordering, RangeError> {
        Ok(self.micros_since(other)?.cmp(&0))
    }
}

impl PartialEq for CivilDateTime {
    fn eq(&self, other: &Self) -> bool {
        (self.year, self.month, self.day, self.hour, self.minute, self.second, self.microsecond)
            == (other.year, other.month, other.day, other.hour, other.minute, other.second, other.microsecond)
            && tz::same_tag(self.timezone.as_ref(), other.timezone.as_ref())
    }
}

impl Eq for CivilDateTime {}

impl fmt::Display for CivilDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}{DATE_SEPARATOR}{:02}{DATE_SEPARATOR}{:02}{TIME_DESIGNATOR}{:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )?;
        if self.microsecond != 0 {
            write!(f, ".{:06}", self.microsecond)?;
        }
        if let Some(offset) = self.utc_offset().and_then(FixedOffset::east_opt) {
            write!(f, "{offset}")?;
        }
        if let Some(zone) = self.timezone.as_ref().and_then(|timezone| timezone.annotation()) {
            write!(f, "[{zone}]")?;
        }
        Ok(())
    }
}

impl TryFrom<NaiveDateTime> for CivilDateTime {
    type Error = DateTimeError;

    #[allow(clippy::cast_possible_truncation)]
    fn try_from(value: NaiveDateTime) -> Result<Self, Self::Error> {
        // Leap seconds surface as a nanosecond value past one second.
        let microsecond = value.nanosecond() / 1_000;
        if microsecond > MAX_MICROSECOND {
            return Err(DateTimeError::InvalidTime {
                hour: value.hour(),
                minute: value.minute(),
                second: value.second(),
                microsecond,
            });
        }
        // chrono keeps month in 1..=12, day in 1..=31 and time fields below 60.
        Self::new(
            value.year(),
            value.month() as u8,
            value.day() as u8,
            value.hour() as u8,
            value.minute() as u8,
            value.second() as u8,
            microsecond,
        )
    }
}

impl FromStr for CivilDateTime {
    type Err = DateTimeError;

    /// Parses ISO 8601 / RFC 3339 timestamps, optionally followed by an IANA
    /// zone in brackets (`2024-07-01T12:00:00+02:00[Europe/Berlin]`).
    ///
    /// A trailing offset (`Z`, `+05:30`) attaches a fixed-offset timezone tag;
    /// a bracketed zone attaches that zone instead, and any offset given with
    /// it must agree with the zone.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DateTimeError::EmptyInput);
        }

        let Some((body, zone)) = trimmed.strip_suffix(']').and_then(|rest| rest.rsplit_once('[')) else {
            return parse_timestamp(trimmed);
        };
        let zone: chrono_tz::Tz = zone
            .parse()
            .map_err(|_| DateTimeError::UnknownTimeZone(zone.to_owned()))?;

        let value = parse_timestamp(body)?;
        let stated = value.utc_offset();
        let value = value.with_timezone(Some(Arc::new(zone)));
        if stated.is_some_and(|stated| value.utc_offset().is_some_and(|offset| offset != stated)) {
            return Err(DateTimeError::InvalidFormat(trimmed.to_owned()));
        }
        Ok(value)
    }
}

fn parse_timestamp(s: &str) -> Result<CivilDateTime, DateTimeError> {
    if let Ok(aware) = DateTime::<FixedOffset>::parse_from_rfc3339(s) {
        let timezone: TimeZoneRef = Arc::new(*aware.offset());
        return Ok(CivilDateTime::try_from(aware.naive_local())?.with_timezone(Some(timezone)));
    }

    let naive = s
        .parse::<NaiveDateTime>()
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d").map(|date| date.and_time(NaiveTime::MIN)))
        .map_err(|_| DateTimeError::InvalidFormat(s.to_owned()))?;
    CivilDateTime::try_from(naive)
}

impl serde::Serialize for CivilDateTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let text = self.to_string();
        // Tags outside chrono and chrono-tz cannot be read back.
        if let Some(timezone) = &self.timezone {
            if text.parse::<Self>().ok().as_ref() != Some(self) {
                return Err(serde::ser::Error::custom(format!(
                    "timezone {} has no string form",
                    timezone.name()
                )));
            }
        }
        serializer.serialize_str(&text)
    }
}

impl<'de> serde::Deserialize<'de> for CivilDateTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
