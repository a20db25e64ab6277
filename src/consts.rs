/// Minimum valid year (inclusive)
pub const MIN_YEAR: i32 = 1;

/// Maximum valid year (inclusive)
pub const MAX_YEAR: i32 = 9999;

/// Maximum valid month (December)
pub const MAX_MONTH: u8 = 12;

/// First day of month, used for lower bounds
pub const MIN_DAY: u8 = 1;

/// Month number for February
pub const FEBRUARY: u8 = 2;

/// Days in February for leap years
pub const FEBRUARY_DAYS_LEAP: u8 = 29;

/// Maximum days in each month (index 0 is unused, months are 1-indexed)
/// February shows 28 days (non-leap year default)
pub const DAYS_IN_MONTH: [u8; 13] = [
    0,  // index 0 unused (months are 1-indexed)
    31, // January
    28, // February (non-leap, adjusted by is_leap_year check)
    31, // March
    30, // April
    31, // May
    30, // June
    31, // July
    31, // August
    30, // September
    31, // October
    30, // November
    31, // December
];

/// Largest valid hour of day
pub const MAX_HOUR: u8 = 23;
/// Largest valid minute of hour
pub const MAX_MINUTE: u8 = 59;
/// Largest valid second of minute (leap seconds are not representable)
pub const MAX_SECOND: u8 = 59;
/// Largest valid microsecond of second
pub const MAX_MICROSECOND: u32 = 999_999;

pub const MICROS_PER_SECOND: i64 = 1_000_000;
pub const SECONDS_PER_MINUTE: i64 = 60;
pub const SECONDS_PER_HOUR: i64 = 3_600;
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Leap year occurs every 4 years
pub(crate) const LEAP_YEAR_CYCLE: i32 = 4;
/// Century years are not leap years unless...
pub(crate) const CENTURY_CYCLE: i32 = 100;
/// ...they are divisible by 400 (Gregorian calendar correction)
pub(crate) const GREGORIAN_CYCLE: i32 = 400;

/// Days in one full 400-year Gregorian cycle
pub(crate) const DAYS_PER_ERA: i64 = 146_097;
/// Day number of 0000-03-01 relative to 1970-01-01, the anchor of the
/// March-based year used by the day-count transform
pub(crate) const MARCH_EPOCH_SHIFT: i64 = 719_468;

/// Pattern used when a formatted range is built without an explicit one
pub const DEFAULT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Date component separator (ISO 8601 format)
pub const DATE_SEPARATOR: char = '-';
/// Date/time separator (ISO 8601 format)
pub const TIME_DESIGNATOR: char = 'T';
