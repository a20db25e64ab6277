//! Rendering of produced values through a caller-supplied pattern.

use std::fmt::Write as _;

use chrono::{
    FixedOffset, TimeZone,
    format::{Item, StrftimeItems},
};

use crate::CivilDateTime;

/// Error returned when a value cannot be rendered with a pattern.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// The pattern contains a directive the formatter does not understand.
    #[error("Invalid format pattern: {pattern:?}")]
    InvalidPattern { pattern: String },

    /// The pattern is valid but cannot be applied to this value.
    #[error("Cannot format {value} with {pattern:?}: {reason}")]
    Unformattable {
        value:   String,
        pattern: String,
        reason:  &'static str,
    },
}

/// External formatter collaborator.
///
/// Every call returns a freshly allocated string.
pub trait Formatter {
    /// Renders `value` according to `pattern`.
    ///
    /// # Errors
    /// Returns `FormatError` if the pattern is invalid or does not apply to `value`.
    fn format(&self, value: &CivilDateTime, pattern: &str) -> Result<String, FormatError>;
}

/// `strftime`-style formatter backed by chrono.
///
/// Values carrying a timezone tag with a known offset are formatted as
/// offset-aware, so `%z` and `%:z` render that offset. Offset directives on
/// naive values fail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StrftimeFormatter;

impl Formatter for StrftimeFormatter {
    fn format(&self, value: &CivilDateTime, pattern: &str) -> Result<String, FormatError> {
        let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
        if items.iter().any(|item| matches!(item, Item::Error)) {
            return Err(FormatError::InvalidPattern {
                pattern: pattern.to_owned(),
            });
        }

        let unformattable = |reason| FormatError::Unformattable {
            value: value.to_string(),
            pattern: pattern.to_owned(),
            reason,
        };

        let naive = value.to_naive().ok_or_else(|| unformattable("outside chrono's range"))?;
        let mut out = String::new();
        let written = match value.utc_offset() {
            Some(seconds) => {
                let aware = FixedOffset::east_opt(seconds)
                    .and_then(|offset| offset.from_local_datetime(&naive).single())
                    .ok_or_else(|| unformattable("offset out of range"))?;
                write!(out, "{}", aware.format_with_items(items.iter()))
            },
            None => write!(out, "{}", naive.format_with_items(items.iter())),
        };
        written.map_err(|_| unformattable("directive needs data the value does not carry"))?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::tz::TimeZoneRef;

    fn value() -> CivilDateTime {
        CivilDateTime::new(2024, 3, 5, 7, 8, 9, 12_345).unwrap()
    }

    #[test]
    fn test_format_common_patterns() {
        struct TestCase {
            pattern:  &'static str,
            expected: &'static str,
        }

        let cases = [
            TestCase {
                pattern:  "%Y-%m-%d %H:%M:%S",
                expected: "2024-03-05 07:08:09",
            },
            TestCase {
                pattern:  "%Y",
                expected: "2024",
            },
            TestCase {
                pattern:  "%d/%m/%y",
                expected: "05/03/24",
            },
            TestCase {
                pattern:  "%H:%M:%S%.6f",
                expected: "07:08:09.012345",
            },
            TestCase {
                pattern:  "%j",
                expected: "065",
            },
            TestCase {
                pattern:  "",
                expected: "",
            },
        ];

        for case in &cases {
            assert_eq!(
                StrftimeFormatter.format(&value(), case.pattern).unwrap(),
                case.expected,
                "pattern {:?}",
                case.pattern
            );
        }
    }

    #[test]
    fn test_invalid_pattern() {
        let result = StrftimeFormatter.format(&value(), "%Y-%Q");
        assert!(matches!(result, Err(FormatError::InvalidPattern { .. })));
    }

    #[test]
    fn test_offset_directive_on_naive_value_fails() {
        let result = StrftimeFormatter.format(&value(), "%Y %z");
        assert!(matches!(result, Err(FormatError::Unformattable { .. })));
    }

    #[test]
    fn test_offset_directive_on_tagged_value() {
        let tz: TimeZoneRef = Arc::new(FixedOffset::east_opt(-5 * 3600).unwrap());
        let tagged = value().with_timezone(Some(tz));
        assert_eq!(StrftimeFormatter.format(&tagged, "%H:%M %z").unwrap(), "07:08 -0500");
    }

    #[test]
    fn test_error_display() {
        let err = FormatError::InvalidPattern {
            pattern: "%Q".to_owned(),
        };
        assert_eq!(err.to_string(), r#"Invalid format pattern: "%Q""#);
    }
}
