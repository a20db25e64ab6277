//! Opaque timezone tags.
//!
//! The range engine never resolves offsets itself. A tag is carried from the
//! start of a range onto every produced value, and is only consulted when two
//! values have to be ordered or subtracted.

use std::{fmt, sync::Arc};

use chrono::{FixedOffset, NaiveDateTime, Offset, TimeZone};

/// Shared handle to a timezone tag.
pub type TimeZoneRef = Arc<dyn TimeZoneTag>;

/// Capability interface over a timezone implementation.
pub trait TimeZoneTag: fmt::Debug + Send + Sync {
    /// Stable identifier of the zone, e.g. `"+05:30"` or `"Europe/Berlin"`.
    fn name(&self) -> String;

    /// Offset from UTC in seconds for a wall-clock instant in this zone.
    ///
    /// Returns `None` when the zone cannot map the instant unambiguously.
    fn utc_offset(&self, local: &NaiveDateTime) -> Option<i32>;

    /// Two tags denoting the same zone compare wall clocks directly.
    fn same_zone(&self, other: &dyn TimeZoneTag) -> bool {
        self.name() == other.name()
    }

    /// Zone identifier written in brackets after the timestamp, e.g.
    /// `2024-07-01T12:00:00+02:00[Europe/Berlin]`.
    ///
    /// `None` when the numeric offset alone identifies the zone.
    fn annotation(&self) -> Option<String> {
        Some(self.name())
    }
}

impl TimeZoneTag for FixedOffset {
    fn name(&self) -> String {
        self.to_string()
    }

    fn utc_offset(&self, _local: &NaiveDateTime) -> Option<i32> {
        Some(self.local_minus_utc())
    }

    fn annotation(&self) -> Option<String> {
        None
    }
}

impl TimeZoneTag for chrono_tz::Tz {
    fn name(&self) -> String {
        chrono_tz::Tz::name(*self).to_owned()
    }

    fn utc_offset(&self, local: &NaiveDateTime) -> Option<i32> {
        self.offset_from_local_datetime(local)
            .single()
            .map(|offset| offset.fix().local_minus_utc())
    }
}

/// Whether two optional tags describe the same zone (or are both absent).
pub(crate) fn same_tag(a: Option<&TimeZoneRef>, b: Option<&TimeZoneRef>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => Arc::ptr_eq(a, b) || a.same_zone(b.as_ref()),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive(s: &str) -> NaiveDateTime {
        s.parse().unwrap()
    }

    #[test]
    fn test_fixed_offset_tag() {
        let tz = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        assert_eq!(TimeZoneTag::name(&tz), "+05:30");
        assert_eq!(tz.utc_offset(&naive("2024-01-01T00:00:00")), Some(19_800));
    }

    #[test]
    fn test_chrono_tz_tag_follows_dst() {
        let tz = chrono_tz::Europe::Berlin;
        assert_eq!(TimeZoneTag::name(&tz), "Europe/Berlin");
        assert_eq!(tz.utc_offset(&naive("2024-01-15T12:00:00")), Some(3600));
        assert_eq!(tz.utc_offset(&naive("2024-07-15T12:00:00")), Some(7200));
        // Skipped by the spring-forward transition.
        assert_eq!(tz.utc_offset(&naive("2024-03-31T02:30:00")), None);
    }

    #[test]
    fn test_same_tag() {
        let utc: TimeZoneRef = Arc::new(FixedOffset::east_opt(0).unwrap());
        let also_utc: TimeZoneRef = Arc::new(FixedOffset::east_opt(0).unwrap());
        let berlin: TimeZoneRef = Arc::new(chrono_tz::Europe::Berlin);

        assert!(same_tag(None, None));
        assert!(same_tag(Some(&utc), Some(&utc)));
        assert!(same_tag(Some(&utc), Some(&also_utc)));
        assert!(!same_tag(Some(&utc), Some(&berlin)));
        assert!(!same_tag(Some(&utc), None));
        assert!(!same_tag(None, Some(&berlin)));
    }
}
