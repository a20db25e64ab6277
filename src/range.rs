use serde::{Deserialize, Serialize};

use crate::{
    CivilDateTime, DEFAULT_FORMAT, DateTimeError, DateTimeSequence, FormatError, FormattedSequence,
    Formatter, StepTriple, StrftimeFormatter, advance, consts::MICROS_PER_SECOND,
};

/// Error type for range construction and iteration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    /// An input could not be turned into a timestamp or step.
    #[error(transparent)]
    InvalidArgumentType(#[from] DateTimeError),

    /// The step never moves forward, so a lazy sequence would not terminate.
    #[error("Step {step} does not advance time")]
    NonAdvancingStep { step: StepTriple },

    /// A single element could not be formatted.
    #[error(transparent)]
    FormatFailure(#[from] FormatError),

    /// An element could not be compared with the end of the range.
    #[error("Cannot compare with range end: {reason}")]
    ComparisonFailure { reason: String },

    /// Calendar arithmetic left the representable years.
    #[error("Calendar overflow: {reason}")]
    Overflow { reason: String },

    /// The eager element count cannot be materialized.
    #[error("Range of {count} elements is too large to materialize")]
    TooManyElements { count: u128 },
}

/// A fully specified range: inclusive bounds, step and output pattern.
///
/// Deserializes from configuration such as
/// `{"start": "2024-01-01T00:00:00", "end": "2024-01-02T00:00:00", "step": {"seconds": 3600}}`;
/// a missing `format` renders with [`DEFAULT_FORMAT`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeRequest {
    pub start:  CivilDateTime,
    pub end:    CivilDateTime,
    pub step:   StepTriple,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl RangeRequest {
    pub fn new(start: CivilDateTime, end: CivilDateTime, step: impl Into<StepTriple>) -> Self {
        Self {
            start,
            end,
            step: step.into(),
            format: None,
        }
    }

    /// Builds a request from textual timestamps.
    ///
    /// # Errors
    /// Returns `RangeError::InvalidArgumentType` if either bound is not a
    /// valid timestamp.
    pub fn parse(start: &str, end: &str, step: impl Into<StepTriple>) -> Result<Self, RangeError> {
        Ok(Self::new(start.parse()?, end.parse()?, step))
    }

    /// Sets the pattern used by the formatted producers.
    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// The configured pattern, or [`DEFAULT_FORMAT`].
    pub fn pattern(&self) -> &str {
        self.format.as_deref().unwrap_or(DEFAULT_FORMAT)
    }

    /// Eagerly materializes every timestamp of the range.
    ///
    /// # Errors
    /// See [`datetime_range`].
    pub fn datetimes(&self) -> Result<Vec<CivilDateTime>, RangeError> {
        build(self, |value| Ok(value.clone()))
    }

    /// Eagerly materializes every timestamp rendered with [`Self::pattern`].
    ///
    /// # Errors
    /// See [`strftime_range`].
    pub fn strings(&self) -> Result<Vec<String>, RangeError> {
        self.strings_with(&StrftimeFormatter)
    }

    /// Like [`Self::strings`] with a caller-supplied formatter.
    ///
    /// # Errors
    /// See [`strftime_range`].
    pub fn strings_with<F: Formatter>(&self, formatter: &F) -> Result<Vec<String>, RangeError> {
        let pattern = self.pattern();
        build(self, |value| Ok(formatter.format(value, pattern)?))
    }

    /// Lazy counterpart of [`Self::datetimes`].
    ///
    /// # Errors
    /// Returns `RangeError::NonAdvancingStep` if the step does not move forward.
    pub fn iter(&self) -> Result<DateTimeSequence, RangeError> {
        DateTimeSequence::new(self.start.clone(), self.end.clone(), self.step)
    }

    /// Lazy counterpart of [`Self::strings`].
    ///
    /// # Errors
    /// Returns `RangeError::NonAdvancingStep` if the step does not move forward.
    pub fn iter_formatted(&self) -> Result<FormattedSequence, RangeError> {
        FormattedSequence::new(self.start.clone(), self.end.clone(), self.step, self.pattern())
    }
}

/// Every timestamp from `start` to `end` (inclusive) in increments of `step`.
///
/// The element count is computed up front as
/// `floor(total_seconds / step_seconds) + 1` in floating point and the loop
/// never looks at `end` again. When the range length is an exact multiple of
/// a step that has no exact binary representation (e.g. 0.3 s by 0.1 s) the
/// division can round down and drop the final element that the lazy
/// [`DateTimeSequence`] would still yield.
///
/// Non-advancing steps and ranges with `end < start` produce an empty vector.
///
/// # Errors
/// Returns `RangeError::ComparisonFailure` if `start` and `end` cannot be
/// subtracted, `RangeError::TooManyElements` if the result cannot be
/// allocated, and `RangeError::Overflow` if a produced value would leave the
/// supported years.
pub fn datetime_range(
    start: &CivilDateTime,
    end: &CivilDateTime,
    step: impl Into<StepTriple>,
) -> Result<Vec<CivilDateTime>, RangeError> {
    RangeRequest::new(start.clone(), end.clone(), step).datetimes()
}

/// Every timestamp of [`datetime_range`] rendered with a strftime `pattern`.
///
/// # Errors
/// As [`datetime_range`], plus `RangeError::FormatFailure` for the first
/// element that cannot be rendered.
pub fn strftime_range(
    start: &CivilDateTime,
    end: &CivilDateTime,
    step: impl Into<StepTriple>,
    pattern: &str,
) -> Result<Vec<String>, RangeError> {
    RangeRequest::new(start.clone(), end.clone(), step)
        .with_format(pattern)
        .strings()
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn element_count(request: &RangeRequest) -> Result<usize, RangeError> {
    let step_seconds = request.step.total_seconds();
    if step_seconds <= 0.0 {
        return Ok(0);
    }
    let total_seconds = request.end.micros_since(&request.start)? as f64 / MICROS_PER_SECOND as f64;
    if total_seconds < 0.0 {
        return Ok(0);
    }
    // Both operands are positive and finite, so the cast saturates at worst.
    let count = ((total_seconds / step_seconds).floor() as u128).saturating_add(1);
    usize::try_from(count).map_err(|_| RangeError::TooManyElements { count })
}

fn build<T>(
    request: &RangeRequest,
    mut produce: impl FnMut(&CivilDateTime) -> Result<T, RangeError>,
) -> Result<Vec<T>, RangeError> {
    let count = element_count(request)?;
    tracing::debug!(
        start = %request.start,
        end = %request.end,
        step = %request.step,
        count,
        "materializing range"
    );

    let mut out = Vec::new();
    out.try_reserve_exact(count)
        .map_err(|_| RangeError::TooManyElements { count: count as u128 })?;

    let mut current = request.start.clone();
    for index in 0..count {
        out.push(produce(&current)?);
        // The value after the last element is never observed.
        if index + 1 < count {
            current = advance(&current, &request.step)?;
        }
    }
    Ok(out)
}
