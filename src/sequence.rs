//! Lazy, pull-based range producers.

use std::{cmp::Ordering, iter::FusedIterator, mem};

use crate::{
    CivilDateTime, DEFAULT_FORMAT, Formatter, RangeError, StepTriple, StrftimeFormatter, advance, tz,
};

#[derive(Debug, Clone)]
enum State {
    Ready(CivilDateTime),
    /// An error to report on the next pull before the sequence ends.
    Failed(RangeError),
    Exhausted,
}

/// Cursor shared by both lazy producers.
#[derive(Debug, Clone)]
struct Cursor {
    state: State,
    end:   CivilDateTime,
    step:  StepTriple,
}

impl Cursor {
    fn new(start: CivilDateTime, end: CivilDateTime, step: StepTriple) -> Result<Self, RangeError> {
        if !step.is_advancing() {
            return Err(RangeError::NonAdvancingStep { step });
        }
        tracing::debug!(%start, %end, %step, "starting lazy range");
        Ok(Self {
            state: State::Ready(start),
            end,
            step,
        })
    }

    /// Yields the cursor value if it does not pass `end`, moving the cursor on.
    fn pull(&mut self) -> Option<Result<CivilDateTime, RangeError>> {
        let current = match mem::replace(&mut self.state, State::Exhausted) {
            State::Ready(current) => current,
            State::Failed(err) => return Some(Err(err)),
            State::Exhausted => return None,
        };

        match current.try_cmp(&self.end) {
            Err(err) => {
                tracing::debug!(%current, %err, "range end comparison failed");
                Some(Err(err))
            },
            Ok(Ordering::Greater) => None,
            Ok(Ordering::Less | Ordering::Equal) => {
                match advance(&current, &self.step) {
                    Ok(next) => self.state = State::Ready(next),
                    // Compared as wall clocks, an unrepresentable successor lies past any end.
                    Err(err) if tz::same_tag(current.timezone(), self.end.timezone()) => {
                        tracing::debug!(%current, %err, "range stops at calendar limit");
                    },
                    Err(err) => {
                        tracing::debug!(%current, %err, "range overflowed before reaching its end");
                        self.state = State::Failed(err);
                    },
                }
                Some(Ok(current))
            },
        }
    }
}

/// Lazily yields every timestamp from `start` to `end` (inclusive).
///
/// Each call to `next` compares the cursor with `end` before advancing it, so
/// the sequence is single-pass and never does work the caller did not ask
/// for. Every element carries the timezone tag of `start`.
#[derive(Debug, Clone)]
pub struct DateTimeSequence {
    cursor: Cursor,
}

impl DateTimeSequence {
    /// # Errors
    /// Returns `RangeError::NonAdvancingStep` if the step's total duration is
    /// zero or negative, since such a sequence would never reach its end.
    pub fn new(
        start: CivilDateTime,
        end: CivilDateTime,
        step: impl Into<StepTriple>,
    ) -> Result<Self, RangeError> {
        Ok(Self {
            cursor: Cursor::new(start, end, step.into())?,
        })
    }
}

impl Iterator for DateTimeSequence {
    type Item = Result<CivilDateTime, RangeError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.pull()
    }
}

impl FusedIterator for DateTimeSequence {}

/// Lazily yields every timestamp of a range rendered through a pattern.
///
/// The cursor moves on before the element is formatted: a format failure is
/// reported for that element only and the following call continues with the
/// next one.
#[derive(Debug, Clone)]
pub struct FormattedSequence<F = StrftimeFormatter> {
    cursor:    Cursor,
    pattern:   String,
    formatter: F,
}

impl FormattedSequence {
    /// Formats with [`StrftimeFormatter`].
    ///
    /// # Errors
    /// Returns `RangeError::NonAdvancingStep` if the step's total duration is
    /// zero or negative.
    pub fn new(
        start: CivilDateTime,
        end: CivilDateTime,
        step: impl Into<StepTriple>,
        pattern: impl Into<String>,
    ) -> Result<Self, RangeError> {
        Self::with_formatter(start, end, step, pattern, StrftimeFormatter)
    }

    /// Formats with [`DEFAULT_FORMAT`].
    ///
    /// # Errors
    /// See [`Self::new`].
    pub fn with_default_format(
        start: CivilDateTime,
        end: CivilDateTime,
        step: impl Into<StepTriple>,
    ) -> Result<Self, RangeError> {
        Self::new(start, end, step, DEFAULT_FORMAT)
    }
}

impl<F: Formatter> FormattedSequence<F> {
    /// # Errors
    /// See [`FormattedSequence::new`].
    pub fn with_formatter(
        start: CivilDateTime,
        end: CivilDateTime,
        step: impl Into<StepTriple>,
        pattern: impl Into<String>,
        formatter: F,
    ) -> Result<Self, RangeError> {
        Ok(Self {
            cursor: Cursor::new(start, end, step.into())?,
            pattern: pattern.into(),
            formatter,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl<F: Formatter> Iterator for FormattedSequence<F> {
    type Item = Result<String, RangeError>;

    fn next(&mut self) -> Option<Self::Item> {
        let value = match self.cursor.pull()? {
            Ok(value) => value,
            Err(err) => return Some(Err(err)),
        };
        Some(self.formatter.format(&value, &self.pattern).map_err(|err| {
            tracing::debug!(%value, %err, "element could not be formatted");
            err.into()
        }))
    }
}

impl<F: Formatter> FusedIterator for FormattedSequence<F> {}
