//! Calendar-date classification for due dates.
//!
//! Every predicate works on whole calendar days: time-of-day never matters,
//! and a date equal to `today` is never in the past. Raw strings go through
//! [`parse_due_date`] first, so malformed input is a [`DateParseError`]
//! rather than a silently wrong answer.

use chrono::{DateTime, Local, NaiveDate};

use crate::error::ErrorCode;

/// Wire format for due dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Failure to read a calendar date from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateParseError {
    #[error("date is empty")]
    Empty,
    #[error("invalid date '{0}': expected YYYY-MM-DD or an RFC 3339 timestamp")]
    Malformed(String),
}

impl DateParseError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Empty | Self::Malformed(_) => ErrorCode::InvalidDate,
        }
    }
}

/// Parse a due date.
///
/// Accepts `YYYY-MM-DD`, or an RFC 3339 timestamp whose calendar date (in
/// its own offset) is kept.
///
/// # Errors
///
/// Returns [`DateParseError::Empty`] for blank input and
/// [`DateParseError::Malformed`] for anything else that is not a date.
pub fn parse_due_date(raw: &str) -> Result<NaiveDate, DateParseError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(DateParseError::Empty);
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, DATE_FORMAT) {
        return Ok(date);
    }

    DateTime::parse_from_rfc3339(text)
        .map(|ts| ts.date_naive())
        .map_err(|_| DateParseError::Malformed(text.to_string()))
}

/// Source of "today" for every date predicate.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// The local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to one date, for tests and `--today` overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[must_use]
pub fn is_today(date: NaiveDate, today: NaiveDate) -> bool {
    date == today
}

#[must_use]
pub fn is_tomorrow(date: NaiveDate, today: NaiveDate) -> bool {
    today.succ_opt() == Some(date)
}

/// True when `date` is strictly before `today`.
#[must_use]
pub fn is_past(date: NaiveDate, today: NaiveDate) -> bool {
    date < today
}

/// Signed whole days from `today` to `date`; negative for past dates.
#[must_use]
pub fn days_until(date: NaiveDate, today: NaiveDate) -> i64 {
    (date - today).num_days()
}

/// Serde adapter for `Option<NaiveDate>` fields carrying due dates.
///
/// Missing, `null`, and blank strings read as `None`; anything else must
/// parse with [`parse_due_date`].
pub mod serde_due_date {
    use super::{DATE_FORMAT, parse_due_date};
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => serializer.serialize_str(&date.format(DATE_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => parse_due_date(text)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
