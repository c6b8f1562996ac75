//! Calendar date utilities
//!
//! Inspection sheets are filled by hand and come back from the spreadsheet in
//! whatever shape the cell happened to be in. Parsing here never fails: text
//! that is not a recognised date is kept verbatim as [`RecordDate::Unknown`].

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use tracing::debug;

/// Date-only formats accepted from forms and sheet cells
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

/// Date-time formats (without offset) whose time component is dropped
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Current calendar date in the local timezone
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// A calendar date as recorded on an inspection, or the raw text when unparseable
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordDate {
    Known(NaiveDate),
    Unknown(String),
}

impl RecordDate {
    /// Parse a date cell, truncating any time-of-day component
    ///
    /// Timestamps carrying an offset are read as local calendar dates, the
    /// same timezone [`today`] uses.
    pub fn parse(raw: &str) -> Self {
        Self::parse_in(raw, &Local)
    }

    /// Parse a date cell, reading offset-bearing timestamps in `tz`
    pub fn parse_in<Tz: TimeZone>(raw: &str, tz: &Tz) -> Self {
        let trimmed = raw.trim();

        if let Some(date) = parse_calendar_date(trimmed, tz) {
            return RecordDate::Known(date);
        }

        if !trimmed.is_empty() {
            debug!(raw = %trimmed, "Unparseable date, keeping raw text");
        }
        RecordDate::Unknown(trimmed.to_string())
    }

    /// Parsed date, if any
    pub fn known(&self) -> Option<NaiveDate> {
        match self {
            RecordDate::Known(date) => Some(*date),
            RecordDate::Unknown(_) => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, RecordDate::Known(_))
    }

    /// Comparator for newest-first ordering
    ///
    /// Known dates sort descending; unknown dates sort after every known date
    /// and compare equal among themselves so a stable sort keeps their order.
    pub fn newest_first(a: &RecordDate, b: &RecordDate) -> Ordering {
        match (a, b) {
            (RecordDate::Known(a), RecordDate::Known(b)) => b.cmp(a),
            (RecordDate::Known(_), RecordDate::Unknown(_)) => Ordering::Less,
            (RecordDate::Unknown(_), RecordDate::Known(_)) => Ordering::Greater,
            (RecordDate::Unknown(_), RecordDate::Unknown(_)) => Ordering::Equal,
        }
    }
}

impl From<NaiveDate> for RecordDate {
    fn from(date: NaiveDate) -> Self {
        RecordDate::Known(date)
    }
}

impl fmt::Display for RecordDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordDate::Known(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            RecordDate::Unknown(raw) => f.write_str(raw),
        }
    }
}

impl Serialize for RecordDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn parse_calendar_date<Tz: TimeZone>(text: &str, tz: &Tz) -> Option<NaiveDate> {
    if text.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }

    // Spreadsheet exports serialise date cells as UTC midnight of the sheet's own day
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Some(timestamp.with_timezone(tz).date_naive());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|timestamp| timestamp.date())
}
