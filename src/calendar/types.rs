//! Core data model for the temporal reasoning subsystem.
//!
//! All of these values are transient: they are built per request and dropped
//! once a response is produced. The only process-wide state in the calendar
//! subsystem is the set of immutable lookup tables in [`super::months`] and
//! [`super::holidays`].

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::diff::add_months;

// ============================================================================
// Calendar dates
// ============================================================================

/// A date in the Hebrew calendar.
///
/// `month` is one of the 14 canonical tokens produced by
/// [`super::months::normalize_hebrew_month`] (12 months plus the leap-year
/// Adar I / Adar II split).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HebrewDate {
    pub year: i32,
    pub month: String,
    pub day: u32,
}

impl std::fmt::Display for HebrewDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.day, self.month, self.year)
    }
}

/// A Hebrew date as supplied by a caller, before validation.
///
/// The bridge requires all three fields for a Hebrew→Gregorian conversion and
/// reports exactly which ones are missing; it never fills in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HebrewDateQuery {
    pub year: Option<i32>,
    pub month: Option<String>,
    pub day: Option<u32>,
}

impl From<HebrewDate> for HebrewDateQuery {
    fn from(d: HebrewDate) -> Self {
        Self {
            year: Some(d.year),
            month: Some(d.month),
            day: Some(d.day),
        }
    }
}

/// A single instant expressed in both calendars simultaneously.
///
/// Only the calendar bridge constructs these, from a service conversion —
/// the two sides are guaranteed to denote the same day because one was
/// obtained from the other, never computed locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDate {
    pub gregorian: NaiveDate,
    pub hebrew: HebrewDate,
    /// The service's rendered Hebrew-script label, e.g. "ט״ו בְּנִיסָן תשפ״ד".
    pub hebrew_label: String,
}

impl CalendarDate {
    /// Weekday of the instant, derived from the Gregorian side.
    pub fn weekday(&self) -> Weekday {
        self.gregorian.weekday()
    }
}

// ============================================================================
// Holidays
// ============================================================================

/// One occurrence of a holiday in a concrete year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayOccurrence {
    /// Canonical name keying the alias table, e.g. "песах".
    pub canonical: String,
    /// The title as reported by the calendar service.
    pub title: String,
    pub date: NaiveDate,
    /// Rendered Hebrew date label; empty when the conversion call degraded.
    pub hebrew_label: String,
    pub description: Option<String>,
    /// The candidate year this occurrence was found under.
    pub search_year: i32,
}

// ============================================================================
// Relative expressions
// ============================================================================

/// Unit of a relative date offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    Day,
    Week,
    Month,
    Year,
}

/// Direction of a relative date offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Past,
    Future,
}

/// A parsed relative offset such as "in 3 days" or "2 недели назад".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelativeExpression {
    pub magnitude: u32,
    pub unit: TimeUnit,
    pub direction: Direction,
}

impl RelativeExpression {
    /// Resolve the offset against an anchor date.
    ///
    /// Day and week offsets are fixed durations; month and year offsets
    /// advance the calendar preserving the day-of-month where possible and
    /// clipping at month end (Jan 31 + 1 month = Feb 28/29).
    pub fn resolve(&self, anchor: NaiveDate) -> NaiveDate {
        let n = i64::from(self.magnitude);
        let signed = match self.direction {
            Direction::Future => n,
            Direction::Past => -n,
        };
        match self.unit {
            TimeUnit::Day => anchor + chrono::Duration::days(signed),
            TimeUnit::Week => anchor + chrono::Duration::weeks(signed),
            TimeUnit::Month => add_months(anchor, signed as i32),
            TimeUnit::Year => add_months(anchor, signed as i32 * 12),
        }
    }
}
