//! Temporal reasoning core.
//!
//! Everything calendar-related lives here:
//!
//! - **Bridge** ([`bridge`]): the only gateway to the external
//!   Gregorian↔Hebrew conversion and holiday-listing service. Validates
//!   shapes and normalizes month spellings; never does Hebrew calendar
//!   arithmetic itself.
//! - **Extraction** ([`extract`]): finds absolute dates, relative offsets,
//!   and fixed day-words in free text across Russian, English, and Hebrew.
//! - **Holidays** ([`holidays`]): canonical holiday names, multilingual
//!   alias matching, candidate-year search, days-until formatting.
//! - **Diff** ([`diff`]): calendar-aware difference between two dates with
//!   month-end clipping.
//!
//! The lookup tables in [`months`] and [`holidays`] are immutable and
//! process-wide; every other value is per-request and transient.

pub mod bridge;
pub mod diff;
pub mod extract;
pub mod holidays;
pub mod months;
pub mod types;

pub use bridge::{CalendarApi, HebcalClient, HolidayItem};
pub use diff::{diff, DateDiff};
pub use extract::DateExtractor;
pub use holidays::{
    candidate_years, days_until, format_days_until, match_holiday, plural_days, plural_weeks,
    ru_plural, year_selection, HolidayResolver, YearSelection, HOLIDAY_ALIASES,
};
pub use months::{
    find_hebrew_month, hebrew_month_from_russian, month_number, normalize_hebrew_month,
};
pub use types::{
    CalendarDate, Direction, HebrewDate, HebrewDateQuery, HolidayOccurrence, RelativeExpression,
    TimeUnit,
};
