//! Calendar-aware difference between two Gregorian dates.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// The difference between two dates, in several decompositions.
///
/// `weeks`/`days_after_weeks` is a plain remainder split of `days`; it is a
/// second view of the same day count and is not reconciled against the
/// year/month decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateDiff {
    /// Absolute day count between the two dates.
    pub days: i64,
    pub years: i32,
    pub months: i32,
    /// Days left over after the year/month decomposition.
    pub remaining_days: i64,
    pub weeks: i64,
    /// Days left over after full weeks.
    pub days_after_weeks: i64,
}

/// Compute the difference between two dates. Argument order does not matter;
/// the decomposition always runs from the earlier date to the later one.
pub fn diff(a: NaiveDate, b: NaiveDate) -> DateDiff {
    let days = (b - a).num_days().abs();
    let (earlier, later) = if a <= b { (a, b) } else { (b, a) };

    let mut total_months = (later.year() - earlier.year()) * 12 + later.month() as i32
        - earlier.month() as i32;
    let mut anchored = add_months(earlier, total_months);
    if anchored > later {
        total_months -= 1;
        anchored = add_months(earlier, total_months);
    }
    let remaining_days = (later - anchored).num_days();

    DateDiff {
        days,
        years: total_months / 12,
        months: total_months % 12,
        remaining_days,
        weeks: days / 7,
        days_after_weeks: days % 7,
    }
}

/// Advance a date by a (possibly negative) number of months, preserving the
/// day-of-month where possible and clipping at the end of the target month.
pub(crate) fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let total = date.year() * 12 + date.month() as i32 - 1 + months;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month));
    // Always valid: day is clipped to the month length.
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(date)
}

/// Number of days in a Gregorian month.
pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 {
                29
            } else {
                28
            }
        }
        _ => 30,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_diff_symmetric_in_magnitude() {
        let a = d(2024, 1, 1);
        let b = d(2024, 3, 15);
        assert_eq!(diff(a, b).days, diff(b, a).days);
        assert_eq!(diff(a, b), diff(b, a));
    }

    #[test]
    fn test_diff_month_end_clipping() {
        // Jan 31 -> Mar 1: one clipped month (Jan 31 + 1m = Feb 29) plus one day.
        let r = diff(d(2024, 1, 31), d(2024, 3, 1));
        assert_eq!(r.years, 0);
        assert_eq!(r.months, 1);
        assert_eq!(r.remaining_days, 1);
        assert_eq!(r.days, 30);
    }

    #[test]
    fn test_diff_exact_years() {
        let r = diff(d(2020, 6, 15), d(2023, 6, 15));
        assert_eq!(r.years, 3);
        assert_eq!(r.months, 0);
        assert_eq!(r.remaining_days, 0);
    }

    #[test]
    fn test_diff_month_borrow() {
        // Day-of-month of the later date is smaller, so a month is borrowed.
        let r = diff(d(2024, 1, 20), d(2024, 3, 10));
        assert_eq!(r.years, 0);
        assert_eq!(r.months, 1);
        assert_eq!(r.remaining_days, 19);
    }

    #[test]
    fn test_diff_week_split_is_independent() {
        let r = diff(d(2024, 1, 1), d(2024, 1, 18));
        assert_eq!(r.days, 17);
        assert_eq!(r.weeks, 2);
        assert_eq!(r.days_after_weeks, 3);
    }

    #[test]
    fn test_diff_same_date() {
        let r = diff(d(2024, 5, 5), d(2024, 5, 5));
        assert_eq!(r.days, 0);
        assert_eq!(r.years, 0);
        assert_eq!(r.months, 0);
        assert_eq!(r.remaining_days, 0);
        assert_eq!(r.weeks, 0);
        assert_eq!(r.days_after_weeks, 0);
    }

    #[test]
    fn test_add_months_negative() {
        assert_eq!(add_months(d(2024, 3, 31), -1), d(2024, 2, 29));
        assert_eq!(add_months(d(2024, 1, 15), -2), d(2023, 11, 15));
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2100, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(2024, 4), 30);
        assert_eq!(days_in_month(2024, 12), 31);
    }
}
