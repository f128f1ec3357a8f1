//! Temporal expression extraction from free text.
//!
//! Finds one concrete Gregorian date in a query, trying six strategies in a
//! fixed order; the first one that produces a valid date wins:
//!
//! 1. explicit numeric date `YYYY-M-D` (also `/`, `.`, space separators);
//! 2. numeric day + spelled-out month + optional year ("15 июля", "Dec 12 2023");
//! 3. relative offsets in Russian, English, and Hebrew ("через 3 дня",
//!    "2 weeks ago", "בעוד 3 ימים");
//! 4. fixed day-words (today/yesterday/tomorrow and the ±2 forms);
//! 5. bare "через N" / "in N" defaulting to days;
//! 6. a lenient multilingual fallback with a prefer-future bias.
//!
//! Each strategy is an independent matcher returning `Option<NaiveDate>`;
//! invalid calendar values make a strategy report no match rather than
//! raising, so extraction falls through to the next one. A query where no
//! strategy succeeds yields `None` — callers treat that as "no date
//! recognized", not as an error.

use std::sync::LazyLock;

use chrono::{Datelike, Local, NaiveDate};
use regex::Regex;

use super::months::month_number;
use super::types::{Direction, RelativeExpression, TimeUnit};

/// Extractor for a single date mentioned in a query.
pub struct DateExtractor {
    /// The reference "now" against which relative expressions resolve.
    anchor: NaiveDate,
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl DateExtractor {
    /// Create an extractor anchored to today.
    pub fn new() -> Self {
        Self {
            anchor: Local::now().date_naive(),
        }
    }

    /// Create an extractor with a fixed anchor date.
    pub fn with_anchor(anchor: NaiveDate) -> Self {
        Self { anchor }
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    /// All explicit `YYYY-M-D` dates in the query, in order of appearance.
    /// Invalid calendar values are skipped.
    pub fn explicit_dates(query: &str) -> Vec<NaiveDate> {
        EXPLICIT_DATE_RE
            .captures_iter(query)
            .filter_map(|cap| {
                let y = cap[1].parse::<i32>().ok()?;
                let m = cap[2].parse::<u32>().ok()?;
                let d = cap[3].parse::<u32>().ok()?;
                NaiveDate::from_ymd_opt(y, m, d)
            })
            .collect()
    }

    /// Extract a date from the query, or `None` when nothing matched.
    pub fn extract(&self, query: &str) -> Option<NaiveDate> {
        let lower = query.to_lowercase();
        self.explicit_date(&lower)
            .or_else(|| self.day_with_month_name(&lower))
            .or_else(|| self.relative_offset(&lower).map(|r| r.resolve(self.anchor)))
            .or_else(|| self.fixed_day_word(&lower))
            .or_else(|| self.bare_offset(&lower))
            .or_else(|| self.fallback(&lower))
    }

    // ------------------------------------------------------------------
    // Strategy 1: explicit numeric date with year
    // ------------------------------------------------------------------

    fn explicit_date(&self, query: &str) -> Option<NaiveDate> {
        for cap in EXPLICIT_DATE_RE.captures_iter(query) {
            if let (Ok(y), Ok(m), Ok(d)) = (
                cap[1].parse::<i32>(),
                cap[2].parse::<u32>(),
                cap[3].parse::<u32>(),
            ) {
                if let Some(date) = NaiveDate::from_ymd_opt(y, m, d) {
                    return Some(date);
                }
            }
        }
        None
    }

    // ------------------------------------------------------------------
    // Strategy 2: day + spelled-out month, optional year
    // ------------------------------------------------------------------

    fn day_with_month_name(&self, query: &str) -> Option<NaiveDate> {
        for cap in DAY_MONTH_RE.captures_iter(query) {
            let Some(month) = month_number(&cap[2]) else {
                continue;
            };
            let Ok(day) = cap[1].parse::<u32>() else {
                continue;
            };
            let year = cap
                .get(3)
                .and_then(|m| m.as_str().parse::<i32>().ok())
                .unwrap_or_else(|| self.anchor.year());
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                return Some(date);
            }
        }
        None
    }

    // ------------------------------------------------------------------
    // Strategy 3: relative offsets, three languages
    // ------------------------------------------------------------------

    /// Find a relative offset such as "через 3 дня" or "2 weeks ago".
    pub fn relative_offset(&self, query: &str) -> Option<RelativeExpression> {
        let lower = query.to_lowercase();
        for (pattern, unit, direction) in RELATIVE_PATTERNS.iter() {
            if let Some(cap) = pattern.captures(&lower) {
                if let Ok(magnitude) = cap[1].parse::<u32>() {
                    return Some(RelativeExpression {
                        magnitude,
                        unit: *unit,
                        direction: *direction,
                    });
                }
            }
        }
        None
    }

    // ------------------------------------------------------------------
    // Strategy 4: fixed day-words
    // ------------------------------------------------------------------

    fn fixed_day_word(&self, query: &str) -> Option<NaiveDate> {
        // Longer phrases come first so "послезавтра" is not read as "завтра".
        for (phrase, offset) in FIXED_DAY_WORDS {
            if query.contains(phrase) {
                return Some(self.anchor + chrono::Duration::days(*offset));
            }
        }
        None
    }

    // ------------------------------------------------------------------
    // Strategy 5: bare "in N" without a unit
    // ------------------------------------------------------------------

    fn bare_offset(&self, query: &str) -> Option<NaiveDate> {
        let cap = BARE_OFFSET_RE.captures(query)?;
        // A unit word anywhere in the query means this is not a day count
        // ("in 2 weeks" must not become "in 2 days").
        if UNIT_WORDS.iter().any(|w| query.contains(w)) {
            return None;
        }
        let days = cap[1].parse::<i64>().ok()?;
        Some(self.anchor + chrono::Duration::days(days))
    }

    // ------------------------------------------------------------------
    // Strategy 6: lenient fallback with prefer-future bias
    // ------------------------------------------------------------------

    fn fallback(&self, query: &str) -> Option<NaiveDate> {
        // Month-name first: "July 15", "января 5", optionally with a year.
        for cap in MONTH_FIRST_RE.captures_iter(query) {
            let Some(month) = month_number(&cap[1]) else {
                continue;
            };
            let Ok(day) = cap[2].parse::<u32>() else {
                continue;
            };
            if let Some(date) = self.resolve_yearless(month, day, cap.get(3)) {
                return Some(date);
            }
        }

        // Numeric day.month, European order, optionally with a year.
        for cap in NUMERIC_DM_RE.captures_iter(query) {
            let (Ok(day), Ok(month)) = (cap[1].parse::<u32>(), cap[2].parse::<u32>()) else {
                continue;
            };
            if month > 12 {
                continue;
            }
            if let Some(date) = self.resolve_yearless(month, day, cap.get(3)) {
                return Some(date);
            }
        }

        None
    }

    fn resolve_yearless(
        &self,
        month: u32,
        day: u32,
        year: Option<regex::Match<'_>>,
    ) -> Option<NaiveDate> {
        match year.and_then(|m| m.as_str().parse::<i32>().ok()) {
            Some(y) => NaiveDate::from_ymd_opt(y, month, day),
            None => self.prefer_future(month, day),
        }
    }

    /// Resolve month/day without a year: the next occurrence on or after the
    /// anchor, rolling into the following year when this year's has passed
    /// or does not exist (Feb 29).
    fn prefer_future(&self, month: u32, day: u32) -> Option<NaiveDate> {
        let this_year = NaiveDate::from_ymd_opt(self.anchor.year(), month, day);
        match this_year {
            Some(d) if d >= self.anchor => Some(d),
            _ => NaiveDate::from_ymd_opt(self.anchor.year() + 1, month, day).or(this_year),
        }
    }
}

// ============================================================================
// Patterns
// ============================================================================

// `\b` around digit groups plays the role of a negative lookaround: a digit
// run can neither start nor end inside a word boundary, so a 4-digit token
// never yields a 1-2 digit day match.
static EXPLICIT_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{4})[-/. ](\d{1,2})[-/. ](\d{1,2})\b").expect("Invalid regex")
});

static DAY_MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})[-/. ]?\s*([а-яёa-z]+)(?:\s+(\d{4})\b)?").expect("Invalid regex")
});

static MONTH_FIRST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([а-яёa-z]+)\.?\s+(\d{1,2})\b(?:,?\s+(\d{4})\b)?").expect("Invalid regex")
});

static NUMERIC_DM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})[./](\d{1,2})(?:[./](\d{4}))?\b").expect("Invalid regex")
});

static BARE_OFFSET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:через|спустя|in|בעוד)\s*(\d+)\b").expect("Invalid regex"));

/// Unit words that veto the bare-number-of-days default, in all three
/// supported languages.
const UNIT_WORDS: &[&str] = &[
    "week", "month", "year", "недел", "месяц", "год", "שבוע", "חודש", "שנה",
];

/// Fixed day-words across the three languages, longest-first within each
/// language, mapped to day offsets.
const FIXED_DAY_WORDS: &[(&str, i64)] = &[
    // Russian
    ("послезавтра", 2),
    ("позавчера", -2),
    ("вчера", -1),
    ("сегодня", 0),
    ("завтра", 1),
    // English
    ("day after tomorrow", 2),
    ("day before yesterday", -2),
    ("yesterday", -1),
    ("today", 0),
    ("tomorrow", 1),
    // Hebrew
    ("מחרתיים", 2),
    ("שלשום", -2),
    ("אתמול", -1),
    ("היום", 0),
    ("מחר", 1),
];

static RELATIVE_PATTERNS: LazyLock<Vec<(Regex, TimeUnit, Direction)>> = LazyLock::new(|| {
    let make = |p: &str| Regex::new(p).expect("Invalid regex");
    use Direction::{Future, Past};
    use TimeUnit::{Day, Month, Week, Year};
    vec![
        // Russian
        (
            make(r"(?:через|спустя)\s*(\d+)\s*(?:дня|дней|день|дн\b)"),
            Day,
            Future,
        ),
        (
            make(r"(\d+)\s*(?:дня|дней|день|дн\b)\s*(?:тому\s+)?назад"),
            Day,
            Past,
        ),
        (make(r"(?:через|спустя)\s*(\d+)\s*недел"), Week, Future),
        (
            make(r"(\d+)\s*недел[а-яё]*\s*(?:тому\s+)?назад"),
            Week,
            Past,
        ),
        (
            make(r"(?:через|спустя)\s*(\d+)\s*(?:месяц|мес\b)"),
            Month,
            Future,
        ),
        (
            make(r"(\d+)\s*(?:месяц[а-яё]*|мес\b)\s*(?:тому\s+)?назад"),
            Month,
            Past,
        ),
        (
            make(r"(?:через|спустя)\s*(\d+)\s*(?:год|лет)"),
            Year,
            Future,
        ),
        (
            make(r"(\d+)\s*(?:год[а-яё]*|лет)\s*(?:тому\s+)?назад"),
            Year,
            Past,
        ),
        // English
        (make(r"\bin\s+(\d+)\s+days?\b"), Day, Future),
        (make(r"\b(\d+)\s+days?\s+ago\b"), Day, Past),
        (make(r"\bin\s+(\d+)\s+weeks?\b"), Week, Future),
        (make(r"\b(\d+)\s+weeks?\s+ago\b"), Week, Past),
        (make(r"\bin\s+(\d+)\s+months?\b"), Month, Future),
        (make(r"\b(\d+)\s+months?\s+ago\b"), Month, Past),
        (make(r"\bin\s+(\d+)\s+years?\b"), Year, Future),
        (make(r"\b(\d+)\s+years?\s+ago\b"), Year, Past),
        // Hebrew
        (make(r"בעוד\s*(\d+)\s*(?:ימים|יום)"), Day, Future),
        (make(r"(\d+)\s*(?:ימים|יום)\s*(?:לפני|אחורה)"), Day, Past),
        (make(r"בעוד\s*(\d+)\s*(?:שבועות|שבוע)"), Week, Future),
        (
            make(r"(\d+)\s*(?:שבועות|שבוע)\s*(?:לפני|אחורה)"),
            Week,
            Past,
        ),
        (make(r"בעוד\s*(\d+)\s*(?:חודשים|חודש)"), Month, Future),
        (make(r"בעוד\s*(\d+)\s*(?:שנים|שנה)"), Year, Future),
    ]
});

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32) -> DateExtractor {
        DateExtractor::with_anchor(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_explicit_iso_date() {
        let ex = at(2024, 1, 1);
        assert_eq!(ex.extract("что было 2023-05-15?"), Some(d(2023, 5, 15)));
        assert_eq!(ex.extract("дата 2023.5.15"), Some(d(2023, 5, 15)));
        assert_eq!(ex.extract("дата 2023/05/15"), Some(d(2023, 5, 15)));
    }

    #[test]
    fn test_explicit_date_invalid_month_skipped() {
        let ex = at(2024, 1, 1);
        // Month 13 does not exist; no other strategy applies either.
        assert_eq!(ex.extract("2024-13-05"), None);
    }

    #[test]
    fn test_day_with_month_name_defaults_to_anchor_year() {
        let ex = at(2024, 1, 1);
        assert_eq!(ex.extract("15 июля какой день?"), Some(d(2024, 7, 15)));
        assert_eq!(ex.extract("12 декабря"), Some(d(2024, 12, 12)));
    }

    #[test]
    fn test_day_with_month_name_explicit_year() {
        let ex = at(2024, 1, 1);
        assert_eq!(ex.extract("25 dec 2022"), Some(d(2022, 12, 25)));
        assert_eq!(ex.extract("7 марта 2021 года"), Some(d(2021, 3, 7)));
    }

    #[test]
    fn test_four_digit_token_is_not_a_day() {
        let ex = at(2024, 1, 1);
        // "2024" alone must not be read as day 20 of anything.
        assert_eq!(ex.extract("просто 2024 и ничего"), None);
    }

    #[test]
    fn test_relative_days_russian() {
        let ex = at(2024, 1, 1);
        assert_eq!(ex.extract("через 3 дня"), Some(d(2024, 1, 4)));
        assert_eq!(ex.extract("5 дней назад"), Some(d(2023, 12, 27)));
    }

    #[test]
    fn test_relative_weeks_and_months() {
        let ex = at(2024, 1, 10);
        assert_eq!(ex.extract("in 2 weeks"), Some(d(2024, 1, 24)));
        assert_eq!(ex.extract("2 weeks ago"), Some(d(2023, 12, 27)));
        assert_eq!(ex.extract("через 2 месяца"), Some(d(2024, 3, 10)));
        assert_eq!(ex.extract("in 1 year"), Some(d(2025, 1, 10)));
    }

    #[test]
    fn test_relative_month_clips() {
        let ex = at(2024, 1, 31);
        assert_eq!(ex.extract("через 1 месяц"), Some(d(2024, 2, 29)));
    }

    #[test]
    fn test_relative_hebrew() {
        let ex = at(2024, 1, 1);
        assert_eq!(ex.extract("בעוד 3 ימים"), Some(d(2024, 1, 4)));
        assert_eq!(ex.extract("בעוד 2 שבועות"), Some(d(2024, 1, 15)));
    }

    #[test]
    fn test_fixed_day_words() {
        let ex = at(2024, 6, 15);
        assert_eq!(ex.extract("какой сегодня день"), Some(d(2024, 6, 15)));
        assert_eq!(ex.extract("что будет завтра"), Some(d(2024, 6, 16)));
        assert_eq!(ex.extract("а послезавтра?"), Some(d(2024, 6, 17)));
        assert_eq!(ex.extract("что было позавчера"), Some(d(2024, 6, 13)));
        assert_eq!(ex.extract("yesterday"), Some(d(2024, 6, 14)));
        assert_eq!(ex.extract("מחר"), Some(d(2024, 6, 16)));
    }

    #[test]
    fn test_bare_offset_defaults_to_days() {
        let ex = at(2024, 1, 1);
        assert_eq!(ex.extract("через 5"), Some(d(2024, 1, 6)));
        assert_eq!(ex.extract("in 10"), Some(d(2024, 1, 11)));
    }

    #[test]
    fn test_bare_offset_vetoed_by_unit_word() {
        let ex = at(2024, 1, 1);
        // The unit word elsewhere in the query vetoes the days default.
        assert_eq!(ex.bare_offset("через 2 ближайшие недели"), None);
    }

    #[test]
    fn test_fallback_month_first_prefers_future() {
        let ex = at(2024, 8, 1);
        assert_eq!(ex.extract("july 15"), Some(d(2025, 7, 15)));
        let ex = at(2024, 6, 1);
        assert_eq!(ex.extract("july 15"), Some(d(2024, 7, 15)));
    }

    #[test]
    fn test_fallback_numeric_day_month() {
        let ex = at(2024, 1, 1);
        assert_eq!(ex.extract("напомни 15.07"), Some(d(2024, 7, 15)));
    }

    #[test]
    fn test_no_date_recognized() {
        let ex = at(2024, 1, 1);
        assert_eq!(ex.extract("расскажи о субботних законах"), None);
        assert_eq!(ex.extract(""), None);
    }

    #[test]
    fn test_relative_expression_exposed() {
        let ex = at(2024, 1, 1);
        let expr = ex.relative_offset("через 3 недели").unwrap();
        assert_eq!(expr.magnitude, 3);
        assert_eq!(expr.unit, TimeUnit::Week);
        assert_eq!(expr.direction, Direction::Future);
    }
}
