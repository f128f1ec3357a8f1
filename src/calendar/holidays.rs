//! Holiday name resolution across candidate years.
//!
//! Maps multilingual holiday aliases to canonical names, searches one or
//! more candidate years through the calendar bridge, drops already-elapsed
//! occurrences, and formats "days until/since" durations with Russian
//! three-way pluralization.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use tracing::warn;

use super::bridge::CalendarApi;
use super::types::HolidayOccurrence;

// ============================================================================
// Alias table
// ============================================================================

/// Canonical holiday name → alias spellings, scanned in declared order; the
/// first canonical name with an alias hit wins and the scan short-circuits.
/// Aliases are lowercase and matched as substrings of the lowercased query.
pub const HOLIDAY_ALIASES: &[(&str, &[&str])] = &[
    (
        "песах",
        &[
            "песах", "пейсах", "пасха", "песаха", "песаху", "песахе", "passover", "pesach",
        ],
    ),
    (
        "шавуот",
        &[
            "шавуот", "шавуота", "шавуоту", "шавуоте", "шавуотом", "shavuot",
        ],
    ),
    (
        "рош ха-шана",
        &[
            "рош",
            "рош хашана",
            "рош ха шана",
            "рош а-шана",
            "рош ашана",
            "рош гашана",
            "новый год",
            "еврейский новый год",
            "rosh hashana",
            "rosh hashanah",
        ],
    ),
    (
        "йом киппур",
        &[
            "йом кипур",
            "йом-кипур",
            "йом-киппур",
            "йом киппур",
            "судный день",
            "день искупления",
            "yom kippur",
        ],
    ),
    (
        "суккот",
        &[
            "суккот",
            "суккота",
            "суккоту",
            "суккоте",
            "суккотом",
            "кущи",
            "праздник кущей",
            "sukkot",
        ],
    ),
    (
        "шмини ацерет",
        &["шмини", "шмини ацерет", "шмини-ацерет", "shmini atzeret"],
    ),
    (
        "симхат тора",
        &[
            "симхат",
            "симхат тора",
            "симхат-тора",
            "симхат тору",
            "симхат торе",
            "симхат торой",
            "simchat torah",
        ],
    ),
    (
        "ханука",
        &[
            "ханука",
            "хануке",
            "хануку",
            "ханукой",
            "праздник свечей",
            "праздник огней",
            "chanukah",
            "hanukkah",
        ],
    ),
    (
        "ту би-шват",
        &[
            "ту би-шват",
            "ту би шват",
            "ту бишват",
            "новый год деревьев",
            "tu bishvat",
            "tu b'shvat",
        ],
    ),
    (
        "пурим",
        &["пурим", "пурима", "пуриму", "пуриме", "пуримом", "purim"],
    ),
    (
        "лаг ба-омер",
        &[
            "лаг ба-омер",
            "лаг ба омер",
            "лаг баомер",
            "lag baomer",
            "lag b'omer",
        ],
    ),
    (
        "тиша бе-ав",
        &[
            "тиша бе-ав",
            "тиша бе ав",
            "тиша беав",
            "9 ава",
            "tisha b'av",
            "tisha bav",
        ],
    ),
];

/// Find the canonical holiday a query refers to, if any.
pub fn match_holiday(query: &str) -> Option<&'static str> {
    let lower = query.to_lowercase();
    HOLIDAY_ALIASES
        .iter()
        .find(|(_, aliases)| aliases.iter().any(|a| lower.contains(a)))
        .map(|(canonical, _)| *canonical)
}

fn aliases_of(canonical: &str) -> &'static [&'static str] {
    HOLIDAY_ALIASES
        .iter()
        .find(|(name, _)| *name == canonical)
        .map(|(_, aliases)| *aliases)
        .unwrap_or(&[])
}

// ============================================================================
// Candidate years
// ============================================================================

static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d{4})\b").expect("Invalid regex"));

const NEXT_YEAR_WORDS: &[&str] = &["следующ", "будущ", "next year"];
const THIS_YEAR_WORDS: &[&str] = &["этот", "этом году", "текущ", "нынешн", "this year"];

/// How the search years were chosen from the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearSelection {
    /// A four-digit year written out in the query.
    Explicit(i32),
    /// "Next year" keywords.
    Next(i32),
    /// "This year" keywords.
    Current(i32),
    /// Nothing specified: current and next year are both searched.
    Default(i32, i32),
}

impl YearSelection {
    pub fn years(&self) -> Vec<i32> {
        match *self {
            Self::Explicit(y) | Self::Next(y) | Self::Current(y) => vec![y],
            Self::Default(a, b) => vec![a, b],
        }
    }
}

/// Pick the years to search: explicit year in the query, then "next year" /
/// "this year" keywords, then the default of the current and next year.
pub fn year_selection(query: &str, today: NaiveDate) -> YearSelection {
    let current = today.year();
    if let Some(year) = YEAR_RE
        .captures(query)
        .and_then(|c| c[1].parse::<i32>().ok())
    {
        return YearSelection::Explicit(year);
    }
    let lower = query.to_lowercase();
    if NEXT_YEAR_WORDS.iter().any(|w| lower.contains(w)) {
        YearSelection::Next(current + 1)
    } else if THIS_YEAR_WORDS.iter().any(|w| lower.contains(w)) {
        YearSelection::Current(current)
    } else {
        YearSelection::Default(current, current + 1)
    }
}

pub fn candidate_years(query: &str, today: NaiveDate) -> Vec<i32> {
    year_selection(query, today).years()
}

// ============================================================================
// Resolver
// ============================================================================

/// Resolves holiday queries against the calendar bridge.
pub struct HolidayResolver<'a> {
    calendar: &'a dyn CalendarApi,
}

impl<'a> HolidayResolver<'a> {
    pub fn new(calendar: &'a dyn CalendarApi) -> Self {
        Self { calendar }
    }

    /// Resolve the holiday mentioned in the query across its candidate
    /// years. Empty when no holiday is recognized or every year degraded.
    pub async fn resolve(&self, query: &str, today: NaiveDate) -> Vec<HolidayOccurrence> {
        let Some(canonical) = match_holiday(query) else {
            return Vec::new();
        };
        let years = candidate_years(query, today);
        self.occurrences(canonical, &years, today).await
    }

    /// Occurrences of one canonical holiday in the given years.
    ///
    /// A listing failure skips that year and resolution continues; an
    /// occurrence in the current year that already elapsed is dropped unless
    /// it is the only year searched.
    pub async fn occurrences(
        &self,
        canonical: &str,
        years: &[i32],
        today: NaiveDate,
    ) -> Vec<HolidayOccurrence> {
        let aliases = aliases_of(canonical);
        let mut found = Vec::new();

        for &year in years {
            let items = match self.calendar.holidays_in_year(year).await {
                Ok(items) => items,
                Err(err) => {
                    warn!(year, error = %err, "holiday listing unavailable, skipping year");
                    continue;
                }
            };

            for item in items {
                let title_lower = item.title.to_lowercase();
                if !aliases.iter().any(|a| title_lower.contains(a)) {
                    continue;
                }
                let Some(date) = item.gregorian_date() else {
                    continue;
                };
                if year == today.year() && date < today && years.len() > 1 {
                    continue;
                }

                let hebrew_label = match self.calendar.to_hebrew(date).await {
                    Ok(converted) => converted.hebrew_label,
                    Err(err) => {
                        warn!(error = %err, "hebrew label unavailable for holiday date");
                        String::new()
                    }
                };

                found.push(HolidayOccurrence {
                    canonical: canonical.to_string(),
                    title: item.title,
                    date,
                    hebrew_label,
                    description: item.description,
                    search_year: year,
                });
            }
        }

        found
    }
}

// ============================================================================
// Duration formatting
// ============================================================================

/// Signed day count from today to the event (negative when elapsed).
pub fn days_until(event: NaiveDate, today: NaiveDate) -> i64 {
    (event - today).num_days()
}

/// Human-readable signed duration, e.g. "До праздника осталось 3 дня." or
/// "Праздник прошел 12 дней назад.".
pub fn format_days_until(days: i64) -> String {
    if days >= 0 {
        format!("До праздника осталось {} {}.", days, plural_days(days))
    } else {
        let n = days.abs();
        format!("Праздник прошел {} {} назад.", n, plural_days(n))
    }
}

/// Russian three-way plural selection: ends in 1 but not 11 → singular form,
/// ends in 2–4 but not 12–14 → few form, everything else → many form.
pub fn ru_plural(n: i64, one: &'static str, few: &'static str, many: &'static str) -> &'static str {
    let n = n.abs();
    let tens = n % 100;
    let ones = n % 10;
    if ones == 1 && tens != 11 {
        one
    } else if (2..=4).contains(&ones) && !(12..=14).contains(&tens) {
        few
    } else {
        many
    }
}

pub fn plural_days(n: i64) -> &'static str {
    ru_plural(n, "день", "дня", "дней")
}

pub fn plural_weeks(n: i64) -> &'static str {
    ru_plural(n, "неделя", "недели", "недель")
}
