//! In-memory stub collaborators shared by the integration tests.

use async_trait::async_trait;
use chrono::NaiveDate;

use luach::calendar::{
    normalize_hebrew_month, CalendarApi, CalendarDate, HebrewDate, HebrewDateQuery, HolidayItem,
};
use luach::error::{CalendarError, LlmError, SearchError};
use luach::llm::CompletionProvider;
use luach::search::{SearchHit, TextSearch, TextSegment};

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

// ============================================================================
// Calendar oracle
// ============================================================================

/// Calendar service stub backed by a fixed conversion table.
pub struct StubCalendar {
    table: Vec<(NaiveDate, HebrewDate, &'static str)>,
    holidays: Vec<(i32, Vec<HolidayItem>)>,
    pub fail_holidays: bool,
}

fn hd(year: i32, month: &str, day: u32) -> HebrewDate {
    HebrewDate {
        year,
        month: month.to_string(),
        day,
    }
}

fn holiday(title: &str, date: &str, description: Option<&str>) -> HolidayItem {
    HolidayItem {
        title: title.to_string(),
        date: date.to_string(),
        description: description.map(str::to_string),
        category: Some("holiday".to_string()),
        hebrew: None,
    }
}

impl StubCalendar {
    /// A small but internally consistent slice of the real calendar.
    pub fn sample() -> Self {
        Self {
            table: vec![
                (d(2024, 1, 1), hd(5784, "Tevet", 20), "20 Тевета 5784"),
                (d(2024, 1, 4), hd(5784, "Tevet", 23), "23 Тевета 5784"),
                (d(2024, 1, 31), hd(5784, "Shvat", 21), "21 Швата 5784"),
                (d(2024, 2, 29), hd(5784, "Adar I", 20), "20 Адара I 5784"),
                (d(2024, 3, 1), hd(5784, "Adar I", 21), "21 Адара I 5784"),
                (d(2024, 4, 23), hd(5784, "Nisan", 15), "15 Нисана 5784"),
                (d(2024, 5, 31), hd(5784, "Iyyar", 23), "23 Ияра 5784"),
                (d(2024, 6, 1), hd(5784, "Iyyar", 24), "24 Ияра 5784"),
                (d(2024, 6, 2), hd(5784, "Iyyar", 25), "25 Ияра 5784"),
                (d(2024, 6, 12), hd(5784, "Sivan", 6), "6 Сивана 5784"),
                (d(2024, 7, 15), hd(5784, "Tamuz", 9), "9 Таммуза 5784"),
                (d(2024, 12, 26), hd(5785, "Kislev", 25), "25 Кислева 5785"),
                (d(2023, 9, 16), hd(5784, "Tishrei", 1), "1 Тишрея 5784"),
                (d(2025, 4, 13), hd(5785, "Nisan", 15), "15 Нисана 5785"),
            ],
            holidays: vec![
                (
                    2024,
                    vec![
                        holiday(
                            "Песах I",
                            "2024-04-23",
                            Some("Праздник исхода из Египта"),
                        ),
                        holiday("Шавуот", "2024-06-12", Some("Праздник дарования Торы")),
                        holiday("Ханука: 1-я свеча", "2024-12-26", None),
                    ],
                ),
                (
                    2025,
                    vec![holiday(
                        "Песах I",
                        "2025-04-13",
                        Some("Праздник исхода из Египта"),
                    )],
                ),
            ],
            fail_holidays: false,
        }
    }

    pub fn failing_holidays() -> Self {
        Self {
            fail_holidays: true,
            ..Self::sample()
        }
    }
}

#[async_trait]
impl CalendarApi for StubCalendar {
    async fn to_hebrew(&self, date: NaiveDate) -> Result<CalendarDate, CalendarError> {
        self.table
            .iter()
            .find(|(g, _, _)| *g == date)
            .map(|(g, h, label)| CalendarDate {
                gregorian: *g,
                hebrew: h.clone(),
                hebrew_label: (*label).to_string(),
            })
            .ok_or_else(|| CalendarError::Service(format!("date outside stub table: {date}")))
    }

    async fn to_gregorian(&self, date: &HebrewDateQuery) -> Result<CalendarDate, CalendarError> {
        let mut missing = Vec::new();
        if date.year.is_none() {
            missing.push("year");
        }
        if date.month.is_none() {
            missing.push("month");
        }
        if date.day.is_none() {
            missing.push("day");
        }
        if !missing.is_empty() {
            return Err(CalendarError::MissingField(missing.join(", ")));
        }

        let month = normalize_hebrew_month(date.month.as_deref().unwrap_or_default());
        self.table
            .iter()
            .find(|(_, h, _)| {
                Some(h.year) == date.year && h.month == month && Some(h.day) == date.day
            })
            .map(|(g, h, label)| CalendarDate {
                gregorian: *g,
                hebrew: h.clone(),
                hebrew_label: (*label).to_string(),
            })
            .ok_or_else(|| CalendarError::Service("hebrew date outside stub table".to_string()))
    }

    async fn holidays_on(&self, date: NaiveDate) -> Result<Vec<HolidayItem>, CalendarError> {
        if self.fail_holidays {
            return Err(CalendarError::Service("stub holiday failure".to_string()));
        }
        let date_str = date.to_string();
        Ok(self
            .holidays
            .iter()
            .flat_map(|(_, items)| items.iter())
            .filter(|item| item.date == date_str)
            .cloned()
            .collect())
    }

    async fn holidays_in_year(&self, year: i32) -> Result<Vec<HolidayItem>, CalendarError> {
        if self.fail_holidays {
            return Err(CalendarError::Service("stub holiday failure".to_string()));
        }
        // Unknown years yield an empty list, matching the real service.
        Ok(self
            .holidays
            .iter()
            .find(|(y, _)| *y == year)
            .map(|(_, items)| items.clone())
            .unwrap_or_default())
    }
}

// ============================================================================
// Completion stubs
// ============================================================================

/// Echoes the grounding context back, so tests can inspect exactly what the
/// pipeline injected.
pub struct EchoLlm;

#[async_trait]
impl CompletionProvider for EchoLlm {
    async fn complete(&self, prompt: &str, context: Option<&str>) -> Result<String, LlmError> {
        Ok(context.unwrap_or(prompt).to_string())
    }
}

/// Answers routing requests with a fixed label and everything else with the
/// injected context, so a single provider can pin the route and still let
/// tests inspect the factual block.
pub struct ClassifierThenEcho(pub &'static str);

#[async_trait]
impl CompletionProvider for ClassifierThenEcho {
    async fn complete(&self, prompt: &str, context: Option<&str>) -> Result<String, LlmError> {
        match context {
            Some(ctx) if ctx.contains("маршрутизатор") => Ok(self.0.to_string()),
            Some(ctx) => Ok(ctx.to_string()),
            None => Ok(prompt.to_string()),
        }
    }
}

/// Always fails, to exercise degraded paths.
pub struct FailingLlm;

#[async_trait]
impl CompletionProvider for FailingLlm {
    async fn complete(&self, _: &str, _: Option<&str>) -> Result<String, LlmError> {
        Err(LlmError::Api("stub completion failure".to_string()))
    }
}

// ============================================================================
// Search stubs
// ============================================================================

/// Fixed ref→text corpus.
pub struct StubSearch {
    pub entries: Vec<(String, String)>,
}

impl StubSearch {
    pub fn with_passage(text_ref: &str, text: &str) -> Self {
        Self {
            entries: vec![(text_ref.to_string(), text.to_string())],
        }
    }
}

#[async_trait]
impl TextSearch for StubSearch {
    async fn search(&self, _query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError> {
        Ok(self
            .entries
            .iter()
            .take(limit)
            .map(|(text_ref, _)| SearchHit {
                text_ref: text_ref.clone(),
                title: None,
            })
            .collect())
    }

    async fn fetch_text(&self, text_ref: &str) -> Result<TextSegment, SearchError> {
        self.entries
            .iter()
            .find(|(r, _)| r == text_ref)
            .map(|(r, text)| TextSegment {
                text_ref: r.clone(),
                he_ref: None,
                lines: vec![text.clone()],
            })
            .ok_or_else(|| SearchError::NotFound(text_ref.to_string()))
    }
}

/// No corpus at all.
pub struct EmptySearch;

#[async_trait]
impl TextSearch for EmptySearch {
    async fn search(&self, _: &str, _: usize) -> Result<Vec<SearchHit>, SearchError> {
        Ok(Vec::new())
    }

    async fn fetch_text(&self, text_ref: &str) -> Result<TextSegment, SearchError> {
        Err(SearchError::NotFound(text_ref.to_string()))
    }
}
