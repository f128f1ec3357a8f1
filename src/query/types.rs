//! Types for query routing.

use serde::{Deserialize, Serialize};

/// High-level category of a user query, deciding which pipeline answers it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Today's/tomorrow's date, weekday, current Hebrew date.
    CalendarToday,
    /// Holiday dates, date conversions, days-until questions.
    CalendarInfo,
    /// Difference between two dates.
    CalendarDiff,
    /// Needs both calendar facts and a textual explanation.
    CalendarWithContext,
    /// Source search, concepts, laws, commentary.
    TextSearch,
    /// Everything else.
    #[default]
    General,
}

impl Category {
    /// Parse a classifier label. The label is trimmed and lowercased;
    /// anything unrecognized is treated as [`Category::General`].
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "calendar_today" => Self::CalendarToday,
            "calendar_info" => Self::CalendarInfo,
            "calendar_diff" => Self::CalendarDiff,
            "calendar_with_context" => Self::CalendarWithContext,
            "text_search" => Self::TextSearch,
            _ => Self::General,
        }
    }

    pub fn as_label(&self) -> &'static str {
        match self {
            Self::CalendarToday => "calendar_today",
            Self::CalendarInfo => "calendar_info",
            Self::CalendarDiff => "calendar_diff",
            Self::CalendarWithContext => "calendar_with_context",
            Self::TextSearch => "text_search",
            Self::General => "general",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Direction of a calendar conversion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionDirection {
    ToHebrew,
    ToGregorian,
}
