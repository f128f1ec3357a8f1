//! luach: calendar-aware assistant for Jewish texts and the Hebrew calendar.
//!
//! Answers natural-language questions by routing each query either to a
//! factual calendar computation (date conversion, holiday lookup, date
//! difference) or to a retrieval-grounded generative answer. The temporal
//! reasoning core is deterministic and local; calendar conversion, text
//! search, and completion are external collaborators behind narrow traits.

pub mod calendar;
pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod query;
pub mod search;

pub use calendar::{
    diff, match_holiday, normalize_hebrew_month, CalendarApi, CalendarDate, DateDiff,
    DateExtractor, HebcalClient, HebrewDate, HebrewDateQuery, HolidayItem, HolidayOccurrence,
    HolidayResolver, RelativeExpression,
};
pub use chat::ChatBot;
pub use config::Config;
pub use error::{CalendarError, ConfigError, LlmError, LuachError, Result, SearchError};
pub use llm::{CompletionProvider, OpenRouterClient};
pub use query::{Category, IntentRouter};
pub use search::{SefariaClient, TextSearch};
