//! Query intent routing.
//!
//! An ordered, deterministic phrase-matching layer picks the obvious cases;
//! anything ambiguous defers to the external single-label classifier. A
//! classifier failure or an unrecognized label degrades to
//! [`Category::General`] — routing itself never errors.

use std::sync::Arc;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::calendar::{hebrew_month_from_russian, match_holiday};
use crate::llm::CompletionProvider;

use super::types::{Category, ConversionDirection};

/// Fixed instruction seeding the external classifier.
const ROUTER_PROMPT: &str = "\
Ты — маршрутизатор для еврейского чат-бота. Выбери одну из категорий, которая лучше всего описывает намерение пользователя.

Категории:

• calendar_today         — узнать сегодняшнюю/завтрашнюю/вчерашнюю дату, день недели, еврейскую дату и т.п.
• calendar_info          — запрос даты или информации о празднике, шаббате, конвертация дат, сколько дней до события (например: «19 июля какой день по еврейски», «2 кислев какой день по григориански»)
• calendar_diff          — разница между двумя датами
• calendar_with_context  — требуется и календарная информация, и объяснение текста (например: «Расскажи о Шавуоте и когда он будет»)
• text_search            — поиск источников, объяснение понятий, вопросов о законах, комментариях, историях и т.п.
• general                — всё остальное, включая философию, мораль, историю, современность

Отвечай только одной категорией. Без пояснений. Без кавычек. Только имя категории.";

// ============================================================================
// Phrase sets
// ============================================================================

const CONVERSION_PHRASES: &[&str] = &[
    "конвертир",
    "перевед",
    "как будет",
    "какая дата",
    "какой день",
    "по еврейски",
    "по григориански",
    "в еврейский",
    "в григорианский",
    "на иврите",
    "на еврейском",
    "convert",
];

const DAYS_UNTIL_PHRASES: &[&str] = &[
    "сколько дней до",
    "когда будет",
    "когда наступит",
    "когда начинается",
    "когда начнется",
    "когда отмечают",
    "когда празднуют",
    "когда отмечается",
    "когда празднуется",
    "когда наступает",
    "when is",
    "how many days until",
];

const TODAY_PHRASES: &[&str] = &[
    "какой сегодня",
    "какое сегодня число",
    "какая сегодня дата",
    "сегодняшн",
    "какой завтра",
    "какой вчера",
    "что за день",
    "what day is it",
    "today's date",
    "какой день недели",
];

const EXPLAIN_PHRASES: &[&str] = &[
    "расскажи",
    "что такое",
    "объясни",
    "почему",
    "tell me about",
    "explain",
];

const DIFF_CONJUNCTIONS: &[&str] = &[" и ", "между", "between", " to ", "—", " - "];

const TO_HEBREW_PHRASES: &[&str] = &[
    "по еврейски",
    "в еврейский",
    "на иврите",
    "на еврейском",
    "в еврейскую",
    "to hebrew",
];

const TO_GREGORIAN_PHRASES: &[&str] = &[
    "по григориански",
    "в григорианский",
    "в григорианскую",
    "to gregorian",
];

static DATE_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{4}[-/. ]\d{1,2}[-/. ]\d{1,2}\b").expect("Invalid regex")
});

fn contains_any(haystack: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| haystack.contains(p))
}

// ============================================================================
// Deterministic rules
// ============================================================================

/// Apply the ordered deterministic rules; `None` means "defer to the
/// external classifier".
pub fn match_rules(query: &str) -> Option<Category> {
    let lower = query.to_lowercase();

    // Two date-like tokens joined by a conjunction read as a difference
    // question.
    if DATE_TOKEN_RE.find_iter(&lower).count() >= 2 && contains_any(&lower, DIFF_CONJUNCTIONS) {
        return Some(Category::CalendarDiff);
    }

    if contains_any(&lower, DAYS_UNTIL_PHRASES) {
        return Some(Category::CalendarInfo);
    }

    if contains_any(&lower, CONVERSION_PHRASES) {
        return Some(Category::CalendarInfo);
    }

    if match_holiday(&lower).is_some() {
        if contains_any(&lower, EXPLAIN_PHRASES) {
            return Some(Category::CalendarWithContext);
        }
        return Some(Category::CalendarInfo);
    }

    if contains_any(&lower, TODAY_PHRASES) {
        return Some(Category::CalendarToday);
    }

    None
}

/// Whether the query asks how long until/since an event.
pub fn wants_days_until(query: &str) -> bool {
    contains_any(&query.to_lowercase(), DAYS_UNTIL_PHRASES)
}

/// Whether the query asks for a calendar conversion.
pub fn is_conversion_query(query: &str) -> bool {
    contains_any(&query.to_lowercase(), CONVERSION_PHRASES)
}

/// Which way a conversion query points. Explicit phrases win; otherwise a
/// Hebrew month name in the query implies Hebrew→Gregorian, and the default
/// is Gregorian→Hebrew.
pub fn conversion_direction(query: &str) -> ConversionDirection {
    let lower = query.to_lowercase();
    if contains_any(&lower, TO_HEBREW_PHRASES) {
        return ConversionDirection::ToHebrew;
    }
    if contains_any(&lower, TO_GREGORIAN_PHRASES) {
        return ConversionDirection::ToGregorian;
    }
    if hebrew_month_from_russian(&lower).is_some() {
        return ConversionDirection::ToGregorian;
    }
    ConversionDirection::ToHebrew
}

// ============================================================================
// Router
// ============================================================================

/// Routes a raw query to a [`Category`].
pub struct IntentRouter {
    classifier: Arc<dyn CompletionProvider>,
}

impl IntentRouter {
    pub fn new(classifier: Arc<dyn CompletionProvider>) -> Self {
        Self { classifier }
    }

    /// Classify a query. Deterministic rules first, then one classifier
    /// attempt; any failure degrades to [`Category::General`].
    pub async fn classify(&self, query: &str) -> Category {
        if let Some(category) = match_rules(query) {
            debug!(%category, "routed by deterministic rule");
            return category;
        }

        match self.classifier.complete(query, Some(ROUTER_PROMPT)).await {
            Ok(label) => {
                let category = Category::from_label(&label);
                debug!(label = label.trim(), %category, "routed by classifier");
                category
            }
            Err(err) => {
                warn!(error = %err, "classifier unavailable, defaulting to general");
                Category::General
            }
        }
    }
}
