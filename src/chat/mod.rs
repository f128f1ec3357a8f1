//! The request pipeline: route a query, resolve calendar facts into a
//! factual block, ground the generative answer on it, sanitize the output.
//!
//! Every external call degrades independently: a failed conversion or
//! holiday lookup shrinks the factual block, a failed completion falls back
//! to returning the factual block itself. Nothing here is fatal.

pub mod format;
pub mod sanitize;

use std::sync::Arc;
use std::sync::LazyLock;

use chrono::{Datelike, Local, NaiveDate};
use regex::Regex;
use tracing::{debug, warn};

use crate::calendar::{
    days_until, diff, find_hebrew_month, format_days_until, match_holiday, year_selection,
    CalendarApi, CalendarDate, DateExtractor, HebrewDateQuery, HolidayResolver, YearSelection,
};
use crate::query::{
    conversion_direction, is_conversion_query, wants_days_until, Category, ConversionDirection,
    IntentRouter,
};
use crate::llm::CompletionProvider;
use crate::search::TextSearch;

use format::{
    day_offset_prefix, describe_diff, describe_weeks, format_date_ru, weekday_ru, CALENDAR_FOOTER,
};
use sanitize::clean_html;

/// Base system context for every generative answer.
const SYSTEM_PROMPT: &str = "\
Ты — эксперт по еврейским текстам, традициям и календарю. Форматируй ответы следующим образом:

1. Источники:
- Всегда указывай точные источники цитат в скобках (пример: Берешит 1:1, Мишна Сангедрин 4:5)
- Для мудрецов и комментаторов указывай период и регион (пример: Раши (Франция, XI век))

2. Объяснения:
- Для всех специальных терминов давай краткое пояснение в скобках
- Сложные концепции объясняй простым языком, но без упрощения содержания
- При упоминании дат указывай их как по григорианскому, так и по еврейскому календарю

3. Уровень детализации:
- Ответы должны быть понятны светскому читателю без религиозного образования
- Избегай академического жаргона, но сохраняй точность

4. Ограничения:
- Если контекст вопроса недостаточен, запрашивай уточнения
- При отсутствии достоверных данных прямо указывай на это
- Разделяй установленные факты и интерпретации

5. Работа с датами и календарём:
- Все даты и календарные события должны браться только из полученных данных
- Возвращай ТОЛЬКО даты из полученных данных без изменений, не вычисляй их самостоятельно
- Если данные не получены, попроси пользователя уточнить запрос

Форматируй структуру ответа с помощью HTML (жирные заголовки: <b>Пояснения к терминам</b>, <b>Источники и справки</b>).

<blockquote>⚠️ <b>Внимание:</b> Информация приведена для ознакомления. Для получения авторитетного мнения рекомендуется проконсультироваться с раввином.</blockquote>";

/// Answer when no date could be recognized in a conversion query.
const CLARIFY_DATE_MESSAGE: &str = "Не удалось распознать дату в вашем запросе. \
Пожалуйста, укажите дату в формате ДД месяц (например, «15 июля») для конвертации в еврейскую дату, \
или укажите еврейскую дату (например, «15 нисан») для конвертации в григорианскую.";

static HEBREW_DAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})\b").expect("Invalid regex"));
static HEBREW_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4,5})\b").expect("Invalid regex"));
static DIFF_SPLIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^(.+?)(?:\bи\b|\bмежду\b|\bbetween\b|\bto\b|—|-)(.+)$")
        .expect("Invalid regex")
});

/// Calendar-aware chat assistant.
pub struct ChatBot {
    router: IntentRouter,
    llm: Arc<dyn CompletionProvider>,
    search: Arc<dyn TextSearch>,
    calendar: Arc<dyn CalendarApi>,
    context_hits: usize,
    /// Fixed "today" for tests; `None` means the wall clock.
    anchor: Option<NaiveDate>,
}

impl ChatBot {
    pub fn new(
        llm: Arc<dyn CompletionProvider>,
        search: Arc<dyn TextSearch>,
        calendar: Arc<dyn CalendarApi>,
    ) -> Self {
        Self {
            router: IntentRouter::new(llm.clone()),
            llm,
            search,
            calendar,
            context_hits: 3,
            anchor: None,
        }
    }

    /// How many top search hits are fetched as grounding context.
    pub fn with_context_hits(mut self, hits: usize) -> Self {
        self.context_hits = hits;
        self
    }

    /// Pin "today" to a fixed date.
    pub fn with_anchor(mut self, anchor: NaiveDate) -> Self {
        self.anchor = Some(anchor);
        self
    }

    fn today(&self) -> NaiveDate {
        self.anchor.unwrap_or_else(|| Local::now().date_naive())
    }

    fn extractor(&self) -> DateExtractor {
        DateExtractor::with_anchor(self.today())
    }

    /// Answer a single query.
    pub async fn handle_query(&self, query: &str) -> String {
        let category = self.router.classify(query).await;
        debug!(%category, "handling query");

        match category {
            Category::CalendarToday => self.calendar_context_answer(query).await,
            Category::CalendarInfo => self.calendar_event_answer(query).await,
            Category::CalendarDiff => self.date_diff_answer(query).await,
            Category::CalendarWithContext => {
                let block = match self.holiday_info_block(query).await {
                    Some(block) => block,
                    None => self.calendar_context_block(query).await,
                };
                self.grounded_answer(query, Some(&block)).await
            }
            Category::TextSearch | Category::General => self.grounded_answer(query, None).await,
        }
    }

    // ------------------------------------------------------------------
    // Calendar context ("today") path
    // ------------------------------------------------------------------

    async fn calendar_context_answer(&self, query: &str) -> String {
        let block = self.calendar_context_block(query).await;
        self.grounded_answer(query, Some(&block)).await
    }

    /// Factual block for an (implicit or extracted) date: Hebrew date,
    /// weekday, holidays on that day, Hebrew year.
    async fn calendar_context_block(&self, query: &str) -> String {
        let today = self.today();
        let target = self.extractor().extract(query).unwrap_or(today);
        let days_diff = (target - today).num_days();

        let (hebrew_label, hebrew_year) = match self.calendar.to_hebrew(target).await {
            Ok(converted) => (converted.hebrew_label, converted.hebrew.year.to_string()),
            Err(err) => {
                warn!(error = %err, "conversion unavailable for calendar context");
                (
                    "еврейскую дату подтвердить не удалось".to_string(),
                    "неизвестен".to_string(),
                )
            }
        };

        let mut holiday_lines = Vec::new();
        match self.calendar.holidays_on(target).await {
            Ok(items) => {
                for item in items {
                    let hebrew = match item.gregorian_date() {
                        Some(date) => self
                            .calendar
                            .to_hebrew(date)
                            .await
                            .map(|c| c.hebrew_label)
                            .unwrap_or_default(),
                        None => String::new(),
                    };
                    let mut line = format!("• {} — {} ({})", item.title, item.date, hebrew);
                    if let Some(desc) = &item.description {
                        line.push_str(": ");
                        line.push_str(desc);
                    }
                    holiday_lines.push(line);
                }
            }
            Err(err) => warn!(error = %err, "holiday lookup unavailable for calendar context"),
        }

        let prefix = day_offset_prefix(days_diff, query);
        let holidays = if holiday_lines.is_empty() {
            "Нет известных праздников в эту дату.".to_string()
        } else {
            holiday_lines.join("\n")
        };

        format!(
            "<b>Фактическая дата:</b>\n\
             {prefix}{hebrew_label} (соответствует {target}).\n\
             <b>День недели:</b> {weekday}\n\n\
             <b>Праздники:</b>\n{holidays}\n\n\
             <b>О еврейском календаре:</b>\n\
             Еврейский календарь основан на лунно-солнечном цикле. \
             Год по еврейскому летоисчислению: {hebrew_year}",
            weekday = weekday_ru(target.weekday()),
        )
    }

    // ------------------------------------------------------------------
    // Holiday path
    // ------------------------------------------------------------------

    async fn calendar_event_answer(&self, query: &str) -> String {
        if is_conversion_query(query) {
            return self.date_conversion_answer(query).await;
        }
        if let Some(block) = self.holiday_info_block(query).await {
            return self.grounded_answer(query, Some(&block)).await;
        }
        // Not about a known holiday (or nothing found): answer with the
        // plain calendar context instead.
        self.calendar_context_answer(query).await
    }

    /// Factual block about a holiday's occurrences, or `None` when the query
    /// names no known holiday or every candidate year came up empty.
    async fn holiday_info_block(&self, query: &str) -> Option<String> {
        let canonical = match_holiday(query)?;
        let today = self.today();
        let selection = year_selection(query, today);
        let resolver = HolidayResolver::new(self.calendar.as_ref());
        let occurrences = resolver
            .occurrences(canonical, &selection.years(), today)
            .await;
        if occurrences.is_empty() {
            return None;
        }

        let wants_days = wants_days_until(query);
        let mut lines = Vec::new();
        for occurrence in &occurrences {
            let mut line = format!(
                "<b>{}</b> — {} ({})",
                occurrence.title, occurrence.date, occurrence.hebrew_label
            );
            if wants_days {
                line.push('\n');
                line.push_str(&format_days_until(days_until(occurrence.date, today)));
            }
            if let Some(desc) = &occurrence.description {
                line.push_str(": ");
                line.push_str(desc);
            }
            lines.push(line);
        }

        let year_info = match selection {
            YearSelection::Explicit(y) => format!(" в {y} году"),
            YearSelection::Next(y) => format!(" в {y} году (следующий год)"),
            YearSelection::Current(y) => format!(" в {y} году (текущий год)"),
            YearSelection::Default(..) => String::new(),
        };

        Some(format!(
            "<b>Информация о празднике{year_info}:</b>\n{}",
            lines.join("\n")
        ))
    }

    // ------------------------------------------------------------------
    // Conversion path
    // ------------------------------------------------------------------

    async fn date_conversion_answer(&self, query: &str) -> String {
        match conversion_direction(query) {
            ConversionDirection::ToHebrew => {
                let Some(date) = self.extractor().extract(query) else {
                    return CLARIFY_DATE_MESSAGE.to_string();
                };
                match self.calendar.to_hebrew(date).await {
                    Ok(converted) => {
                        let block = self.gregorian_to_hebrew_block(&converted).await;
                        self.grounded_answer(query, Some(&block)).await
                    }
                    Err(err) => format!("<b>Ошибка конвертации:</b>\n{err}"),
                }
            }
            ConversionDirection::ToGregorian => {
                let Some(request) = self.extract_hebrew_date(query).await else {
                    return CLARIFY_DATE_MESSAGE.to_string();
                };
                match self.calendar.to_gregorian(&request).await {
                    Ok(converted) => {
                        let block = self.hebrew_to_gregorian_block(&converted).await;
                        self.grounded_answer(query, Some(&block)).await
                    }
                    Err(err) => format!("<b>Ошибка конвертации:</b>\n{err}"),
                }
            }
        }
    }

    /// Pull a Hebrew date out of the query: month by name, day as a 1–2
    /// digit token, year as a 4–5 digit token. A missing year defaults to
    /// the current Hebrew year — obtained from the bridge, never computed.
    async fn extract_hebrew_date(&self, query: &str) -> Option<HebrewDateQuery> {
        let month = find_hebrew_month(query)?;
        let day = HEBREW_DAY_RE
            .captures(query)
            .and_then(|c| c[1].parse::<u32>().ok())?;
        let year = match HEBREW_YEAR_RE
            .captures(query)
            .and_then(|c| c[1].parse::<i32>().ok())
        {
            Some(year) => year,
            None => match self.calendar.to_hebrew(self.today()).await {
                Ok(current) => current.hebrew.year,
                Err(err) => {
                    warn!(error = %err, "current hebrew year unavailable");
                    return None;
                }
            },
        };
        Some(HebrewDateQuery {
            year: Some(year),
            month: Some(month.to_string()),
            day: Some(day),
        })
    }

    async fn gregorian_to_hebrew_block(&self, converted: &CalendarDate) -> String {
        let date = converted.gregorian;
        let mut block = format!(
            "<b>Результат конвертации даты:</b>\n\n\
             Григорианская дата <b>{}</b> ({}) соответствует еврейской дате <b>{}</b>.\n\n\
             <b>Подробная информация:</b>\n\
             • Еврейский год: {}\n\
             • Еврейский месяц: {}\n\
             • Еврейский день: {}\n",
            format_date_ru(date),
            weekday_ru(date.weekday()),
            converted.hebrew_label,
            converted.hebrew.year,
            converted.hebrew.month,
            converted.hebrew.day,
        );
        block.push_str(&self.holidays_section(date).await);
        block.push_str(&format!("\n\n<b>О еврейском календаре:</b>\n{CALENDAR_FOOTER}"));
        block
    }

    async fn hebrew_to_gregorian_block(&self, converted: &CalendarDate) -> String {
        let date = converted.gregorian;
        let weekday = weekday_ru(date.weekday());
        let mut block = format!(
            "<b>Результат конвертации даты:</b>\n\n\
             Еврейская дата <b>{}</b> соответствует григорианской дате <b>{}</b> ({weekday}).\n\n\
             <b>Подробная информация:</b>\n\
             • Григорианский год: {}\n\
             • Григорианский месяц: {}\n\
             • Григорианский день: {}\n\
             • День недели: {weekday}\n",
            converted.hebrew,
            format_date_ru(date),
            date.year(),
            date.month(),
            date.day(),
        );
        block.push_str(&self.holidays_section(date).await);
        block.push_str(&format!("\n\n<b>О еврейском календаре:</b>\n{CALENDAR_FOOTER}"));
        block
    }

    /// Holidays-on-date section of a conversion block; degrades to the
    /// "nothing special" line when the lookup fails or returns nothing.
    async fn holidays_section(&self, date: NaiveDate) -> String {
        let lines: Vec<String> = match self.calendar.holidays_on(date).await {
            Ok(items) => items
                .into_iter()
                .map(|item| {
                    let mut line = format!("• {}", item.title);
                    if let Some(desc) = &item.description {
                        line.push_str(": ");
                        line.push_str(desc);
                    }
                    line
                })
                .collect(),
            Err(err) => {
                warn!(error = %err, "holiday lookup unavailable for conversion block");
                Vec::new()
            }
        };

        if lines.is_empty() {
            "\n<b>Праздники и события:</b> На эту дату не приходится особых праздников или событий."
                .to_string()
        } else {
            format!(
                "\n<b>Праздники и события на эту дату:</b>\n{}",
                lines.join("\n")
            )
        }
    }

    // ------------------------------------------------------------------
    // Date-diff path
    // ------------------------------------------------------------------

    async fn date_diff_answer(&self, query: &str) -> String {
        let extractor = self.extractor();
        let mut dates = DateExtractor::explicit_dates(query);
        dates.truncate(2);

        if dates.len() < 2 {
            if let Some(caps) = DIFF_SPLIT_RE.captures(query) {
                if let (Some(a), Some(b)) = (
                    extractor.extract(caps[1].trim()),
                    extractor.extract(caps[2].trim()),
                ) {
                    dates = vec![a, b];
                }
            }
        }

        // Fewer than two resolvable dates falls through to the generative
        // path.
        let (a, b) = match dates[..] {
            [a, b] => (a, b),
            _ => return self.grounded_answer(query, None).await,
        };

        let result = diff(a, b);
        let label_a = self.hebrew_label_or_empty(a).await;
        let label_b = self.hebrew_label_or_empty(b).await;

        let block = format!(
            "<b>Разница между датами:</b> {} дн.\n\
             Календарная разница: {}.\n\
             В неделях: {}.\n\
             {a} (григ.) — {label_a}\n\
             {b} (григ.) — {label_b}",
            result.days,
            describe_diff(&result),
            describe_weeks(&result),
        );
        self.grounded_answer(query, Some(&block)).await
    }

    async fn hebrew_label_or_empty(&self, date: NaiveDate) -> String {
        match self.calendar.to_hebrew(date).await {
            Ok(converted) => converted.hebrew_label,
            Err(err) => {
                warn!(error = %err, "hebrew label unavailable");
                String::new()
            }
        }
    }

    // ------------------------------------------------------------------
    // Generative answer
    // ------------------------------------------------------------------

    /// One completion attempt grounded either on a factual block or on
    /// retrieved texts. A completion failure returns the factual block
    /// itself (or an apology) rather than propagating.
    async fn grounded_answer(&self, query: &str, factual_block: Option<&str>) -> String {
        let context = match factual_block {
            Some(block) => format!("{SYSTEM_PROMPT}\n\n{block}"),
            None => self.search_context(query).await,
        };

        match self.llm.complete(query, Some(&context)).await {
            Ok(response) => clean_html(&response),
            Err(err) => {
                warn!(error = %err, "completion unavailable");
                match factual_block {
                    Some(block) => clean_html(block),
                    None => "Не удалось получить ответ от языковой модели. \
                             Попробуйте повторить запрос позже."
                        .to_string(),
                }
            }
        }
    }

    /// System prompt plus the top retrieved passages.
    async fn search_context(&self, query: &str) -> String {
        let hits = match self.search.search(query, 10).await {
            Ok(hits) => hits,
            Err(err) => {
                warn!(error = %err, "text search unavailable");
                Vec::new()
            }
        };

        let mut passages = Vec::new();
        for hit in hits.iter().take(self.context_hits) {
            match self.search.fetch_text(&hit.text_ref).await {
                Ok(segment) if !segment.lines.is_empty() => {
                    passages.push(format!(
                        "Источник: {}\nТекст: {}",
                        segment.text_ref,
                        segment.joined()
                    ));
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(text_ref = %hit.text_ref, error = %err, "passage fetch failed");
                }
            }
        }

        let mut context = SYSTEM_PROMPT.to_string();
        if !passages.is_empty() {
            context.push_str("\n\nРелевантные тексты из Sefaria:\n\n");
            context.push_str(&passages.join("\n\n"));
        }
        context
    }
}
