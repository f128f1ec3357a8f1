//! Russian-language formatting of calendar facts.

use chrono::{NaiveDate, Weekday};

use crate::calendar::{plural_days, plural_weeks, ru_plural, DateDiff};

/// About-the-calendar footer attached to every calendar factual block.
pub const CALENDAR_FOOTER: &str = "Еврейский календарь основан на лунно-солнечном цикле. \
Год состоит из 12 или 13 месяцев, в зависимости от високосности. \
День в еврейском календаре начинается с заходом солнца.";

/// Russian weekday label.
pub fn weekday_ru(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "понедельник",
        Weekday::Tue => "вторник",
        Weekday::Wed => "среда",
        Weekday::Thu => "четверг",
        Weekday::Fri => "пятница",
        Weekday::Sat => "суббота",
        Weekday::Sun => "воскресенье",
    }
}

/// `dd.mm.yyyy`.
pub fn format_date_ru(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

/// Prefix describing how far the target date is from today ("Завтра будет:",
/// "Через 3 дня будет:"). Day-word phrases in the query win over the raw
/// offset so the answer echoes the user's wording.
pub fn day_offset_prefix(days_diff: i64, query: &str) -> String {
    let lower = query.to_lowercase();
    if lower.contains("послезавтра") {
        return "Послезавтра будет: ".to_string();
    }
    if lower.contains("завтра") {
        return "Завтра будет: ".to_string();
    }
    if days_diff > 0 {
        format!("Через {} {} будет: ", days_diff, plural_days(days_diff))
    } else if days_diff < 0 {
        let n = days_diff.abs();
        format!("{} {} назад было: ", n, plural_days(n))
    } else {
        String::new()
    }
}

/// Year/month/day decomposition: "1 год, 2 месяца, 5 дней". Zero components
/// are omitted; a zero diff reads "0 дней".
pub fn describe_diff(diff: &DateDiff) -> String {
    let mut parts = Vec::new();
    if diff.years > 0 {
        let years = i64::from(diff.years);
        parts.push(format!("{} {}", years, ru_plural(years, "год", "года", "лет")));
    }
    if diff.months > 0 {
        let months = i64::from(diff.months);
        parts.push(format!(
            "{} {}",
            months,
            ru_plural(months, "месяц", "месяца", "месяцев")
        ));
    }
    if diff.remaining_days > 0 {
        parts.push(format!(
            "{} {}",
            diff.remaining_days,
            plural_days(diff.remaining_days)
        ));
    }
    if parts.is_empty() {
        return "0 дней".to_string();
    }
    parts.join(", ")
}

/// Week/remainder decomposition: "2 недели и 3 дня".
pub fn describe_weeks(diff: &DateDiff) -> String {
    format!(
        "{} {} и {} {}",
        diff.weeks,
        plural_weeks(diff.weeks),
        diff.days_after_weeks,
        plural_days(diff.days_after_weeks)
    )
}
