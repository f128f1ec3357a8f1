//! Month-name lookup tables.
//!
//! Three process-wide, immutable tables:
//!
//! - Hebrew month spelling normalization (transliteration variants → one of
//!   14 canonical tokens: the 12 months plus Adar I / Adar II);
//! - the multilingual Gregorian month-stem table used when a date is written
//!   with a spelled-out month ("15 июля", "Dec 12");
//! - Russian names of Hebrew months, for Hebrew→Gregorian conversion queries.

use std::sync::LazyLock;

use regex::Regex;

// ============================================================================
// Hebrew month normalization
// ============================================================================

/// Known transliteration spellings, lowercase, mapped to canonical tokens.
/// Longer spellings ("adar ii") come before their prefixes ("adar").
const HEBREW_MONTH_SPELLINGS: &[(&str, &str)] = &[
    ("nisan", "Nisan"),
    ("nissan", "Nisan"),
    ("iyyar", "Iyyar"),
    ("iyar", "Iyyar"),
    ("sivan", "Sivan"),
    ("tamuz", "Tamuz"),
    ("tammuz", "Tamuz"),
    ("av", "Av"),
    ("elul", "Elul"),
    ("tishrei", "Tishrei"),
    ("tishri", "Tishrei"),
    ("cheshvan", "Cheshvan"),
    ("heshvan", "Cheshvan"),
    ("kislev", "Kislev"),
    ("tevet", "Tevet"),
    ("shvat", "Shvat"),
    ("sh'vat", "Shvat"),
    ("shevat", "Shvat"),
    ("adar i", "Adar I"),
    ("adar 1", "Adar I"),
    ("adar i'", "Adar I"),
    ("adar ii", "Adar II"),
    ("adar 2", "Adar II"),
    ("adar ii'", "Adar II"),
    ("adar", "Adar"),
];

/// Normalize a Hebrew month spelling to its canonical token.
///
/// Unrecognized spellings pass through capitalized rather than erroring —
/// the conversion service may still accept them.
pub fn normalize_hebrew_month(month: &str) -> String {
    let trimmed = month.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let lower = trimmed.to_lowercase();
    for (spelling, canonical) in HEBREW_MONTH_SPELLINGS {
        if lower == *spelling {
            return (*canonical).to_string();
        }
    }
    capitalize(&lower)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

// ============================================================================
// Gregorian month stems
// ============================================================================

/// Month-name stems in fixed declared order; the first stem contained in the
/// candidate word wins. Russian stems cover full, short, and declined forms
/// ("июля", "дек."); English stems cover full and short forms.
const MONTH_STEMS: &[(&str, u32)] = &[
    // Russian
    ("январ", 1),
    ("янв", 1),
    ("феврал", 2),
    ("фев", 2),
    ("март", 3),
    ("мар", 3),
    ("апрел", 4),
    ("апр", 4),
    ("ма", 5),
    ("май", 5),
    ("июн", 6),
    ("июл", 7),
    ("август", 8),
    ("авг", 8),
    ("сентябр", 9),
    ("сен", 9),
    ("октябр", 10),
    ("окт", 10),
    ("ноябр", 11),
    ("ноя", 11),
    ("декабр", 12),
    ("дек", 12),
    // English
    ("january", 1),
    ("jan", 1),
    ("february", 2),
    ("feb", 2),
    ("march", 3),
    ("mar", 3),
    ("april", 4),
    ("apr", 4),
    ("may", 5),
    ("june", 6),
    ("jun", 6),
    ("july", 7),
    ("jul", 7),
    ("august", 8),
    ("aug", 8),
    ("september", 9),
    ("sep", 9),
    ("october", 10),
    ("oct", 10),
    ("november", 11),
    ("nov", 11),
    ("december", 12),
    ("dec", 12),
];

/// Map a spelled-out month word to its number (1–12).
pub fn month_number(word: &str) -> Option<u32> {
    let lower = word.to_lowercase();
    MONTH_STEMS
        .iter()
        .find(|(stem, _)| lower.contains(stem))
        .map(|(_, n)| *n)
}

// ============================================================================
// Russian names of Hebrew months
// ============================================================================

const RU_HEBREW_MONTHS: &[(&str, &str)] = &[
    ("нисан", "Nisan"),
    ("ияр", "Iyyar"),
    ("сиван", "Sivan"),
    ("таммуз", "Tamuz"),
    ("тамуз", "Tamuz"),
    ("ав", "Av"),
    ("элул", "Elul"),
    ("тишрей", "Tishrei"),
    ("хешван", "Cheshvan"),
    ("кислев", "Kislev"),
    ("тевет", "Tevet"),
    ("шват", "Shvat"),
    ("адар", "Adar"),
];

// A bounded declension suffix keeps "ав" from matching inside words like
// "августа".
static RU_HEBREW_MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    let names = RU_HEBREW_MONTHS
        .iter()
        .map(|(ru, _)| *ru)
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b({names})[а-яё]{{0,2}}\b")).expect("Invalid regex")
});

/// Find a Hebrew month written in Russian anywhere in the query and return
/// its canonical token.
pub fn hebrew_month_from_russian(query: &str) -> Option<&'static str> {
    let lowercased = query.to_lowercase();
    let caps = RU_HEBREW_MONTH_RE.captures(&lowercased)?;
    let matched = caps.get(1)?.as_str();
    RU_HEBREW_MONTHS
        .iter()
        .find(|(ru, _)| *ru == matched)
        .map(|(_, canonical)| *canonical)
}

/// Find a Hebrew month written in Russian or in any known transliteration
/// anywhere in the query.
pub fn find_hebrew_month(query: &str) -> Option<&'static str> {
    if let Some(canonical) = hebrew_month_from_russian(query) {
        return Some(canonical);
    }
    let lower = query.to_lowercase();
    HEBREW_MONTH_SPELLINGS
        .iter()
        .filter(|(spelling, _)| contains_phrase(&lower, spelling))
        .max_by_key(|(spelling, _)| spelling.len())
        .map(|(_, canonical)| *canonical)
}

/// Substring search that only accepts hits delimited by non-alphanumeric
/// characters, so "av" never matches inside "have".
fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    haystack.match_indices(phrase).any(|(pos, _)| {
        let before_ok = haystack[..pos]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        let after_ok = haystack[pos + phrase.len()..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_alphanumeric());
        before_ok && after_ok
    })
}
