//! Round-trip and normalization properties over the stub calendar oracle.

use luach::calendar::{normalize_hebrew_month, CalendarApi, HebrewDateQuery};
use luach::error::CalendarError;

use super::stubs::{d, StubCalendar};

#[tokio::test]
async fn test_gregorian_hebrew_round_trip() {
    let calendar = StubCalendar::sample();

    for date in [
        d(2024, 1, 1),
        d(2024, 2, 29),
        d(2024, 4, 23),
        d(2024, 12, 26),
        d(2023, 9, 16),
        d(2025, 4, 13),
    ] {
        let hebrew = calendar.to_hebrew(date).await.unwrap();
        let back = calendar
            .to_gregorian(&hebrew.hebrew.clone().into())
            .await
            .unwrap();
        assert_eq!(back.gregorian, date, "round trip of {date}");
    }
}

#[tokio::test]
async fn test_round_trip_survives_spelling_variants() {
    let calendar = StubCalendar::sample();

    // The same date requested under different month spellings.
    for spelling in ["Nisan", "nisan", "NISAN", "nissan"] {
        let converted = calendar
            .to_gregorian(&HebrewDateQuery {
                year: Some(5784),
                month: Some(spelling.to_string()),
                day: Some(15),
            })
            .await
            .unwrap();
        assert_eq!(converted.gregorian, d(2024, 4, 23), "spelling {spelling}");
    }
}

#[tokio::test]
async fn test_missing_fields_named_exactly() {
    let calendar = StubCalendar::sample();

    let err = calendar
        .to_gregorian(&HebrewDateQuery {
            year: Some(5784),
            month: None,
            day: Some(10),
        })
        .await
        .unwrap_err();

    match err {
        CalendarError::MissingField(fields) => assert_eq!(fields, "month"),
        other => panic!("expected MissingField, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_year_yields_empty_listing() {
    let calendar = StubCalendar::sample();
    let items = calendar.holidays_in_year(1999).await.unwrap();
    assert!(items.is_empty());
}

#[test]
fn test_normalization_idempotent_over_canonical_tokens() {
    for token in [
        "Nisan", "Iyyar", "Sivan", "Tamuz", "Av", "Elul", "Tishrei", "Cheshvan", "Kislev",
        "Tevet", "Shvat", "Adar", "Adar I", "Adar II",
    ] {
        assert_eq!(normalize_hebrew_month(token), token);
        assert_eq!(
            normalize_hebrew_month(&normalize_hebrew_month(token)),
            token
        );
    }
}
