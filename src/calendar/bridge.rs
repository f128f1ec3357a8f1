//! Calendar bridge to the Hebcal conversion and holiday-listing service.
//!
//! The bridge is the sole authority for Gregorian↔Hebrew conversion: it
//! validates shapes, normalizes month spellings, and surfaces every service
//! failure as a [`CalendarError`]. It never computes Hebrew calendar
//! arithmetic (leap months, month lengths) itself.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::config::CalendarConfig;
use crate::error::CalendarError;

use super::months::normalize_hebrew_month;
use super::types::{CalendarDate, HebrewDate, HebrewDateQuery};

// ============================================================================
// Service trait
// ============================================================================

/// The external Gregorian↔Hebrew conversion and holiday-listing service.
///
/// Implementations make one attempt per call; callers treat any error as a
/// degraded computation, never as a fatal fault.
#[async_trait]
pub trait CalendarApi: Send + Sync {
    /// Convert a Gregorian date into a dual-calendar date.
    async fn to_hebrew(&self, date: NaiveDate) -> Result<CalendarDate, CalendarError>;

    /// Convert a Hebrew date into a dual-calendar date.
    ///
    /// All three fields of the query are required; missing ones produce a
    /// [`CalendarError::MissingField`] naming them, never a silent default.
    async fn to_gregorian(&self, date: &HebrewDateQuery) -> Result<CalendarDate, CalendarError>;

    /// Holidays and events falling on a single Gregorian date.
    async fn holidays_on(&self, date: NaiveDate) -> Result<Vec<HolidayItem>, CalendarError>;

    /// Holidays and events of a whole Gregorian year.
    async fn holidays_in_year(&self, year: i32) -> Result<Vec<HolidayItem>, CalendarError>;
}

/// One item from a holiday listing.
#[derive(Debug, Clone, Deserialize)]
pub struct HolidayItem {
    #[serde(default)]
    pub title: String,
    /// Date string as reported by the service; usually `YYYY-MM-DD`, may
    /// carry a time suffix for timed events.
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Service-rendered Hebrew label, when present.
    #[serde(default)]
    pub hebrew: Option<String>,
}

impl HolidayItem {
    /// Gregorian date of the item, if its date string parses.
    pub fn gregorian_date(&self) -> Option<NaiveDate> {
        let head = self.date.get(..10)?;
        NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
    }
}

// ============================================================================
// Hebcal client
// ============================================================================

/// Hebcal-backed implementation of [`CalendarApi`].
pub struct HebcalClient {
    client: Client,
    converter_url: String,
    events_url: String,
    lang: String,
}

#[derive(Debug, Deserialize)]
struct ConverterResponse {
    #[serde(default)]
    hebrew: Option<String>,
    #[serde(default)]
    hy: Option<i32>,
    #[serde(default)]
    hm: Option<String>,
    #[serde(default)]
    hd: Option<u32>,
    #[serde(default)]
    gy: Option<i32>,
    #[serde(default)]
    gm: Option<u32>,
    #[serde(default)]
    gd: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    items: Vec<HolidayItem>,
}

impl HebcalClient {
    /// Create a client from configuration.
    pub fn from_config(config: &CalendarConfig) -> Result<Self, CalendarError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CalendarError::Service(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            converter_url: config.converter_url.trim_end_matches('/').to_string(),
            events_url: config.events_url.trim_end_matches('/').to_string(),
            lang: config.lang.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, CalendarError> {
        let response = self
            .client
            .get(url)
            .query(&[("cfg", "json"), ("lg", self.lang.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|e| CalendarError::Service(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CalendarError::Service(e.to_string()))?;

        // The service reports problems both as HTTP errors and as an
        // `{"error": ...}` payload with status 200; fold both into one shape.
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&body) {
            if let Some(message) = value.get("error").and_then(|e| e.as_str()) {
                return Err(CalendarError::Service(message.to_string()));
            }
        }
        if !status.is_success() {
            return Err(CalendarError::Service(format!("HTTP {status}")));
        }

        serde_json::from_str(&body).map_err(|e| CalendarError::Parse(e.to_string()))
    }
}

/// Check that all three Hebrew-date fields are present, naming the missing
/// ones, and normalize the month spelling.
fn validate_hebrew_query(query: &HebrewDateQuery) -> Result<(i32, String, u32), CalendarError> {
    let mut missing = Vec::new();
    if query.year.is_none() {
        missing.push("year");
    }
    if query.month.as_deref().map_or(true, |m| m.trim().is_empty()) {
        missing.push("month");
    }
    if query.day.is_none() {
        missing.push("day");
    }
    if !missing.is_empty() {
        return Err(CalendarError::MissingField(missing.join(", ")));
    }

    let raw_month = query.month.as_deref().unwrap_or_default();
    let month = normalize_hebrew_month(raw_month);
    if month != raw_month {
        debug!(from = raw_month, to = %month, "normalized hebrew month");
    }
    Ok((query.year.unwrap_or_default(), month, query.day.unwrap_or_default()))
}

#[async_trait]
impl CalendarApi for HebcalClient {
    async fn to_hebrew(&self, date: NaiveDate) -> Result<CalendarDate, CalendarError> {
        let params = [
            ("gy", date.year().to_string()),
            ("gm", date.month().to_string()),
            ("gd", date.day().to_string()),
            ("g2h", "1".to_string()),
        ];
        let response: ConverterResponse = self.get_json(&self.converter_url, &params).await?;

        let (hy, hm, hd) = match (response.hy, response.hm.as_ref(), response.hd) {
            (Some(hy), Some(hm), Some(hd)) => (hy, hm.clone(), hd),
            _ => {
                let mut missing = Vec::new();
                if response.hy.is_none() {
                    missing.push("year");
                }
                if response.hm.is_none() {
                    missing.push("month");
                }
                if response.hd.is_none() {
                    missing.push("day");
                }
                return Err(CalendarError::MissingField(missing.join(", ")));
            }
        };

        Ok(CalendarDate {
            gregorian: date,
            hebrew: HebrewDate {
                year: hy,
                month: normalize_hebrew_month(&hm),
                day: hd,
            },
            hebrew_label: response.hebrew.unwrap_or_default(),
        })
    }

    async fn to_gregorian(&self, date: &HebrewDateQuery) -> Result<CalendarDate, CalendarError> {
        let (hy, hm, hd) = validate_hebrew_query(date)?;

        let params = [
            ("hy", hy.to_string()),
            ("hm", hm.clone()),
            ("hd", hd.to_string()),
            ("h2g", "1".to_string()),
        ];
        let response: ConverterResponse = self.get_json(&self.converter_url, &params).await?;

        let gregorian = match (response.gy, response.gm, response.gd) {
            (Some(gy), Some(gm), Some(gd)) => NaiveDate::from_ymd_opt(gy, gm, gd)
                .ok_or_else(|| CalendarError::InvalidDate(format!("{gy}-{gm}-{gd}")))?,
            _ => {
                let mut missing = Vec::new();
                if response.gy.is_none() {
                    missing.push("year");
                }
                if response.gm.is_none() {
                    missing.push("month");
                }
                if response.gd.is_none() {
                    missing.push("day");
                }
                return Err(CalendarError::MissingField(missing.join(", ")));
            }
        };

        Ok(CalendarDate {
            gregorian,
            hebrew: HebrewDate {
                year: hy,
                month: hm,
                day: hd,
            },
            hebrew_label: response.hebrew.unwrap_or_default(),
        })
    }

    async fn holidays_on(&self, date: NaiveDate) -> Result<Vec<HolidayItem>, CalendarError> {
        let params = [
            ("v", "1".to_string()),
            ("year", date.year().to_string()),
            ("month", date.month().to_string()),
            ("day", date.day().to_string()),
            ("maj", "on".to_string()),
            ("min", "on".to_string()),
        ];
        let response: EventsResponse = self.get_json(&self.events_url, &params).await?;
        Ok(response.items)
    }

    async fn holidays_in_year(&self, year: i32) -> Result<Vec<HolidayItem>, CalendarError> {
        let params = [
            ("v", "1".to_string()),
            ("year", year.to_string()),
            ("maj", "on".to_string()),
            ("min", "on".to_string()),
        ];
        let response: EventsResponse = self.get_json(&self.events_url, &params).await?;
        Ok(response.items)
    }
}
