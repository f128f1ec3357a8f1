//! Text-retrieval collaborator (Sefaria-compatible).
//!
//! Consumed only by the non-calendar answer path: ranked search over the
//! text corpus plus fetching a passage by reference.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::config::SearchConfig;
use crate::error::SearchError;

/// A ranked-search and passage-fetch service over the text corpus.
#[async_trait]
pub trait TextSearch: Send + Sync {
    /// Ranked hits for a free-text query.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError>;

    /// Fetch the text of a passage by its reference.
    async fn fetch_text(&self, text_ref: &str) -> Result<TextSegment, SearchError>;
}

/// One search hit.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub text_ref: String,
    pub title: Option<String>,
}

/// A fetched passage. `lines` is flattened to one entry per verse regardless
/// of how deeply the service nests its segments.
#[derive(Debug, Clone)]
pub struct TextSegment {
    pub text_ref: String,
    pub he_ref: Option<String>,
    pub lines: Vec<String>,
}

impl TextSegment {
    pub fn joined(&self) -> String {
        self.lines.join("\n")
    }
}

// ============================================================================
// Sefaria client
// ============================================================================

/// Sefaria API client.
pub struct SefariaClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    #[serde(rename = "type")]
    search_type: &'static str,
    field: &'static str,
    slop: u32,
    start: u32,
    size: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: HitsOuter,
}

#[derive(Debug, Default, Deserialize)]
struct HitsOuter {
    #[serde(default)]
    hits: Vec<HitEntry>,
}

#[derive(Debug, Deserialize)]
struct HitEntry {
    #[serde(rename = "_source", default)]
    source: Option<HitSource>,
}

#[derive(Debug, Deserialize)]
struct HitSource {
    #[serde(rename = "ref", default)]
    text_ref: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TextResponse {
    #[serde(rename = "ref", default)]
    text_ref: Option<String>,
    #[serde(rename = "heRef", default)]
    he_ref: Option<String>,
    #[serde(default)]
    text: Value,
}

impl SefariaClient {
    /// Create a client from configuration.
    pub fn from_config(config: &SearchConfig) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SearchError::Api(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// Rewrite a reference into the URL-safe `tref` form ("Genesis 1:1" →
/// "Genesis_1.1").
fn to_tref(text_ref: &str) -> String {
    text_ref.replace(' ', "_").replace(':', ".")
}

/// Collect every string leaf of a possibly nested text payload.
fn flatten_text(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => {
            if !s.is_empty() {
                out.push(s.clone());
            }
        }
        Value::Array(items) => {
            for item in items {
                flatten_text(item, out);
            }
        }
        _ => {}
    }
}

#[async_trait]
impl TextSearch for SefariaClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError> {
        let request = SearchRequest {
            query,
            search_type: "text",
            field: "exact",
            slop: 0,
            start: 0,
            size: limit,
        };

        let response = self
            .client
            .post(format!("{}/search-wrapper", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| SearchError::Api(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Api(format!("HTTP {status}")));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Api(e.to_string()))?;

        Ok(parsed
            .hits
            .hits
            .into_iter()
            .filter_map(|entry| {
                let source = entry.source?;
                Some(SearchHit {
                    text_ref: source.text_ref?,
                    title: source.title,
                })
            })
            .collect())
    }

    async fn fetch_text(&self, text_ref: &str) -> Result<TextSegment, SearchError> {
        let response = self
            .client
            .get(format!("{}/texts/{}", self.base_url, to_tref(text_ref)))
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| SearchError::Api(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SearchError::NotFound(text_ref.to_string()));
        }
        if !status.is_success() {
            return Err(SearchError::Api(format!("HTTP {status}")));
        }

        let parsed: TextResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Api(e.to_string()))?;

        let mut lines = Vec::new();
        flatten_text(&parsed.text, &mut lines);

        Ok(TextSegment {
            text_ref: parsed.text_ref.unwrap_or_else(|| text_ref.to_string()),
            he_ref: parsed.he_ref,
            lines,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_tref() {
        assert_eq!(to_tref("Genesis 1:1"), "Genesis_1.1");
        assert_eq!(to_tref("Mishnah Sanhedrin 4:5"), "Mishnah_Sanhedrin_4.5");
        assert_eq!(to_tref("Shabbat"), "Shabbat");
    }

    #[test]
    fn test_flatten_text_string() {
        let mut out = Vec::new();
        flatten_text(&serde_json::json!("один стих"), &mut out);
        assert_eq!(out, vec!["один стих"]);
    }

    #[test]
    fn test_flatten_text_nested() {
        let mut out = Vec::new();
        flatten_text(
            &serde_json::json!([["a", "b"], "c", ["", ["d"]], 5]),
            &mut out,
        );
        assert_eq!(out, vec!["a", "b", "c", "d"]);
    }
}
