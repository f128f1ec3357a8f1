//! Error types for luach.

use thiserror::Error;

/// Main error type for luach operations.
#[derive(Error, Debug)]
pub enum LuachError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Calendar error: {0}")]
    Calendar(#[from] CalendarError),

    #[error("Completion error: {0}")]
    Llm(#[from] LlmError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Errors from the calendar bridge and the conversion service.
///
/// Every failure of an external conversion or holiday-listing call is folded
/// into one of these variants, so callers check a single contract regardless
/// of which underlying endpoint failed.
#[derive(Error, Debug)]
pub enum CalendarError {
    /// The conversion service returned an error payload or was unreachable.
    #[error("Calendar service error: {0}")]
    Service(String),

    /// A required field of a Hebrew date was not supplied.
    #[error("Missing required field(s): {0}")]
    MissingField(String),

    /// A date that does not exist in the target calendar.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// The service answered with a payload we could not decode.
    #[error("Malformed service response: {0}")]
    Parse(String),
}

/// Errors from the generative completion service.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Completion API error: {0}")]
    Api(String),

    #[error("Malformed completion response: {0}")]
    MalformedResponse(String),
}

/// Errors from the text-retrieval service.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Search API error: {0}")]
    Api(String),

    #[error("Text not found: {0}")]
    NotFound(String),
}

/// Result type alias for luach operations.
pub type Result<T> = std::result::Result<T, LuachError>;
