//! Configuration for luach.

mod settings;

pub use settings::{CalendarConfig, Config, LlmConfig, SearchConfig};
