//! Query intent routing: ordered deterministic phrase rules backed by the
//! external single-label classifier for everything ambiguous.

mod router;
mod types;

pub use router::{
    conversion_direction, is_conversion_query, match_rules, wants_days_until, IntentRouter,
};
pub use types::{Category, ConversionDirection};
